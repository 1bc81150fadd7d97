use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::chart::ChartModel;
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::TableCache;
use crate::data::filter::{filter_by_issuers, FilterError, IssuerSelection};
use crate::data::loader::{LoadError, REQUIRED_COLUMNS};
use crate::data::model::{Record, TargetTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central panel should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus<'a> {
    /// Nothing requested yet.
    Idle,
    /// The last load failed; nothing else is drawn.
    LoadFailed(&'a LoadError),
    /// Table loaded but no issuer ticked.
    EmptySelection,
    Ready,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: TableCache,

    /// Last successfully loaded table (None until loaded or after a failure).
    pub table: Option<Arc<TargetTable>>,

    /// Error of the last load, if it failed.
    pub load_error: Option<LoadError>,

    /// Issuers ticked in the side panel.
    pub selected: IssuerSelection,

    /// Issuers of the last loaded table; survives load failures.
    known_issuers: IssuerSelection,

    /// Draw short notes next to the target points.
    pub show_notes: bool,

    /// Show the filtered record table under the chart.
    pub show_table: bool,

    /// Colour per issuer, built from the full issuer list.
    pub color_map: ColorMap,

    /// Rows passing the current selection, sorted by date (cached).
    pub rows: Vec<Record>,

    /// Chart built from `rows` (cached).
    pub chart: Option<ChartModel>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, cache: TableCache) -> Self {
        Self {
            config,
            cache,
            table: None,
            load_error: None,
            selected: IssuerSelection::new(),
            known_issuers: IssuerSelection::new(),
            show_notes: true,
            show_table: false,
            color_map: ColorMap::default(),
            rows: Vec::new(),
            chart: None,
            status_message: None,
        }
    }

    /// Pull the table from the cache; ingest it when it changed.
    pub fn refresh(&mut self) {
        match self.cache.get() {
            Ok(table) => {
                let unchanged = self.table.as_ref().is_some_and(|t| Arc::ptr_eq(t, &table));
                if !unchanged {
                    self.set_table(table);
                }
            }
            Err(e) => {
                self.table = None;
                self.rows.clear();
                self.chart = None;
                self.load_error = Some(e);
            }
        }
    }

    /// Drop the cached table and load again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.refresh();
    }

    /// Time until the cached table goes stale.
    pub fn expires_in(&self) -> Option<Duration> {
        self.cache.expires_in()
    }

    pub fn table_age(&self) -> Option<Duration> {
        self.cache.age()
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Ingest a newly loaded table.
    ///
    /// The first table selects every issuer. Later tables keep the user's
    /// choices for issuers that still exist and select new ones.
    pub fn set_table(&mut self, table: Arc<TargetTable>) {
        if self.known_issuers.is_empty() && self.selected.is_empty() {
            self.selected = table.issuers.iter().cloned().collect();
        } else {
            self.selected.retain(|i| table.issuers.contains(i));
            let fresh: Vec<String> = table
                .issuers
                .iter()
                .filter(|i| !self.known_issuers.contains(*i))
                .cloned()
                .collect();
            self.selected.extend(fresh);
        }
        self.known_issuers = table.issuers.iter().cloned().collect();
        self.color_map = ColorMap::new(&table.issuers);
        self.table = Some(table);
        self.load_error = None;
        self.rebuild_view();
    }

    /// Recompute filtered rows and the chart after a selection or toggle change.
    pub fn rebuild_view(&mut self) {
        let Some(table) = &self.table else {
            self.rows.clear();
            self.chart = None;
            return;
        };
        match filter_by_issuers(table, &self.selected) {
            Ok(rows) => {
                self.chart = Some(ChartModel::build(&rows, &self.color_map, self.show_notes));
                self.rows = rows;
            }
            Err(FilterError::EmptySelection) => {
                log::warn!("no issuer selected; chart hidden");
                self.rows.clear();
                self.chart = None;
            }
        }
    }

    pub fn view_status(&self) -> ViewStatus<'_> {
        if let Some(e) = &self.load_error {
            return ViewStatus::LoadFailed(e);
        }
        match &self.table {
            None => ViewStatus::Idle,
            Some(_) if self.selected.is_empty() => ViewStatus::EmptySelection,
            Some(_) => ViewStatus::Ready,
        }
    }

    /// Toggle a single issuer in the selection.
    pub fn toggle_issuer(&mut self, issuer: &str) {
        if !self.selected.remove(issuer) {
            self.selected.insert(issuer.to_string());
        }
        self.rebuild_view();
    }

    /// Select every issuer of the loaded table.
    pub fn select_all(&mut self) {
        if let Some(table) = &self.table {
            self.selected = table.issuers.iter().cloned().collect();
            self.rebuild_view();
        }
    }

    /// Deselect every issuer.
    pub fn select_none(&mut self) {
        self.selected.clear();
        self.rebuild_view();
    }

    pub fn set_show_notes(&mut self, show: bool) {
        if self.show_notes != show {
            self.show_notes = show;
            self.rebuild_view();
        }
    }

    /// Write the filtered rows to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut header: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        header.extend(["Upside", "Upside_Text"]);
        writer.write_record(&header)?;
        for rec in &self.rows {
            writer.write_record([
                rec.date.format("%Y-%m-%d").to_string(),
                rec.issuer.clone(),
                rec.rating.clone(),
                rec.target.map(|v| v.to_string()).unwrap_or_default(),
                rec.actual_price.map(|v| v.to_string()).unwrap_or_default(),
                rec.note.clone(),
                rec.upside.map(|v| v.to_string()).unwrap_or_default(),
                rec.upside_text.clone(),
            ])?;
        }
        writer.flush().context("flushing CSV")?;
        log::info!("Exported {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}
