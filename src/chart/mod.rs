/// Chart model: plain data describing what the plot draws.
///
/// Built from the filtered rows on every selection change and consumed by
/// `ui::plot`; nothing here depends on the render loop.
pub mod reference;
pub mod series;

use chrono::{Datelike, NaiveDate};

use crate::color::ColorMap;
use crate::data::model::Record;
use reference::ReferenceSeries;
use series::{build_issuer_series, IssuerSeries};

/// X coordinate of a date (days since 0001-01-01).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Split `(date, value)` pairs into runs of consecutive present values.
/// A missing value ends the current run; it is never bridged.
pub fn split_runs(points: impl IntoIterator<Item = (NaiveDate, Option<f64>)>) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (date, value) in points {
        match value {
            Some(y) => current.push([date_to_x(date), y]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Everything the plot needs: one series per issuer plus the price baseline.
#[derive(Debug, Clone, Default)]
pub struct ChartModel {
    pub issuers: Vec<IssuerSeries>,
    pub reference: ReferenceSeries,
}

impl ChartModel {
    /// `rows` must already be filtered and sorted by date.
    pub fn build(rows: &[Record], colors: &ColorMap, show_notes: bool) -> Self {
        ChartModel {
            issuers: build_issuer_series(rows, colors, show_notes),
            reference: ReferenceSeries::from_rows(rows),
        }
    }

    /// Issuer series plus the reference series.
    pub fn series_count(&self) -> usize {
        self.issuers.len() + 1
    }
}
