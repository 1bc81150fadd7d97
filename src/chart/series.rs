use std::collections::HashMap;

use chrono::NaiveDate;
use eframe::egui::Color32;

use super::{date_to_x, split_runs};
use crate::color::ColorMap;
use crate::data::format;
use crate::data::model::Record;

/// One hoverable point of an issuer series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// `None` leaves a gap in the line.
    pub target: Option<f64>,
    pub tooltip: String,
}

/// Short note label drawn next to a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub date: NaiveDate,
    pub target: f64,
    pub label: String,
}

/// Target-price line of a single issuer.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerSeries {
    pub issuer: String,
    pub color: Color32,
    pub points: Vec<SeriesPoint>,
    /// Empty when notes are switched off.
    pub annotations: Vec<Annotation>,
}

impl IssuerSeries {
    /// Runs of consecutive points that have a target, as plot coordinates.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        split_runs(self.points.iter().map(|p| (p.date, p.target)))
    }

    /// Points that have a target, as plot coordinates.
    pub fn markers(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .filter_map(|p| Some([date_to_x(p.date), p.target?]))
            .collect()
    }
}

/// Hover text for a row: issuer, rating, prices, upside and the note.
pub fn tooltip(rec: &Record) -> String {
    format!(
        "{}\nRating: {}\nTarget: {}\nActual: {}\nUpside: {}\n{}",
        rec.issuer,
        rec.rating,
        format::money(rec.target),
        format::money(rec.actual_price),
        rec.upside_text,
        rec.note,
    )
}

/// One series per issuer, in order of first appearance within `rows`.
///
/// `rows` must be sorted by date. An issuer whose targets are all missing
/// still gets a (pointless) series.
pub fn build_issuer_series(rows: &[Record], colors: &ColorMap, show_notes: bool) -> Vec<IssuerSeries> {
    let mut series: Vec<IssuerSeries> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for rec in rows {
        let slot = *index.entry(rec.issuer.as_str()).or_insert_with(|| {
            series.push(IssuerSeries {
                issuer: rec.issuer.clone(),
                color: colors.color_for(&rec.issuer),
                points: Vec::new(),
                annotations: Vec::new(),
            });
            series.len() - 1
        });
        let s = &mut series[slot];

        s.points.push(SeriesPoint {
            date: rec.date,
            target: rec.target,
            tooltip: tooltip(rec),
        });

        if !show_notes {
            continue;
        }
        if let Some(target) = rec.target {
            s.annotations.push(Annotation {
                date: rec.date,
                target,
                label: format::short_note(&rec.note),
            });
        }
    }
    series
}
