use chrono::NaiveDate;

use super::split_runs;
use crate::data::model::Record;

/// Legend name of the actual-price baseline.
pub const REFERENCE_NAME: &str = "Actual price";

/// Actual share price over time for every filtered row, regardless of issuer.
///
/// Not deduplicated: two issuers publishing on the same day give two points
/// at the same date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSeries {
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl ReferenceSeries {
    /// `rows` must be sorted by date.
    pub fn from_rows(rows: &[Record]) -> Self {
        ReferenceSeries {
            points: rows.iter().map(|r| (r.date, r.actual_price)).collect(),
        }
    }

    /// Runs of consecutive rows that have a price. A row without a price
    /// breaks the line, the same way a missing target breaks an issuer line.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        split_runs(self.points.iter().copied())
    }
}
