use chrono::NaiveDate;

use super::format;

// ---------------------------------------------------------------------------
// Record – one row of the analyst sheet
// ---------------------------------------------------------------------------

/// A single analyst call (one row of the source sheet) plus derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    /// Bank / broker that published the target.
    pub issuer: String,
    pub rating: String,
    /// Price target; `None` when the cell was blank or not a number.
    pub target: Option<f64>,
    /// Observed share price on `date`; `None` when blank or not a number.
    pub actual_price: Option<f64>,
    pub note: String,
    /// `(target - actual_price) / actual_price`.
    pub upside: Option<f64>,
    /// `upside` as a signed one-decimal percentage (`+25.0%`).
    pub upside_text: String,
}

impl Record {
    /// Build a record and compute its derived fields.
    pub fn new(
        date: NaiveDate,
        issuer: impl Into<String>,
        rating: impl Into<String>,
        target: Option<f64>,
        actual_price: Option<f64>,
        note: impl Into<String>,
    ) -> Self {
        let upside = upside(target, actual_price);
        Record {
            date,
            issuer: issuer.into(),
            rating: rating.into(),
            target,
            actual_price,
            note: note.into(),
            upside,
            upside_text: format::upside_text(upside),
        }
    }
}

/// Relative distance from the actual price to the target.
///
/// Undefined when either side is missing or the actual price is zero.
pub fn upside(target: Option<f64>, actual_price: Option<f64>) -> Option<f64> {
    let (target, actual) = (target?, actual_price?);
    if actual == 0.0 {
        return None;
    }
    let value = (target - actual) / actual;
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// TargetTable – the complete loaded sheet
// ---------------------------------------------------------------------------

/// The parsed sheet. Immutable once built; a reload replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetTable {
    /// Rows in source order (not deduplicated, not sorted).
    pub records: Vec<Record>,
    /// Distinct issuers in order of first appearance.
    pub issuers: Vec<String>,
    /// Numeric cells that failed to parse and were stored as missing.
    pub coerced_cells: usize,
}

impl TargetTable {
    /// Build the issuer index from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut issuers: Vec<String> = Vec::new();
        for rec in &records {
            if !issuers.iter().any(|i| *i == rec.issuer) {
                issuers.push(rec.issuer.clone());
            }
        }
        TargetTable {
            records,
            issuers,
            coerced_cells: 0,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn upside_from_target_and_price() {
        let rec = Record::new(day(2024, 1, 1), "BankA", "Buy", Some(10.0), Some(8.0), "init");
        assert_eq!(rec.upside, Some(0.25));
        assert_eq!(rec.upside_text, "+25.0%");
    }

    #[test]
    fn upside_undefined_when_operand_missing_or_price_zero() {
        assert_eq!(upside(None, Some(8.0)), None);
        assert_eq!(upside(Some(10.0), None), None);
        assert_eq!(upside(None, None), None);
        assert_eq!(upside(Some(10.0), Some(0.0)), None);
        assert_eq!(upside(Some(0.0), Some(-0.0)), None);
    }

    #[test]
    fn upside_defined_for_zero_target() {
        assert_eq!(upside(Some(0.0), Some(4.0)), Some(-1.0));
    }

    #[test]
    fn issuers_in_first_appearance_order() {
        let table = TargetTable::from_records(vec![
            Record::new(day(2024, 3, 1), "Zeta", "Hold", None, None, ""),
            Record::new(day(2024, 1, 1), "Alpha", "Buy", None, None, ""),
            Record::new(day(2024, 2, 1), "Zeta", "Sell", None, None, ""),
        ]);
        assert_eq!(table.issuers, vec!["Zeta".to_string(), "Alpha".to_string()]);
        assert_eq!(table.len(), 3);
    }
}
