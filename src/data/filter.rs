use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{Record, TargetTable};

/// Issuers currently ticked in the side panel.
pub type IssuerSelection = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Nothing selected. A prompt for the user, not a data problem.
    #[error("no issuer selected")]
    EmptySelection,
}

/// Rows whose issuer is selected, ordered by ascending date.
///
/// Rows on the same date keep their source order. The table is not modified.
pub fn filter_by_issuers(
    table: &TargetTable,
    selected: &IssuerSelection,
) -> Result<Vec<Record>, FilterError> {
    if selected.is_empty() {
        return Err(FilterError::EmptySelection);
    }
    let mut rows: Vec<Record> = table
        .records
        .iter()
        .filter(|rec| selected.contains(&rec.issuer))
        .cloned()
        .collect();
    rows.sort_by_key(|rec| rec.date);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rec(date: &str, issuer: &str) -> Record {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Record::new(date, issuer, "Buy", Some(10.0), Some(8.0), "")
    }

    fn table() -> TargetTable {
        TargetTable::from_records(vec![
            rec("2024-03-01", "BankA"),
            rec("2024-01-01", "BankB"),
            rec("2024-02-01", "BankA"),
            rec("2024-01-15", "BankC"),
            rec("2024-01-01", "BankA"),
        ])
    }

    fn select(names: &[&str]) -> IssuerSelection {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn subset_keeps_only_selected_sorted_by_date() {
        let rows = filter_by_issuers(&table(), &select(&["BankA", "BankC"])).unwrap();
        let got: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.date.to_string(), r.issuer.clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2024-01-01".to_string(), "BankA".to_string()),
                ("2024-01-15".to_string(), "BankC".to_string()),
                ("2024-02-01".to_string(), "BankA".to_string()),
                ("2024-03-01".to_string(), "BankA".to_string()),
            ]
        );
    }

    #[test]
    fn full_selection_returns_every_row_sorted() {
        let t = table();
        let all: IssuerSelection = t.issuers.iter().cloned().collect();
        let rows = filter_by_issuers(&t, &all).unwrap();
        assert_eq!(rows.len(), t.len());
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        // Same-date rows keep source order.
        assert_eq!(rows[0].issuer, "BankB");
        assert_eq!(rows[1].issuer, "BankA");
    }

    #[test]
    fn unknown_issuer_selects_nothing() {
        let rows = filter_by_issuers(&table(), &select(&["Nobody"])).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_selection_is_an_error() {
        assert_eq!(
            filter_by_issuers(&table(), &IssuerSelection::new()),
            Err(FilterError::EmptySelection)
        );
    }

    #[test]
    fn input_table_is_untouched() {
        let t = table();
        let before = t.clone();
        filter_by_issuers(&t, &select(&["BankB"])).unwrap();
        assert_eq!(t, before);
    }
}
