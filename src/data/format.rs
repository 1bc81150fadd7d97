//! Text formatting shared by tooltips, annotations and the record table.

/// Placeholder for a missing numeric value.
pub const MISSING: &str = "n/a";

/// Maximum number of characters of a note drawn on the chart.
pub const NOTE_LABEL_CHARS: usize = 8;

/// Marker appended to a truncated note.
pub const ELLIPSIS: &str = "..";

/// Price with a dollar sign, printed with the shortest round-trip digits
/// (`$10.0`, `$8.25`).
pub fn money(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:?}"),
        None => MISSING.to_string(),
    }
}

/// Signed percentage with one decimal; positive values get an explicit `+`.
pub fn upside_text(upside: Option<f64>) -> String {
    match upside {
        Some(u) if u > 0.0 => format!("+{:.1}%", u * 100.0),
        Some(u) => format!("{:.1}%", u * 100.0),
        None => MISSING.to_string(),
    }
}

/// Two decimals, empty when missing.
pub fn fixed2(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Ratio as a percentage with two decimals, empty when missing.
pub fn percent2(ratio: Option<f64>) -> String {
    ratio.map(|r| format!("{:.2}%", r * 100.0)).unwrap_or_default()
}

/// Short chart label for a note: the first eight characters plus `..` when
/// the note is longer.
pub fn short_note(note: &str) -> String {
    if note.chars().count() > NOTE_LABEL_CHARS {
        let head: String = note.chars().take(NOTE_LABEL_CHARS).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        note.to_string()
    }
}
