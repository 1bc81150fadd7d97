use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::format;
use crate::data::model::Record;

const HEADERS: [&str; 8] = [
    "Date",
    "Issuer",
    "Rating",
    "Target",
    "Actual_Price",
    "Upside",
    "Upside_Text",
    "Note",
];

/// Display text of one row: prices to 2 decimals, upside as a 2-decimal percentage.
pub fn table_cells(rec: &Record) -> [String; 8] {
    [
        rec.date.format("%Y-%m-%d").to_string(),
        rec.issuer.clone(),
        rec.rating.clone(),
        format::fixed2(rec.target),
        format::fixed2(rec.actual_price),
        format::percent2(rec.upside),
        rec.upside_text.clone(),
        rec.note.clone(),
    ]
}

/// Render the filtered rows.
pub fn records_table(ui: &mut Ui, rows: &[Record]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), HEADERS.len() - 1)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for name in HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let cells = table_cells(&rows[row.index()]);
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
