use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let issuers = match &state.table {
        Some(table) => table.issuers.clone(),
        None => {
            ui.label("No data loaded.");
            return;
        }
    };

    if table_is_empty(state) {
        ui.label("The sheet has no rows.");
        return;
    }

    ui.strong(format!(
        "Issuers  ({}/{})",
        state.selected.len(),
        issuers.len()
    ));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    ScrollArea::vertical()
        .max_height(ui.available_height() * 0.7)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for issuer in &issuers {
                let mut checked = state.selected.contains(issuer);
                // Swatch in the series colour.
                let text = RichText::new(issuer).color(state.color_map.color_for(issuer));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_issuer(issuer);
                }
            }
        });

    ui.separator();

    let mut show_notes = state.show_notes;
    if ui.checkbox(&mut show_notes, "Show notes on chart").changed() {
        state.set_show_notes(show_notes);
    }
    ui.checkbox(&mut state.show_table, "Show data table");
}

fn table_is_empty(state: &AppState) -> bool {
    state.table.as_ref().is_some_and(|t| t.is_empty())
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_export = !state.rows.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.button("Refresh").clicked() {
            log::info!("manual refresh requested");
            state.reload();
        }

        if let Some(table) = &state.table {
            let series = state.chart.as_ref().map_or(0, |c| c.series_count());
            ui.label(format!(
                "{} rows loaded, {} visible, {} series",
                table.len(),
                state.rows.len(),
                series
            ));
        }

        if let Some(age) = state.table_age() {
            ui.separator();
            ui.label(format!(
                "updated {}s ago (every {}s)",
                age.as_secs(),
                state.cache_ttl().as_secs()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .add_filter("CSV", &["csv"])
        .set_file_name("analyst_targets.csv")
        .save_file();

    if let Some(path) = file {
        match state.export_csv(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
