use eframe::egui::{self, Color32, RichText};

use crate::state::{AppState, ViewStatus};
use crate::ui::{panels, plot, table};

/// Shown for every load failure, whatever the cause.
pub const LOAD_FAILED_MESSAGE: &str = "Unable to read data. Check that: 1. the Google Sheet ID is correct. \
     2. sharing is set to 'Anyone with the link can view'.";

/// Shown while no issuer is ticked.
pub const EMPTY_SELECTION_MESSAGE: &str = "Select at least one issuer.";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AnalystBoardApp {
    pub state: AppState,
}

impl AnalystBoardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for AnalystBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Cheap while the cached table is fresh; once it expires the reload
        // blocks this frame for at most `request_timeout_seconds`.
        self.state.refresh();
        if let Some(left) = self.state.expires_in() {
            ctx.request_repaint_after(left);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: record table ----
        if self.state.show_table && self.state.view_status() == ViewStatus::Ready {
            egui::TopBottomPanel::bottom("data_table")
                .resizable(true)
                .default_height(220.0)
                .show(ctx, |ui| {
                    table::records_table(ui, &self.state.rows);
                });
        }

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            match state.view_status() {
                ViewStatus::Idle => {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Loading…");
                    });
                }
                ViewStatus::LoadFailed(err) => {
                    ui.label(RichText::new(LOAD_FAILED_MESSAGE).color(Color32::RED).strong());
                    if state.config.show_error_details {
                        ui.label(RichText::new(err.to_string()).weak());
                    }
                }
                ViewStatus::EmptySelection => {
                    ui.label(RichText::new(EMPTY_SELECTION_MESSAGE).color(Color32::YELLOW));
                }
                ViewStatus::Ready => {
                    if let Some(chart) = &state.chart {
                        plot::target_plot(ui, chart);
                    }
                }
            }
        });
    }
}
