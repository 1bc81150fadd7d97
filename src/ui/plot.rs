use std::collections::HashMap;

use eframe::egui::{Align2, Color32, RichText, Ui};
use egui_plot::{
    Corner, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text,
};

use crate::chart::reference::REFERENCE_NAME;
use crate::chart::{date_to_x, x_to_date, ChartModel};
use crate::data::format;

/// Chart heading.
pub const CHART_TITLE: &str = "Analyst targets vs actual price";

/// Muted style of the actual-price baseline.
fn reference_color() -> Color32 {
    Color32::GRAY.gamma_multiply(0.5)
}

// ---------------------------------------------------------------------------
// Hover lookup
// ---------------------------------------------------------------------------

/// Tooltip text per series name, keyed by plot coordinates.
struct HoverIndex {
    by_series: HashMap<String, Vec<([f64; 2], String)>>,
}

impl HoverIndex {
    fn new(chart: &ChartModel) -> Self {
        let mut by_series: HashMap<String, Vec<([f64; 2], String)>> = HashMap::new();
        for s in &chart.issuers {
            let entries = by_series.entry(s.issuer.clone()).or_default();
            for p in &s.points {
                if let Some(target) = p.target {
                    entries.push(([date_to_x(p.date), target], p.tooltip.clone()));
                }
            }
        }
        let reference = chart
            .reference
            .points
            .iter()
            .filter_map(|(date, price)| {
                let price = (*price)?;
                let text = format!(
                    "{REFERENCE_NAME}\n{}\n{}",
                    date.format("%Y-%m-%d"),
                    format::money(Some(price))
                );
                Some(([date_to_x(*date), price], text))
            })
            .collect();
        by_series.insert(REFERENCE_NAME.to_string(), reference);
        HoverIndex { by_series }
    }

    /// Tooltip of the point of `name` closest to `value`, else the raw coordinates.
    fn describe(&self, name: &str, value: &PlotPoint) -> String {
        let nearest = self.by_series.get(name).and_then(|entries| {
            entries
                .iter()
                .filter(|(xy, _)| (xy[0] - value.x).abs() <= 0.5)
                .min_by(|(a, _), (b, _)| (a[1] - value.y).abs().total_cmp(&(b[1] - value.y).abs()))
        });
        match nearest {
            Some((_, text)) => text.clone(),
            None => {
                let date = x_to_date(value.x)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                format!("{date}\n{}", format::money(Some((value.y * 100.0).round() / 100.0)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Target plot (central panel)
// ---------------------------------------------------------------------------

/// Render the issuer target lines, note labels and the price baseline.
pub fn target_plot(ui: &mut Ui, chart: &ChartModel) {
    let hover = HoverIndex::new(chart);

    ui.heading(CHART_TITLE);

    Plot::new("target_plot")
        .legend(Legend::default().position(Corner::LeftTop))
        .x_axis_label("Date")
        .y_axis_label("Price ($)")
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(move |name, value| hover.describe(name, value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in &chart.issuers {
                for segment in s.segments() {
                    plot_ui.line(
                        Line::new(PlotPoints::from(segment))
                            .name(&s.issuer)
                            .color(s.color)
                            .width(2.0),
                    );
                }

                // Always added so an issuer without targets keeps its legend entry.
                plot_ui.points(
                    Points::new(PlotPoints::from(s.markers()))
                        .name(&s.issuer)
                        .color(s.color)
                        .shape(MarkerShape::Diamond)
                        .filled(true)
                        .radius(5.0),
                );

                for note in &s.annotations {
                    let at = PlotPoint::new(date_to_x(note.date), note.target);
                    plot_ui.text(
                        Text::new(at, RichText::new(&note.label).size(9.0).color(s.color))
                            .anchor(Align2::CENTER_BOTTOM),
                    );
                }
            }

            let mut segments = chart.reference.segments();
            if segments.is_empty() {
                // Keeps the legend entry when no row has a price.
                segments.push(Vec::new());
            }
            for segment in segments {
                plot_ui.line(
                    Line::new(PlotPoints::from(segment))
                        .name(REFERENCE_NAME)
                        .color(reference_color())
                        .width(1.0)
                        .style(LineStyle::dotted_dense()),
                );
            }
        });
}
