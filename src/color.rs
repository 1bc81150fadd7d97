use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Fixed issuer palette
// ---------------------------------------------------------------------------

/// Series colours, assigned to issuers in order and reused cyclically.
pub const PALETTE_HEX: [&str; 6] = [
    "#1f77b4", "#d62728", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b",
];

/// Colour for issuers that are not in the map.
pub const NEUTRAL: Color32 = Color32::GRAY;

fn hex_to_color32(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("invalid palette colour '{hex}': {e}");
            NEUTRAL
        }
    }
}

/// The six palette colours in order.
pub fn issuer_palette() -> Vec<Color32> {
    PALETTE_HEX.iter().map(|hex| hex_to_color32(hex)).collect()
}

// ---------------------------------------------------------------------------
// Color mapping: issuer → Color32
// ---------------------------------------------------------------------------

/// Maps issuers to palette colours by their position in the full (unfiltered)
/// issuer list, so an issuer keeps its colour whatever else is selected.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build the map from every issuer of the loaded table, in first-appearance order.
    pub fn new(issuers: &[String]) -> Self {
        let palette = issuer_palette();
        let mapping = issuers
            .iter()
            .enumerate()
            .map(|(i, issuer)| (issuer.clone(), palette[i % palette.len()]))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for an issuer.
    pub fn color_for(&self, issuer: &str) -> Color32 {
        self.mapping.get(issuer).copied().unwrap_or(NEUTRAL)
    }
}
