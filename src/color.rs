use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
///
/// A dataset can carry all 47 prefectures, where neighbouring hues are only a
/// few degrees apart, so lightness alternates between two bands.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let lightness = if i % 2 == 0 { 0.48 } else { 0.66 };
            let hsl = Hsl::new(hue, 0.75, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: region → Color32
// ---------------------------------------------------------------------------

/// Maps each prefecture to a distinct colour, stable for the whole session.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign colours in the order regions were first seen in the dataset.
    pub fn new(regions: &[String]) -> Self {
        let mapping = regions
            .iter()
            .cloned()
            .zip(generate_palette(regions.len()))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a region; unknown or missing regions are grey.
    pub fn color_for(&self, region: Option<&str>) -> Color32 {
        region
            .and_then(|r| self.mapping.get(r))
            .copied()
            .unwrap_or(self.default_color)
    }
}
