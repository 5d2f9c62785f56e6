use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::Key;
use crate::data::model::{GroupType, Hotel};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, hue_offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (hue_offset + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Series colours: chart series key → Color32
// ---------------------------------------------------------------------------

/// Fixed colours for the categorical series the dashboard draws, so a group
/// type keeps its colour across every chart.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    groups: BTreeMap<GroupType, Color32>,
    hotels: BTreeMap<Hotel, Color32>,
    metrics: Vec<Color32>,
    default_color: Color32,
}

impl Default for SeriesColors {
    fn default() -> Self {
        let groups = GroupType::ALL
            .into_iter()
            .zip(generate_palette(GroupType::ALL.len(), 200.0))
            .collect();
        let hotels = Hotel::ALL
            .into_iter()
            .zip(generate_palette(Hotel::ALL.len(), 30.0))
            .collect();

        SeriesColors {
            groups,
            hotels,
            metrics: generate_palette(4, 120.0),
            default_color: Color32::GRAY,
        }
    }
}

impl SeriesColors {
    pub fn group(&self, group: GroupType) -> Color32 {
        self.groups.get(&group).copied().unwrap_or(self.default_color)
    }

    /// Colour for a series identified by a table key.
    pub fn for_key(&self, key: &Key) -> Color32 {
        match key {
            Key::Group(g) => self.group(*g),
            Key::Hotel(h) => self.hotels.get(h).copied().unwrap_or(self.default_color),
            Key::Country(_) | Key::Month(_) => self.default_color,
        }
    }

    /// Colour for the `i`-th metric column of a table.
    pub fn metric(&self, i: usize) -> Color32 {
        if self.metrics.is_empty() {
            return self.default_color;
        }
        self.metrics[i % self.metrics.len()]
    }
}
