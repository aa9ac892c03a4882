//! Category color mapping
//!
//! Assigns one color per distinct value of a categorical column. Categories
//! are numbered in first-occurrence order (not sorted), and the palette is
//! picked from the number of distinct categories:
//!
//! | Categories | Palette |
//! |------------|---------|
//! | < `small` | first N of the 3-color qualitative palette |
//! | `small`..=`qualitative_max` | Category10 sized to N |
//! | ..=`extended_max` | Category20 sized to N |
//! | more | N evenly spaced hues |
//!
//! Nothing here is random, so the same input always yields the same colors.

use crate::table::Column;
use serde::{Deserialize, Serialize};

pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c",
    "#98df8a", "#d62728", "#ff9896", "#9467bd", "#c5b0d5",
    "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f",
    "#c7c7c7", "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Palette cut-over points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteThresholds {
    pub small: usize,
    pub qualitative_max: usize,
    pub extended_max: usize,
}

impl Default for PaletteThresholds {
    fn default() -> Self {
        Self {
            small: 3,
            qualitative_max: 10,
            extended_max: 20,
        }
    }
}

/// Colors for `count` categories, in slot order
pub fn palette(count: usize, thresholds: &PaletteThresholds) -> Vec<String> {
    if count < thresholds.small {
        CATEGORY10[..3].iter().take(count).map(|c| c.to_string()).collect()
    } else if count <= thresholds.qualitative_max && count <= CATEGORY10.len() {
        CATEGORY10[..count].iter().map(|c| c.to_string()).collect()
    } else if count <= thresholds.extended_max && count <= CATEGORY20.len() {
        CATEGORY20[..count].iter().map(|c| c.to_string()).collect()
    } else {
        (0..count).map(|i| evenly_spaced(i, count)).collect()
    }
}

fn evenly_spaced(slot: usize, count: usize) -> String {
    let hue = slot as f64 * 360.0 / count as f64;
    let (r, g, b) = hsl_to_rgb(hue, 0.65, 0.5);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h % 360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r1), to_byte(g1), to_byte(b1))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub category: String,
    pub color: String,
}

/// Per-row colors plus the category legend they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorMapping {
    pub column: String,
    pub colors: Vec<String>,
    pub legend: Vec<LegendEntry>,
}

impl ColorMapping {
    pub fn from_column(column: &Column, thresholds: &PaletteThresholds) -> Self {
        let labels: Vec<String> = column.values.iter().map(|v| v.display(None)).collect();

        let mut categories: Vec<&str> = Vec::new();
        for label in &labels {
            if !categories.contains(&label.as_str()) {
                categories.push(label);
            }
        }

        let colors = palette(categories.len(), thresholds);
        let legend: Vec<LegendEntry> = categories
            .iter()
            .zip(colors.iter())
            .map(|(category, color)| LegendEntry {
                category: category.to_string(),
                color: color.clone(),
            })
            .collect();

        let row_colors = labels
            .iter()
            .map(|label| {
                legend
                    .iter()
                    .find(|e| &e.category == label)
                    .map(|e| e.color.clone())
                    .unwrap_or_default()
            })
            .collect();

        tracing::debug!(
            column = %column.name,
            categories = legend.len(),
            "assigned category colors"
        );

        Self {
            column: column.name.clone(),
            colors: row_colors,
            legend,
        }
    }

    pub fn color_of(&self, category: &str) -> Option<&str> {
        self.legend
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.color.as_str())
    }
}
