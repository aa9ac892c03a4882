//! Build configuration
//!
//! [`BundleConfig`] carries every bundle-wide option; [`MediaOptions`] and
//! [`TextOptions`] configure single panels. All three deserialize with
//! defaults for missing keys, so a [`LayoutFile`] only needs to name what it
//! changes:
//!
//! ```json
//! {
//!   "config": { "output": "out/cells.html", "category_column": "condition" },
//!   "widgets": [
//!     { "type": "image", "column": "path_to_images", "title": "Raw" },
//!     { "type": "text", "ignore": ["id"] }
//!   ],
//!   "slider": true,
//!   "legend": true
//! }
//! ```
//!
//! Older option names (`image_width`, `container_height`, ...) are still
//! accepted. [`MediaOptions::normalize`] / [`TextOptions::normalize`] move
//! them onto the current names and record a deprecation warning.

use crate::color::PaletteThresholds;
use crate::error::{BuildError, Result, Warning, Warnings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Corner of the plot holding the category legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl LegendPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            LegendPosition::TopLeft => "top_left",
            LegendPosition::TopRight => "top_right",
            LegendPosition::BottomLeft => "bottom_left",
            LegendPosition::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for LegendPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegendPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "top_left" => Ok(LegendPosition::TopLeft),
            "top_right" => Ok(LegendPosition::TopRight),
            "bottom_left" => Ok(LegendPosition::BottomLeft),
            "bottom_right" => Ok(LegendPosition::BottomRight),
            other => Err(format!(
                "unknown legend position '{}' (expected top_left, top_right, bottom_left or bottom_right)",
                other
            )),
        }
    }
}

/// Bundle-wide options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub scatter_width: u32,
    pub scatter_height: u32,
    pub point_size: f64,
    /// Hovering a point selects its row
    pub hover_highlight: bool,
    /// Decimals for float columns in text panels
    pub float_precision: usize,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    /// Axis dropdown candidates; `None` offers every numeric column
    pub dropdown_options: Option<Vec<String>>,
    /// Insert a 0-based `id` column at position 0
    pub add_id_column: bool,
    pub copy_media: bool,
    /// Parent directories kept under `data/` when copying
    pub copy_dir_levels: usize,
    pub clear_output_dir: bool,
    /// Document path; its parent is the bundle directory
    pub output: PathBuf,
    pub title: String,
    pub category_column: Option<String>,
    pub legend_position: LegendPosition,
    pub scatter_alpha: f64,
    pub highlight_alpha: f64,
    pub palette: PaletteThresholds,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            scatter_width: 600,
            scatter_height: 600,
            point_size: 10.0,
            hover_highlight: true,
            float_precision: 2,
            x_axis: None,
            y_axis: None,
            dropdown_options: None,
            add_id_column: true,
            copy_media: true,
            copy_dir_levels: 1,
            clear_output_dir: false,
            output: PathBuf::from("mediascatter/index.html"),
            title: "mediascatter".to_string(),
            category_column: None,
            legend_position: LegendPosition::default(),
            scatter_alpha: 0.5,
            highlight_alpha: 0.3,
            palette: PaletteThresholds::default(),
        }
    }
}

impl BundleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_axis = Some(x.into());
        self.y_axis = Some(y.into());
        self
    }

    pub fn with_dropdown_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropdown_options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_category(mut self, column: impl Into<String>) -> Self {
        self.category_column = Some(column.into());
        self
    }

    pub fn with_id_column(mut self, add: bool) -> Self {
        self.add_id_column = add;
        self
    }

    pub fn with_copy_media(mut self, copy: bool) -> Self {
        self.copy_media = copy;
        self
    }

    pub fn with_copy_dir_levels(mut self, levels: usize) -> Self {
        self.copy_dir_levels = levels;
        self
    }

    pub fn with_clear_output_dir(mut self, clear: bool) -> Self {
        self.clear_output_dir = clear;
        self
    }

    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = precision;
        self
    }

    pub fn with_hover_highlight(mut self, hover: bool) -> Self {
        self.hover_highlight = hover;
        self
    }

    pub fn with_scatter_size(mut self, width: u32, height: u32) -> Self {
        self.scatter_width = width;
        self.scatter_height = height;
        self
    }

    pub fn with_legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }

    /// Bundle directory (the document's parent, `.` for a bare file name)
    pub fn output_dir(&self) -> PathBuf {
        match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Document file name inside the bundle
    pub fn file_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index.html".to_string())
    }
}

fn deprecated(warnings: &mut Warnings, old: &str, replacement: &str) {
    warnings.push(Warning::DeprecatedOption {
        old: old.to_string(),
        replacement: replacement.to_string(),
    });
}

/// Image or video panel options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaOptions {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    /// HTML shown by the legend toggle
    pub legend_text: Option<String>,
    /// Videos only
    pub autoplay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_height: Option<u32>,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            title: None,
            legend_text: None,
            autoplay: true,
            image_width: None,
            image_height: None,
            video_width: None,
            video_height: None,
        }
    }
}

impl MediaOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_legend_text(mut self, html: impl Into<String>) -> Self {
        self.legend_text = Some(html.into());
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Fold deprecated size names into `width`/`height`. An old name wins
    /// over the current one.
    pub fn normalize(mut self, warnings: &mut Warnings) -> Self {
        let aliases = [
            (self.image_width.take(), "image_width", true),
            (self.image_height.take(), "image_height", false),
            (self.video_width.take(), "video_width", true),
            (self.video_height.take(), "video_height", false),
        ];
        for (value, old, is_width) in aliases {
            if let Some(v) = value {
                if is_width {
                    deprecated(warnings, old, "width");
                    self.width = v;
                } else {
                    deprecated(warnings, old, "height");
                    self.height = v;
                }
            }
        }
        self
    }
}

/// Text panel options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub width: u32,
    pub height: u32,
    /// Columns to show; `None` shows every non-path column
    pub include: Option<Vec<String>>,
    pub ignore: Vec<String>,
    pub legend_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_height: Option<u32>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            width: 500,
            height: 300,
            include: None,
            ignore: Vec::new(),
            legend_text: None,
            container_width: None,
            container_height: None,
        }
    }
}

impl TextOptions {
    pub fn with_include<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_legend_text(mut self, html: impl Into<String>) -> Self {
        self.legend_text = Some(html.into());
        self
    }

    pub fn normalize(mut self, warnings: &mut Warnings) -> Self {
        if let Some(w) = self.container_width.take() {
            deprecated(warnings, "container_width", "width");
            self.width = w;
        }
        if let Some(h) = self.container_height.take() {
            deprecated(warnings, "container_height", "height");
            self.height = h;
        }
        self
    }
}

/// One entry of a layout file's widget list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetSpec {
    Image {
        column: String,
        #[serde(flatten)]
        options: MediaOptions,
    },
    Video {
        column: String,
        #[serde(flatten)]
        options: MediaOptions,
    },
    Text {
        #[serde(flatten)]
        options: TextOptions,
    },
}

/// Declarative page description loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutFile {
    pub config: BundleConfig,
    /// Panels in registration order
    pub widgets: Vec<WidgetSpec>,
    pub slider: bool,
    pub legend: bool,
    pub video_toggle: bool,
}

impl LayoutFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let layout = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), widgets = layout.widgets.len(), "loaded layout file");
        Ok(layout)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // BUNDLE CONFIG
    // ==========================================================================

    #[test]
    fn test_defaults() {
        let config = BundleConfig::default();
        assert_eq!((config.scatter_width, config.scatter_height), (600, 600));
        assert_eq!(config.float_precision, 2);
        assert_eq!(config.copy_dir_levels, 1);
        assert!(config.add_id_column && config.copy_media && config.hover_highlight);
        assert!(!config.clear_output_dir);
        assert_eq!(config.legend_position, LegendPosition::TopRight);
    }

    #[test]
    fn test_output_split() {
        let config = BundleConfig::new().with_output("out/cells.html");
        assert_eq!(config.output_dir(), PathBuf::from("out"));
        assert_eq!(config.file_name(), "cells.html");

        let bare = BundleConfig::new().with_output("cells.html");
        assert_eq!(bare.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_legend_position_parse() {
        assert_eq!("bottom-left".parse::<LegendPosition>(), Ok(LegendPosition::BottomLeft));
        assert!("middle".parse::<LegendPosition>().is_err());
    }

    // ==========================================================================
    // DEPRECATED NAMES
    // ==========================================================================

    #[test]
    fn test_media_aliases_override_and_warn() {
        let mut warnings = Warnings::new();
        let options = MediaOptions {
            image_height: Some(120),
            ..MediaOptions::default()
        }
        .normalize(&mut warnings);

        assert_eq!(options.height, 120);
        assert_eq!(options.width, 300);
        assert_eq!(options.image_height, None);
        assert_eq!(
            warnings.into_vec(),
            vec![Warning::DeprecatedOption {
                old: "image_height".into(),
                replacement: "height".into()
            }]
        );
    }

    #[test]
    fn test_text_aliases() {
        let mut warnings = Warnings::new();
        let options = TextOptions {
            container_width: Some(640),
            ..TextOptions::default()
        }
        .normalize(&mut warnings);
        assert_eq!(options.width, 640);
        assert_eq!(warnings.len(), 1);
    }

    // ==========================================================================
    // LAYOUT FILE
    // ==========================================================================

    #[test]
    fn test_layout_file_parses_partial_json() {
        let layout = LayoutFile::from_json(
            r#"{
                "config": { "output": "out/cells.html", "category_column": "condition" },
                "widgets": [
                    { "type": "image", "column": "path_to_images", "title": "Raw", "image_width": 200 },
                    { "type": "video", "column": "movie", "autoplay": false },
                    { "type": "text", "ignore": ["id"] }
                ],
                "slider": true
            }"#,
        )
        .unwrap();

        assert_eq!(layout.config.output, PathBuf::from("out/cells.html"));
        assert_eq!(layout.config.category_column.as_deref(), Some("condition"));
        assert_eq!(layout.config.scatter_width, 600, "missing keys keep defaults");
        assert!(layout.slider && !layout.legend);
        assert_eq!(layout.widgets.len(), 3);

        match &layout.widgets[0] {
            WidgetSpec::Image { column, options } => {
                assert_eq!(column, "path_to_images");
                assert_eq!(options.title.as_deref(), Some("Raw"));
                assert_eq!(options.image_width, Some(200));
            }
            other => panic!("expected image, got {:?}", other),
        }
        assert!(matches!(&layout.widgets[1], WidgetSpec::Video { options, .. } if !options.autoplay));
        assert!(matches!(&layout.widgets[2], WidgetSpec::Text { options } if options.ignore == vec!["id"]));
    }

    #[test]
    fn test_layout_file_rejects_bad_json() {
        assert!(matches!(LayoutFile::from_json("{ nope"), Err(BuildError::Layout(_))));
    }
}
