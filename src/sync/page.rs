//! What the rendered page currently shows
//!
//! [`PageView`] is the build-side model of the DOM the generated script
//! manipulates. Bindings write into it with the same semantics as their
//! client fragments, so the initial markup and the protocol tests read from
//! one source.

use crate::widgets::ElementId;
use std::collections::BTreeMap;

/// Highlight marker position in data coordinates. A null cell leaves the
/// coordinate empty and the marker hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Marker {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaView {
    pub src: String,
    /// Row whose media is loaded
    pub shown_index: usize,
    /// Number of times the source was (re)assigned, including the first
    pub loads: usize,
    pub missing: bool,
    /// Videos only
    pub playing: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub marker: Marker,
    /// Columns the plot marks are currently drawn from
    pub plot_x: Option<String>,
    pub plot_y: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub slider_value: Option<usize>,
    pub media: BTreeMap<ElementId, MediaView>,
    /// Text panels, one `"<column>: <value>"` line per shown column
    pub text: BTreeMap<ElementId, Vec<String>>,
    pub legends_visible: bool,
    pub videos_playing: bool,
}

impl PageView {
    pub fn media(&self, id: &ElementId) -> Option<&MediaView> {
        self.media.get(id)
    }

    pub fn text(&self, id: &ElementId) -> Option<&[String]> {
        self.text.get(id).map(|lines| lines.as_slice())
    }
}
