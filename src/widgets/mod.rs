//! Widget bindings
//!
//! Each widget is a [`Binding`]: it renders its initial markup from the
//! selection, and for every trigger kind it produces two things with the same
//! meaning:
//!
//! - [`Binding::fragment`]: the client-side statements run inside the
//!   generated handler
//! - [`Binding::apply`]: the same update applied to the build-side
//!   [`PageView`]
//!
//! Fragments are pure functions of `(trigger kind, frozen context)`; nothing
//! accumulates across calls.

pub mod axis;
pub mod controls;
pub mod media;
pub mod scatter;
pub mod slider;
pub mod text;

pub use axis::AxisSelectors;
pub use controls::{LegendToggle, VideoToggle};
pub use media::{MediaKind, MediaPanel};
pub use scatter::ScatterPlot;
pub use slider::IndexSlider;
pub use text::TextPanel;

use crate::sync::{PageView, SelectionState, TriggerKind};
use crate::table::Table;
use crate::wiring::{BuildPlan, Fragment};
use serde::Serialize;
use std::fmt;

/// DOM id of a widget's main element, `mediascatter-<kind>-<n>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(kind: &str, n: usize) -> Self {
        ElementId(format!("mediascatter-{}-{}", kind, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of a sub-element, e.g. the X select of an axis pair
    pub fn child(&self, suffix: &str) -> String {
        format!("{}-{}", self.0, suffix)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Scatter,
    AxisSelectors,
    Slider,
    Image,
    Video,
    Text,
    LegendToggle,
    VideoToggle,
}

/// Read-only view handed to bindings
#[derive(Clone, Copy)]
pub struct SyncView<'a> {
    pub table: &'a Table,
    pub selection: &'a SelectionState,
    pub plan: &'a BuildPlan,
}

pub trait Binding {
    fn id(&self) -> &ElementId;

    fn kind(&self) -> WidgetKind;

    /// Path column the widget displays, if any
    fn source_column(&self) -> Option<&str> {
        None
    }

    /// Client statements for `trigger`; `None` when the widget ignores it
    fn fragment(&self, trigger: TriggerKind, view: &SyncView) -> Option<Fragment>;

    /// Build-side mirror of [`Binding::fragment`]
    fn apply(&self, trigger: TriggerKind, view: &SyncView, page: &mut PageView);

    /// Fill in the page as first rendered
    fn initialize(&self, view: &SyncView, page: &mut PageView) {
        for trigger in [TriggerKind::AxisX, TriggerKind::AxisY, TriggerKind::Slider] {
            self.apply(trigger, view, page);
        }
    }

    /// One-off client code run at load (construction, event listeners)
    fn setup(&self, _view: &SyncView) -> Option<Fragment> {
        None
    }

    fn markup(&self, view: &SyncView, page: &PageView) -> String;
}

/// Hint shown by the legend toggle, only emitted when the page has one
pub(crate) fn legend_overlay(view: &SyncView, html: &str) -> String {
    if view.plan.legend_toggle.is_none() || html.is_empty() {
        return String::new();
    }
    format!(r#"<div class="ms-legend">{}</div>"#, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ids() {
        let id = ElementId::new("image", 2);
        assert_eq!(id.as_str(), "mediascatter-image-2");
        assert_eq!(id.child("x"), "mediascatter-image-2-x");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"mediascatter-image-2\"");
    }
}
