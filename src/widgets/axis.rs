//! X/Y axis dropdowns
//!
//! Two independent `<select>` elements over the same candidate list. A change
//! calls `onAxisX(column)` / `onAxisY(column)`; the rebinding itself happens in
//! the scatter plot's fragment for that trigger.

use super::{legend_overlay, Binding, ElementId, SyncView, WidgetKind};
use crate::report::escape;
use crate::sync::{Axis, PageView, TriggerKind};
use crate::wiring::{handler_name, Fragment};

#[derive(Debug, Clone)]
pub struct AxisSelectors {
    id: ElementId,
    candidates: Vec<String>,
}

impl AxisSelectors {
    /// `candidates` must already be filtered to numeric columns
    pub fn new(id: ElementId, candidates: Vec<String>) -> Self {
        Self { id, candidates }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// DOM id of the select for one axis
    pub fn select_id(&self, axis: Axis) -> String {
        self.id.child(axis.as_str())
    }

    fn select(&self, axis: Axis, active: &str) -> String {
        let mut options = String::new();
        for name in &self.candidates {
            let selected = if name == active { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="{v}"{s}>{v}</option>"#,
                v = escape::html(name),
                s = selected
            ));
        }
        format!(
            r#"<label class="ms-axis-select">{label} axis <select id="{id}">{options}</select></label>"#,
            label = axis.as_str().to_uppercase(),
            id = self.select_id(axis),
            options = options
        )
    }
}

impl Binding for AxisSelectors {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::AxisSelectors
    }

    fn fragment(&self, _trigger: TriggerKind, _view: &SyncView) -> Option<Fragment> {
        None
    }

    fn apply(&self, _trigger: TriggerKind, _view: &SyncView, _page: &mut PageView) {}

    fn setup(&self, _view: &SyncView) -> Option<Fragment> {
        let listen = |axis: Axis, kind: TriggerKind| {
            format!(
                "document.getElementById({id}).addEventListener(\"change\", function (event) {{\n    {handler}(event.target.value);\n}});",
                id = escape::js_string(&self.select_id(axis)),
                handler = handler_name(kind)
            )
        };
        let code = format!(
            "{}\n{}",
            listen(Axis::X, TriggerKind::AxisX),
            listen(Axis::Y, TriggerKind::AxisY)
        );
        Some(Fragment::new(&self.id, code))
    }

    fn markup(&self, view: &SyncView, _page: &PageView) -> String {
        format!(
            r#"<div id="{id}" class="ms-panel ms-axes">{x}{y}{hint}</div>"#,
            id = self.id,
            x = self.select(Axis::X, view.selection.active_x()),
            y = self.select(Axis::Y, view.selection.active_y()),
            hint = legend_overlay(view, "Pick the columns shown on each axis."),
        )
    }
}
