//! Manual index slider
//!
//! An integer `<input type="range">` over `[0, row_count - 1]`. Dragging or
//! arrow-key stepping calls `onSlider(index)`. On hover the slider only
//! mirrors the new index: assigning `.value` from script does not fire the
//! `input` event, so the slider path is never re-entered.

use super::{legend_overlay, Binding, ElementId, SyncView, WidgetKind};
use crate::report::escape;
use crate::sync::{PageView, TriggerKind};
use crate::wiring::{handler_name, Fragment};

#[derive(Debug, Clone)]
pub struct IndexSlider {
    id: ElementId,
}

impl IndexSlider {
    pub fn new(id: ElementId) -> Self {
        Self { id }
    }

    pub fn value_id(&self) -> String {
        self.id.child("value")
    }
}

impl Binding for IndexSlider {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::Slider
    }

    fn fragment(&self, trigger: TriggerKind, _view: &SyncView) -> Option<Fragment> {
        if !trigger.carries_index() {
            return None;
        }
        Some(Fragment::new(
            &self.id,
            format!("msSetSlider({}, index);", escape::js_string(self.id.as_str())),
        ))
    }

    fn apply(&self, trigger: TriggerKind, view: &SyncView, page: &mut PageView) {
        if trigger.carries_index() {
            page.slider_value = Some(view.selection.current_index());
        }
    }

    fn setup(&self, _view: &SyncView) -> Option<Fragment> {
        let code = format!(
            "document.getElementById({id}).addEventListener(\"input\", function (event) {{\n    {handler}(parseInt(event.target.value, 10));\n}});",
            id = escape::js_string(self.id.as_str()),
            handler = handler_name(TriggerKind::Slider),
        );
        Some(Fragment::new(&self.id, code))
    }

    fn markup(&self, view: &SyncView, page: &PageView) -> String {
        let value = page
            .slider_value
            .unwrap_or_else(|| view.selection.current_index());
        let max = view.table.row_count().saturating_sub(1);
        format!(
            r#"<div class="ms-panel ms-slider"><label for="{id}">Index <span id="{value_id}">{value}</span> / {max}</label><input type="range" id="{id}" min="0" max="{max}" step="1" value="{value}" aria-label="Row index">{hint}</div>"#,
            id = self.id,
            value_id = self.value_id(),
            value = value,
            max = max,
            hint = legend_overlay(
                view,
                "Drag to step through the samples. Once focused, the arrow keys move one row at a time."
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SelectionState;
    use crate::table::{Column, Table};
    use crate::wiring::BuildPlan;

    fn fixture() -> (Table, SelectionState, BuildPlan) {
        let table = Table::new(vec![
            Column::integers("x1", [1, 2, 3, 4]),
            Column::integers("x2", [1, 4, 9, 16]),
        ])
        .unwrap();
        let selection = SelectionState::new(&table, "x1", "x2").unwrap();
        let plan = BuildPlan {
            hover_highlight: true,
            slider: Some(ElementId::new("slider", 0)),
            legend_toggle: None,
            video_toggle: None,
            float_precision: 2,
            autoplay: true,
            row_count: 4,
        };
        (table, selection, plan)
    }

    #[test]
    fn test_range_spans_all_rows() {
        let (table, selection, plan) = fixture();
        let view = SyncView { table: &table, selection: &selection, plan: &plan };
        let slider = IndexSlider::new(ElementId::new("slider", 0));
        let html = slider.markup(&view, &PageView::default());

        assert!(html.contains(r#"min="0" max="3" step="1" value="0""#), "got: {}", html);
    }

    #[test]
    fn test_mirrors_index_triggers_only() {
        let (table, mut selection, plan) = fixture();
        let slider = IndexSlider::new(ElementId::new("slider", 0));
        let mut page = PageView::default();

        selection.select(2, 4).unwrap();
        let view = SyncView { table: &table, selection: &selection, plan: &plan };
        slider.apply(TriggerKind::Hover, &view, &mut page);
        assert_eq!(page.slider_value, Some(2));

        assert!(slider.fragment(TriggerKind::Hover, &view).is_some());
        assert!(slider.fragment(TriggerKind::AxisX, &view).is_none());
    }

    #[test]
    fn test_hover_fragment_never_calls_slider_handler() {
        let (table, selection, plan) = fixture();
        let view = SyncView { table: &table, selection: &selection, plan: &plan };
        let slider = IndexSlider::new(ElementId::new("slider", 0));
        let code = slider.fragment(TriggerKind::Hover, &view).unwrap().code;
        assert!(!code.contains("onSlider"), "hover must not re-enter the slider path");
    }
}
