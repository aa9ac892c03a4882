//! Scatter plot and its highlight layer
//!
//! One mark per row at `(source[activeX][row], source[activeY][row])`,
//! optionally colored by category, plus a single enlarged marker bound to the
//! current row. The drawing itself is done by `msScatter` in the client
//! runtime; this binding configures it and keeps the marker in sync.

use super::{legend_overlay, Binding, ElementId, SyncView, WidgetKind};
use crate::color::ColorMapping;
use crate::config::LegendPosition;
use crate::report::escape;
use crate::sync::{Axis, PageView, TriggerKind};
use crate::wiring::{handler_name, Fragment};

/// Global name of the plot handle in the client script
pub const PLOT: &str = "plot";

#[derive(Debug, Clone)]
pub struct ScatterPlot {
    id: ElementId,
    pub width: u32,
    pub height: u32,
    pub point_size: f64,
    pub alpha: f64,
    pub highlight_alpha: f64,
    pub colors: Option<ColorMapping>,
    pub legend_position: LegendPosition,
}

impl ScatterPlot {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            width: 600,
            height: 600,
            point_size: 10.0,
            alpha: 0.5,
            highlight_alpha: 0.3,
            colors: None,
            legend_position: LegendPosition::default(),
        }
    }

    fn rebind(axis: Axis) -> String {
        format!(
            "{plot}.setColumn(\"{a}\", source[column]);\n{plot}.setAxisLabel(\"{a}\", column);\n{}",
            Self::move_highlight("state.currentIndex"),
            plot = PLOT,
            a = axis.as_str(),
        )
    }

    fn move_highlight(index: &str) -> String {
        format!(
            "{plot}.moveHighlight(source[state.activeX][{i}], source[state.activeY][{i}]);",
            plot = PLOT,
            i = index
        )
    }
}

impl Binding for ScatterPlot {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::Scatter
    }

    fn fragment(&self, trigger: TriggerKind, _view: &SyncView) -> Option<Fragment> {
        let code = match trigger {
            TriggerKind::Hover | TriggerKind::Slider => Self::move_highlight("index"),
            // full column swap, then the same row under the new column
            TriggerKind::AxisX => Self::rebind(Axis::X),
            TriggerKind::AxisY => Self::rebind(Axis::Y),
            TriggerKind::LegendToggle | TriggerKind::VideoToggle => return None,
        };
        Some(Fragment::new(&self.id, code))
    }

    fn apply(&self, trigger: TriggerKind, view: &SyncView, page: &mut PageView) {
        match trigger {
            TriggerKind::Hover | TriggerKind::Slider => {}
            TriggerKind::AxisX => {
                let column = view.selection.active_x().to_string();
                page.plot_x = Some(column.clone());
                page.x_label = Some(column);
            }
            TriggerKind::AxisY => {
                let column = view.selection.active_y().to_string();
                page.plot_y = Some(column.clone());
                page.y_label = Some(column);
            }
            TriggerKind::LegendToggle | TriggerKind::VideoToggle => return,
        }
        page.marker = view.selection.marker(view.table);
    }

    fn setup(&self, view: &SyncView) -> Option<Fragment> {
        let (colors, legend) = match &self.colors {
            Some(mapping) => (
                escape::script_json(&mapping.colors).ok()?,
                escape::script_json(&mapping.legend).ok()?,
            ),
            None => ("null".to_string(), "[]".to_string()),
        };
        let on_hover = if view.plan.hover_highlight {
            handler_name(TriggerKind::Hover)
        } else {
            "null"
        };

        let code = format!(
            r#"const {plot} = msScatter({{
    element: {element},
    width: {width},
    height: {height},
    pointSize: {point_size},
    alpha: {alpha},
    highlightAlpha: {highlight_alpha},
    x: source[state.activeX],
    y: source[state.activeY],
    xLabel: state.activeX,
    yLabel: state.activeY,
    highlight: [source[state.activeX][state.currentIndex], source[state.activeY][state.currentIndex]],
    colors: {colors},
    legend: {legend},
    legendPosition: {position},
    onHover: {on_hover},
}});"#,
            plot = PLOT,
            element = escape::js_string(self.id.as_str()),
            width = self.width,
            height = self.height,
            point_size = self.point_size,
            alpha = self.alpha,
            highlight_alpha = self.highlight_alpha,
            colors = colors,
            legend = legend,
            position = escape::js_string(self.legend_position.as_str()),
            on_hover = on_hover,
        );
        Some(Fragment::new(&self.id, code))
    }

    fn markup(&self, view: &SyncView, _page: &PageView) -> String {
        let hint = match &self.colors {
            Some(mapping) => format!(
                "Hover over a point to show its sample. Colors follow <i>{}</i>.",
                escape::html(&mapping.column)
            ),
            None => "Hover over a point to show its sample.".to_string(),
        };
        format!(
            r#"<div class="ms-panel ms-scatter"><div id="{id}" class="ms-plot-host" style="width:{w}px;height:{h}px"></div>{hint}</div>"#,
            id = self.id,
            w = self.width,
            h = self.height,
            hint = legend_overlay(view, &hint),
        )
    }
}
