//! Event wiring: composes widget fragments into client-side handlers
//!
//! Runs once, after every widget is registered. For each trigger kind the
//! plan enables, one handler function is emitted:
//!
//! ```text
//! function onSlider(index) {
//!     state.currentIndex = index;      // prologue, owned by the protocol
//!     // mediascatter-scatter-0        // fragments, registration order
//!     plot.moveHighlight(...);
//!     // mediascatter-image-0
//!     msSetMedia(...);
//! }
//! ```
//!
//! Only widgets in the frozen [`SyncContext`] are referenced, so there is no
//! way for a late registration to be half-wired.

use crate::sync::{SyncContext, TriggerKind};
use crate::widgets::ElementId;
use std::fmt::Write;

/// Which optional pieces the page has, decided before code generation
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    /// Hovering a mark selects its row
    pub hover_highlight: bool,
    pub slider: Option<ElementId>,
    pub legend_toggle: Option<ElementId>,
    pub video_toggle: Option<ElementId>,
    pub float_precision: usize,
    /// Videos start playing
    pub autoplay: bool,
    pub row_count: usize,
}

impl BuildPlan {
    /// Whether a handler is generated for `kind`
    pub fn wires(&self, kind: TriggerKind) -> bool {
        match kind {
            TriggerKind::Hover => self.hover_highlight,
            TriggerKind::Slider => self.slider.is_some(),
            TriggerKind::AxisX | TriggerKind::AxisY => true,
            TriggerKind::LegendToggle => self.legend_toggle.is_some(),
            TriggerKind::VideoToggle => self.video_toggle.is_some(),
        }
    }
}

/// A widget's client-side reaction to one trigger kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub element: ElementId,
    pub code: String,
}

impl Fragment {
    pub fn new(element: &ElementId, code: impl Into<String>) -> Self {
        Self {
            element: element.clone(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub kind: TriggerKind,
    pub fragments: Vec<Fragment>,
}

impl Handler {
    pub fn name(&self) -> &'static str {
        handler_name(self.kind)
    }

    pub fn param(&self) -> &'static str {
        match self.kind {
            TriggerKind::Hover | TriggerKind::Slider => "index",
            TriggerKind::AxisX | TriggerKind::AxisY => "column",
            TriggerKind::LegendToggle | TriggerKind::VideoToggle => "",
        }
    }

    fn prologue(&self) -> &'static str {
        match self.kind {
            TriggerKind::Hover => {
                "if (index === null || index === undefined || index < 0 || index >= ROW_COUNT) {\n    return;\n}\nstate.currentIndex = index;"
            }
            TriggerKind::Slider => "state.currentIndex = index;",
            TriggerKind::AxisX => "state.activeX = column;",
            TriggerKind::AxisY => "state.activeY = column;",
            TriggerKind::LegendToggle => "ui.legendsVisible = !ui.legendsVisible;",
            TriggerKind::VideoToggle => "ui.videosPlaying = !ui.videosPlaying;",
        }
    }

    pub fn to_js(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "function {}({}) {{", self.name(), self.param());
        push_indented(&mut out, self.prologue());
        for fragment in &self.fragments {
            let _ = writeln!(out, "    // {}", fragment.element);
            push_indented(&mut out, &fragment.code);
        }
        out.push_str("}\n");
        out
    }
}

/// Name of the generated function for a trigger kind
pub fn handler_name(kind: TriggerKind) -> &'static str {
    match kind {
        TriggerKind::Hover => "onHover",
        TriggerKind::Slider => "onSlider",
        TriggerKind::AxisX => "onAxisX",
        TriggerKind::AxisY => "onAxisY",
        TriggerKind::LegendToggle => "onLegendToggle",
        TriggerKind::VideoToggle => "onVideoToggle",
    }
}

fn push_indented(out: &mut String, code: &str) {
    for line in code.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// All generated client logic: handlers plus per-widget setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientScript {
    pub handlers: Vec<Handler>,
    pub setup: Vec<Fragment>,
}

impl ClientScript {
    pub fn handler(&self, kind: TriggerKind) -> Option<&Handler> {
        self.handlers.iter().find(|h| h.kind == kind)
    }

    pub fn to_js(&self) -> String {
        let mut out = String::new();
        for handler in &self.handlers {
            out.push_str(&handler.to_js());
            out.push('\n');
        }
        for fragment in &self.setup {
            let _ = writeln!(out, "// {}", fragment.element);
            out.push_str(&fragment.code);
            if !fragment.code.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// Build the client script from a frozen context
pub fn generate(ctx: &SyncContext) -> ClientScript {
    let plan = ctx.plan();
    let view = ctx.view(ctx.initial_selection());

    let handlers: Vec<Handler> = TriggerKind::ALL
        .iter()
        .copied()
        .filter(|kind| plan.wires(*kind))
        .map(|kind| Handler {
            kind,
            fragments: ctx
                .bindings()
                .filter_map(|b| b.fragment(kind, &view))
                .collect(),
        })
        .collect();

    let setup: Vec<Fragment> = ctx.bindings().filter_map(|b| b.setup(&view)).collect();

    tracing::debug!(
        handlers = handlers.len(),
        fragments = handlers.iter().map(|h| h.fragments.len()).sum::<usize>(),
        "generated client script"
    );

    ClientScript { handlers, setup }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> BuildPlan {
        BuildPlan {
            hover_highlight: true,
            slider: None,
            legend_toggle: None,
            video_toggle: None,
            float_precision: 2,
            autoplay: true,
            row_count: 3,
        }
    }

    #[test]
    fn test_plan_decides_wired_handlers() {
        let mut p = plan();
        assert!(p.wires(TriggerKind::Hover));
        assert!(!p.wires(TriggerKind::Slider));
        assert!(p.wires(TriggerKind::AxisX));

        p.slider = Some(ElementId::new("slider", 0));
        p.hover_highlight = false;
        assert!(p.wires(TriggerKind::Slider));
        assert!(!p.wires(TriggerKind::Hover));
    }

    #[test]
    fn test_handler_concatenates_in_order() {
        let a = ElementId::new("image", 0);
        let b = ElementId::new("text", 0);
        let handler = Handler {
            kind: TriggerKind::Slider,
            fragments: vec![
                Fragment::new(&a, "first();"),
                Fragment::new(&b, "second();\nthird();"),
            ],
        };
        let js = handler.to_js();

        assert!(js.starts_with("function onSlider(index) {\n    state.currentIndex = index;\n"));
        let first = js.find("first();").unwrap();
        let second = js.find("second();").unwrap();
        let third = js.find("third();").unwrap();
        assert!(first < second && second < third);
        assert!(js.contains("    // mediascatter-image-0\n"));
        assert!(js.ends_with("}\n"));
    }

    #[test]
    fn test_hover_prologue_guards_empty_hits() {
        let handler = Handler {
            kind: TriggerKind::Hover,
            fragments: vec![],
        };
        let js = handler.to_js();
        let guard = js.find("index === null").unwrap();
        let assign = js.find("state.currentIndex = index;").unwrap();
        assert!(guard < assign, "guard must run before the state write");
    }

    #[test]
    fn test_axis_handler_takes_column() {
        let handler = Handler {
            kind: TriggerKind::AxisY,
            fragments: vec![],
        };
        assert!(handler.to_js().starts_with("function onAxisY(column) {\n    state.activeY = column;"));
    }
}
