//! Selection state and the synchronization protocol
//!
//! The rendered page has exactly one piece of shared mutable state: the
//! [`SelectionState`] (current row index plus the active X/Y columns). Every
//! widget either originates a change to it (hovering a point, dragging the
//! slider, picking an axis) or reacts to one.
//!
//! A [`Trigger`] runs in two phases, mirrored exactly by the generated
//! client script:
//!
//! 1. **Prologue**: the trigger mutates the selection (or the presentational
//!    toggles) once.
//! 2. **Propagation**: every registered widget applies its update for that
//!    trigger kind, in registration order, synchronously.
//!
//! Handlers never re-enter: updating the slider from a hover sets its value
//! directly and never fires the slider trigger.
//!
//! [`SyncContext`] is the frozen result of wiring (data snapshot, build plan,
//! widget registry). A [`Session`] is one page lifetime on top of it: it owns
//! the selection and the [`PageView`], and is what tests drive to check the
//! protocol without a browser.

mod page;

pub use page::{Marker, MediaView, PageView};

use crate::error::{BuildError, Result};
use crate::table::Table;
use crate::widgets::{Binding, SyncView};
use crate::wiring::BuildPlan;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// The kinds of interaction a handler is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerKind {
    Hover,
    Slider,
    AxisX,
    AxisY,
    LegendToggle,
    VideoToggle,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 6] = [
        TriggerKind::Hover,
        TriggerKind::Slider,
        TriggerKind::AxisX,
        TriggerKind::AxisY,
        TriggerKind::LegendToggle,
        TriggerKind::VideoToggle,
    ];

    /// Whether handlers of this kind receive a row `index`
    pub fn carries_index(self) -> bool {
        matches!(self, TriggerKind::Hover | TriggerKind::Slider)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerKind::Hover => "hover",
            TriggerKind::Slider => "slider",
            TriggerKind::AxisX => "axis-x",
            TriggerKind::AxisY => "axis-y",
            TriggerKind::LegendToggle => "legend-toggle",
            TriggerKind::VideoToggle => "video-toggle",
        };
        f.write_str(name)
    }
}

/// One user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Pointer over the plot; `None` when no mark is under it
    Hover(Option<usize>),
    Slider(usize),
    Axis(Axis, String),
    LegendToggle,
    VideoToggle,
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Hover(_) => TriggerKind::Hover,
            Trigger::Slider(_) => TriggerKind::Slider,
            Trigger::Axis(Axis::X, _) => TriggerKind::AxisX,
            Trigger::Axis(Axis::Y, _) => TriggerKind::AxisY,
            Trigger::LegendToggle => TriggerKind::LegendToggle,
            Trigger::VideoToggle => TriggerKind::VideoToggle,
        }
    }
}

/// Currently highlighted row and active axis columns.
///
/// `current_index < row_count` and both active columns name numeric columns,
/// from construction on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    current_index: usize,
    active_x: String,
    active_y: String,
}

impl SelectionState {
    pub fn new(table: &Table, x: &str, y: &str) -> Result<Self> {
        table.require_numeric(x)?;
        table.require_numeric(y)?;
        Ok(Self {
            current_index: 0,
            active_x: x.to_string(),
            active_y: y.to_string(),
        })
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn active_x(&self) -> &str {
        &self.active_x
    }

    pub fn active_y(&self) -> &str {
        &self.active_y
    }

    pub fn active(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.active_x,
            Axis::Y => &self.active_y,
        }
    }

    pub fn select(&mut self, index: usize, row_count: usize) -> Result<()> {
        if index >= row_count {
            return Err(BuildError::IndexOutOfRange { index, row_count });
        }
        self.current_index = index;
        Ok(())
    }

    pub fn set_axis(&mut self, axis: Axis, column: &str, table: &Table) -> Result<()> {
        table.require_numeric(column)?;
        match axis {
            Axis::X => self.active_x = column.to_string(),
            Axis::Y => self.active_y = column.to_string(),
        }
        Ok(())
    }

    /// Highlight coordinate for the current row under the active columns
    pub fn marker(&self, table: &Table) -> Marker {
        let at = |column: &str| {
            table
                .value(self.current_index, column)
                .and_then(|v| v.as_f64())
        };
        Marker {
            x: at(&self.active_x),
            y: at(&self.active_y),
        }
    }
}

/// Frozen output of wiring: the data snapshot, the build plan and the
/// widget registry in registration order.
pub struct SyncContext {
    table: Table,
    plan: BuildPlan,
    initial: SelectionState,
    registry: Vec<Box<dyn Binding>>,
}

impl SyncContext {
    pub fn new(
        table: Table,
        plan: BuildPlan,
        initial: SelectionState,
        registry: Vec<Box<dyn Binding>>,
    ) -> Self {
        Self {
            table,
            plan,
            initial,
            registry,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    pub fn initial_selection(&self) -> &SelectionState {
        &self.initial
    }

    pub fn bindings(&self) -> impl Iterator<Item = &dyn Binding> {
        self.registry.iter().map(|b| b.as_ref())
    }

    pub fn binding(&self, id: &str) -> Option<&dyn Binding> {
        self.bindings().find(|b| b.id().as_str() == id)
    }

    pub fn view<'a>(&'a self, selection: &'a SelectionState) -> SyncView<'a> {
        SyncView {
            table: &self.table,
            selection,
            plan: &self.plan,
        }
    }

    /// Page as first rendered, before any interaction
    pub fn initial_page(&self) -> PageView {
        let mut page = PageView {
            videos_playing: self.plan.autoplay,
            ..PageView::default()
        };
        let view = self.view(&self.initial);
        for binding in &self.registry {
            binding.initialize(&view, &mut page);
        }
        page
    }

    pub fn session(&self) -> Session<'_> {
        Session {
            ctx: self,
            selection: self.initial.clone(),
            page: self.initial_page(),
        }
    }
}

/// One page lifetime: the live selection plus what the page shows
pub struct Session<'a> {
    ctx: &'a SyncContext,
    selection: SelectionState,
    page: PageView,
}

impl<'a> Session<'a> {
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn page(&self) -> &PageView {
        &self.page
    }

    /// Run one trigger to completion. Returns `Ok(false)` when the trigger is
    /// a no-op (empty hover, or a control the plan doesn't include).
    pub fn dispatch(&mut self, trigger: Trigger) -> Result<bool> {
        let plan = &self.ctx.plan;
        let table = &self.ctx.table;

        match &trigger {
            Trigger::Hover(None) => return Ok(false),
            Trigger::Hover(Some(index)) => {
                if !plan.hover_highlight || *index >= table.row_count() {
                    return Ok(false);
                }
                self.selection.select(*index, table.row_count())?;
            }
            Trigger::Slider(index) => {
                if plan.slider.is_none() {
                    return Ok(false);
                }
                self.selection.select(*index, table.row_count())?;
            }
            Trigger::Axis(axis, column) => {
                self.selection.set_axis(*axis, column, table)?;
            }
            Trigger::LegendToggle => {
                if plan.legend_toggle.is_none() {
                    return Ok(false);
                }
                self.page.legends_visible = !self.page.legends_visible;
            }
            Trigger::VideoToggle => {
                if plan.video_toggle.is_none() {
                    return Ok(false);
                }
                self.page.videos_playing = !self.page.videos_playing;
            }
        }

        let kind = trigger.kind();
        let view = self.ctx.view(&self.selection);
        for binding in &self.ctx.registry {
            binding.apply(kind, &view, &mut self.page);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::integers("x1", [1, 2, 3]),
            Column::integers("x2", [1, 4, 16]),
            Column::floats("x3", [0.5, 1.5, 2.5]),
            Column::text("animal", ["cat", "dog", "dog"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_selection_requires_numeric_axes() {
        let t = table();
        assert!(SelectionState::new(&t, "x1", "x2").is_ok());
        assert!(matches!(
            SelectionState::new(&t, "x1", "animal"),
            Err(BuildError::NotNumeric(_))
        ));
        assert!(matches!(
            SelectionState::new(&t, "nope", "x2"),
            Err(BuildError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let t = table();
        let mut s = SelectionState::new(&t, "x1", "x2").unwrap();
        assert!(s.select(2, t.row_count()).is_ok());
        assert_eq!(s.current_index(), 2);

        let err = s.select(3, t.row_count()).unwrap_err();
        assert!(matches!(err, BuildError::IndexOutOfRange { index: 3, row_count: 3 }));
        // failed select leaves state alone
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn test_marker_follows_active_columns() {
        let t = table();
        let mut s = SelectionState::new(&t, "x1", "x2").unwrap();
        s.select(2, t.row_count()).unwrap();
        assert_eq!(s.marker(&t), Marker { x: Some(3.0), y: Some(16.0) });

        s.set_axis(Axis::X, "x3", &t).unwrap();
        assert_eq!(s.marker(&t), Marker { x: Some(2.5), y: Some(16.0) });
    }

    #[test]
    fn test_set_axis_rejects_text_column() {
        let t = table();
        let mut s = SelectionState::new(&t, "x1", "x2").unwrap();
        assert!(s.set_axis(Axis::Y, "animal", &t).is_err());
        assert_eq!(s.active_y(), "x2");
    }

    #[test]
    fn test_selection_serializes_camel_case() {
        let t = table();
        let s = SelectionState::new(&t, "x1", "x2").unwrap();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"currentIndex":0,"activeX":"x1","activeY":"x2"}"#);
    }

    #[test]
    fn test_trigger_kinds() {
        assert_eq!(Trigger::Hover(None).kind(), TriggerKind::Hover);
        assert_eq!(Trigger::Axis(Axis::Y, "x".into()).kind(), TriggerKind::AxisY);
        assert!(TriggerKind::Slider.carries_index());
        assert!(!TriggerKind::AxisX.carries_index());
    }
}
