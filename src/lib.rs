//! mediascatter - Portable scatter plots linked to per-sample media
//!
//! mediascatter turns a table of per-sample measurements into a single
//! self-contained HTML page: a scatter plot of two numeric columns whose
//! points are linked to the sample's image, video and annotations. Hovering a
//! point (or dragging the index slider) shows that sample everywhere at once.
//!
//! # Overview
//!
//! The output is a bundle directory that works offline and can be zipped and
//! shared:
//!
//! ```text
//! bundle/
//! ├── index.html                        data, runtime and handlers inline
//! ├── data/<preserved dirs>/<file>      copied media
//! └── PLEASE_MAKE_SURE_IM_UNZIPPED.txt
//! ```
//!
//! The page has exactly one piece of shared state, the selection (current
//! row plus the active X/Y columns). Every widget contributes a fragment to
//! the generated handler of each interaction it reacts to, so an interaction
//! updates all widgets in one pass. The same protocol runs build-side in
//! [`sync::Session`], which is what the tests drive.
//!
//! # Quick Start
//!
//! ```no_run
//! use mediascatter::{BundleConfig, DashboardBuilder, MediaOptions, TextOptions};
//!
//! # fn main() -> mediascatter::Result<()> {
//! let table = mediascatter::table::csv::read_path("measurements.csv")?;
//! let config = BundleConfig::new().with_output("bundle/index.html");
//!
//! let mut builder = DashboardBuilder::new(table, config)?;
//! builder.add_image("path_to_images", MediaOptions::default())?;
//! builder.add_text(TextOptions::default());
//! builder.add_slider();
//!
//! let report = builder.wire()?.write(None)?;
//! println!("wrote {} ({} files copied)", report.html.display(), report.copied);
//! for warning in &report.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`table`]: typed columns, numeric detection, CSV loading
//! - [`color`]: category → color mapping
//! - [`sync`]: selection state, triggers and the build-side session
//! - [`widgets`]: the widget bindings (plot, selectors, slider, panels, toggles)
//! - [`wiring`]: handler generation
//! - [`bundle`]: output directory and media copying
//! - [`dashboard`]: builder, pipeline and layout
//! - [`report`]: HTML document output
//! - [`config`]: options and layout files
//! - [`error`]: fatal errors and recoverable warnings

pub mod bundle;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod report;
pub mod sync;
pub mod table;
pub mod widgets;
pub mod wiring;

pub use bundle::{BundleReport, BundleSummary};
pub use config::{BundleConfig, LayoutFile, LegendPosition, MediaOptions, TextOptions, WidgetSpec};
pub use dashboard::{Dashboard, DashboardBuilder, Layout, WidgetIds};
pub use error::{BuildError, Result, Warning, Warnings};
pub use sync::{Axis, SelectionState, Session, Trigger, TriggerKind};
pub use table::{Column, ColumnKind, Table, Value};
pub use widgets::ElementId;

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is reachable from the crate
    // root.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        let _config: BundleConfig = BundleConfig::new();
        let _media: MediaOptions = MediaOptions::default();
        let _text: TextOptions = TextOptions::default();
        let _ = LegendPosition::TopRight;
        let _ = Trigger::Hover(None);
    }

    #[test]
    fn test_builder_from_crate_root() {
        let table = Table::new(vec![
            Column::floats("a", [0.1, 0.2]),
            Column::floats("b", [1.0, 2.0]),
        ])
        .unwrap();
        let builder = DashboardBuilder::new(table, BundleConfig::new()).unwrap();
        assert_eq!(builder.axes(), ("a", "b"));
        assert_eq!(builder.scatter_id().as_str(), "mediascatter-scatter-0");
    }

    #[test]
    fn test_trigger_kinds() {
        assert_eq!(TriggerKind::ALL.len(), 6);
        assert_eq!(Trigger::Axis(Axis::Y, "b".into()).kind(), TriggerKind::AxisY);
    }
}
