//! Dashboard assembly
//!
//! Two stages, in this order:
//!
//! 1. [`DashboardBuilder`]: load the table, pick the default axes and the
//!    dropdown candidates, then register panels (images, videos, text) and
//!    controls (slider, legend toggle, video toggle).
//! 2. [`DashboardBuilder::wire`] consumes the builder and runs the pipeline:
//!
//! ```text
//! table ─► identity column ─► path-resolved ─► color mapping ─► SyncContext ─► ClientScript
//! ```
//!
//! The result is a [`Dashboard`], which can be inspected ([`Dashboard::session`]
//! drives the synchronization protocol without a browser) and written to disk.
//! Nothing can be registered once wiring has happened, so every handler
//! references exactly the widgets that exist.

pub mod layout;

pub use layout::Layout;

use crate::bundle::{prepare_output_dir, write_marker, BundleReport, CopyEvent, PathResolver};
use crate::color::ColorMapping;
use crate::config::{BundleConfig, LayoutFile, MediaOptions, TextOptions, WidgetSpec};
use crate::error::{BuildError, Result, Warning, Warnings};
use crate::report::{self, Document};
use crate::sync::{SelectionState, Session, SyncContext};
use crate::table::{Table, Value, ID_COLUMN};
use crate::widgets::{
    AxisSelectors, Binding, ElementId, IndexSlider, LegendToggle, MediaKind, MediaPanel, ScatterPlot,
    TextPanel, VideoToggle,
};
use crate::wiring::{self, BuildPlan, ClientScript};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

type CopyObserver = Box<dyn FnMut(&CopyEvent)>;

enum Panel {
    Media {
        id: ElementId,
        kind: MediaKind,
        column: String,
        options: MediaOptions,
    },
    Text {
        id: ElementId,
        options: TextOptions,
    },
}

impl Panel {
    fn id(&self) -> &ElementId {
        match self {
            Panel::Media { id, .. } | Panel::Text { id, .. } => id,
        }
    }

    fn media_column(&self) -> Option<&str> {
        match self {
            Panel::Media { column, .. } => Some(column),
            Panel::Text { .. } => None,
        }
    }
}

/// Registration stage
pub struct DashboardBuilder {
    config: BundleConfig,
    table: Table,
    x_axis: String,
    y_axis: String,
    candidates: Vec<String>,
    warnings: Warnings,
    scatter: ElementId,
    axes: ElementId,
    panels: Vec<Panel>,
    slider: Option<ElementId>,
    legend: Option<ElementId>,
    video_toggle: Option<ElementId>,
    counters: BTreeMap<&'static str, usize>,
    observer: Option<CopyObserver>,
}

impl DashboardBuilder {
    /// Prepare a dashboard over `table`.
    ///
    /// Fails when the axes can't be resolved: an explicit axis that is unknown
    /// or not numeric, or too few numeric columns to pick defaults.
    pub fn new(table: Table, config: BundleConfig) -> Result<Self> {
        let mut warnings = Warnings::new();

        let table = if config.add_id_column {
            let (table, warning) = table.with_identity_column();
            if let Some(w) = warning {
                warnings.push(w);
            }
            table
        } else {
            table
        };

        let (x_axis, y_axis) = default_axes(&table, &config)?;
        let candidates = dropdown_candidates(
            &table,
            config.dropdown_options.as_deref(),
            [&x_axis, &y_axis],
            &mut warnings,
        );
        if let Some(category) = &config.category_column {
            table.require(category)?;
        }

        tracing::debug!(
            rows = table.row_count(),
            x = %x_axis,
            y = %y_axis,
            candidates = candidates.len(),
            "prepared dashboard"
        );

        let mut counters = BTreeMap::new();
        let scatter = next_id(&mut counters, "scatter");
        let axes = next_id(&mut counters, "axes");

        Ok(Self {
            config,
            table,
            x_axis,
            y_axis,
            candidates,
            warnings,
            scatter,
            axes,
            panels: Vec::new(),
            slider: None,
            legend: None,
            video_toggle: None,
            counters,
            observer: None,
        })
    }

    /// Builder with everything a layout file declares registered
    pub fn from_layout(table: Table, layout: &LayoutFile) -> Result<Self> {
        let mut builder = Self::new(table, layout.config.clone())?;
        for spec in &layout.widgets {
            match spec {
                WidgetSpec::Image { column, options } => {
                    builder.add_image(column, options.clone())?;
                }
                WidgetSpec::Video { column, options } => {
                    builder.add_video(column, options.clone())?;
                }
                WidgetSpec::Text { options } => {
                    builder.add_text(options.clone());
                }
            }
        }
        if layout.slider {
            builder.add_slider();
        }
        if layout.legend {
            builder.add_legend();
        }
        if layout.video_toggle {
            builder.add_video_toggle();
        }
        Ok(builder)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Axes the page starts on
    pub fn axes(&self) -> (&str, &str) {
        (&self.x_axis, &self.y_axis)
    }

    /// Columns offered by the axis dropdowns
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn scatter_id(&self) -> &ElementId {
        &self.scatter
    }

    pub fn axes_id(&self) -> &ElementId {
        &self.axes
    }

    pub fn add_image(&mut self, column: &str, options: MediaOptions) -> Result<ElementId> {
        self.add_media(MediaKind::Image, column, options)
    }

    pub fn add_video(&mut self, column: &str, options: MediaOptions) -> Result<ElementId> {
        self.add_media(MediaKind::Video, column, options)
    }

    fn add_media(&mut self, kind: MediaKind, column: &str, options: MediaOptions) -> Result<ElementId> {
        self.table.require(column)?;
        let options = options.normalize(&mut self.warnings);
        let id = next_id(&mut self.counters, kind.as_str());
        tracing::debug!(id = %id, column, "registered {} panel", kind.as_str());
        self.panels.push(Panel::Media {
            id: id.clone(),
            kind,
            column: column.to_string(),
            options,
        });
        Ok(id)
    }

    /// Register a text panel. Include/ignore names that are not columns are
    /// dropped with a warning.
    pub fn add_text(&mut self, options: TextOptions) -> ElementId {
        let mut options = options.normalize(&mut self.warnings);
        let table = &self.table;
        let warnings = &mut self.warnings;
        let mut known = |name: &String| {
            let exists = table.has_column(name);
            if !exists {
                warnings.push(Warning::UnknownTextColumn(name.clone()));
            }
            exists
        };
        if let Some(include) = options.include.as_mut() {
            include.retain(&mut known);
        }
        options.ignore.retain(&mut known);

        let id = next_id(&mut self.counters, "text");
        tracing::debug!(id = %id, "registered text panel");
        self.panels.push(Panel::Text {
            id: id.clone(),
            options,
        });
        id
    }

    /// Attach the index slider; calling again returns the same slider
    pub fn add_slider(&mut self) -> ElementId {
        if let Some(id) = &self.slider {
            return id.clone();
        }
        let id = next_id(&mut self.counters, "slider");
        self.slider = Some(id.clone());
        id
    }

    pub fn add_legend(&mut self) -> ElementId {
        if let Some(id) = &self.legend {
            return id.clone();
        }
        let id = next_id(&mut self.counters, "legend");
        self.legend = Some(id.clone());
        id
    }

    pub fn add_video_toggle(&mut self) -> ElementId {
        if let Some(id) = &self.video_toggle {
            return id.clone();
        }
        let id = next_id(&mut self.counters, "video-toggle");
        self.video_toggle = Some(id.clone());
        id
    }

    /// Called once per file copied into the bundle
    pub fn on_copy<F: FnMut(&CopyEvent) + 'static>(&mut self, observer: F) {
        self.observer = Some(Box::new(observer));
    }

    /// Distinct non-empty media references across all media panels (an upper
    /// bound on the number of copies)
    pub fn media_count(&self) -> usize {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut columns: BTreeSet<&str> = BTreeSet::new();
        for column in self.panels.iter().filter_map(Panel::media_column) {
            if !columns.insert(column) {
                continue;
            }
            if let Some(c) = self.table.column(column) {
                for value in &c.values {
                    if !matches!(value, Value::Null) {
                        let raw = value.display(None);
                        if !raw.trim().is_empty() {
                            seen.insert(raw);
                        }
                    }
                }
            }
        }
        seen.len()
    }

    /// Freeze the registry, build the bundle directory and generate the
    /// client script.
    pub fn wire(mut self) -> Result<Dashboard> {
        let output_dir = self.config.output_dir();
        prepare_output_dir(&output_dir, self.config.clear_output_dir, &mut self.warnings)?;

        // path resolution: one resolver for every media column
        let mut resolver = PathResolver::new(&output_dir, self.config.copy_dir_levels)
            .with_copy(self.config.copy_media);
        let mut observer: CopyObserver = match self.observer.take() {
            Some(observer) => observer,
            None => Box::new(|_: &CopyEvent| {}),
        };
        let mut missing: BTreeMap<String, Vec<bool>> = BTreeMap::new();
        let mut table = self.table;
        for column in self.panels.iter().filter_map(Panel::media_column) {
            if missing.contains_key(column) {
                continue;
            }
            let resolved = resolver.resolve(table.require(column)?, &mut self.warnings, &mut *observer)?;
            missing.insert(column.to_string(), resolved.missing);
            table = table.with_column(resolved.column)?;
        }

        let colors = match &self.config.category_column {
            Some(column) => Some(ColorMapping::from_column(table.require(column)?, &self.config.palette)),
            None => None,
        };

        let selection = SelectionState::new(&table, &self.x_axis, &self.y_axis)?;

        let videos: Vec<&MediaOptions> = self
            .panels
            .iter()
            .filter_map(|p| match p {
                Panel::Media { kind: MediaKind::Video, options, .. } => Some(options),
                _ => None,
            })
            .collect();
        let plan = BuildPlan {
            hover_highlight: self.config.hover_highlight,
            slider: self.slider.clone(),
            legend_toggle: self.legend.clone(),
            video_toggle: self.video_toggle.clone(),
            float_precision: self.config.float_precision,
            autoplay: videos.is_empty() || videos.iter().any(|o| o.autoplay),
            row_count: table.row_count(),
        };

        let mut ids = WidgetIds {
            scatter: self.scatter.clone(),
            axes: self.axes.clone(),
            media: Vec::new(),
            text: Vec::new(),
            panels: self.panels.iter().map(|p| p.id().clone()).collect(),
            slider: self.slider.clone(),
            legend: self.legend.clone(),
            video_toggle: self.video_toggle.clone(),
        };

        // registration order: scatter block, panels, controls
        let mut registry: Vec<Box<dyn Binding>> = Vec::new();

        let mut scatter = ScatterPlot::new(self.scatter);
        scatter.width = self.config.scatter_width;
        scatter.height = self.config.scatter_height;
        scatter.point_size = self.config.point_size;
        scatter.alpha = self.config.scatter_alpha;
        scatter.highlight_alpha = self.config.highlight_alpha;
        scatter.colors = colors.clone();
        scatter.legend_position = self.config.legend_position;
        registry.push(Box::new(scatter));
        registry.push(Box::new(AxisSelectors::new(self.axes, self.candidates)));

        for panel in self.panels {
            match panel {
                Panel::Media { id, kind, column, options } => {
                    let mut media = MediaPanel::new(id.clone(), kind, &column);
                    media.width = options.width;
                    media.height = options.height;
                    media.title = options.title;
                    media.legend_text = options.legend_text;
                    media.autoplay = options.autoplay;
                    media.missing = missing.get(&column).cloned().unwrap_or_default();
                    ids.media.push(id);
                    registry.push(Box::new(media));
                }
                Panel::Text { id, options } => {
                    let mut text = TextPanel::new(id.clone());
                    text.width = options.width;
                    text.height = options.height;
                    text.include = options.include;
                    text.ignore = options.ignore;
                    text.legend_text = options.legend_text;
                    ids.text.push(id);
                    registry.push(Box::new(text));
                }
            }
        }
        if let Some(id) = self.slider {
            registry.push(Box::new(IndexSlider::new(id)));
        }
        if let Some(id) = self.legend {
            registry.push(Box::new(LegendToggle::new(id)));
        }
        if let Some(id) = self.video_toggle {
            registry.push(Box::new(VideoToggle::new(id)));
        }

        let context = SyncContext::new(table, plan, selection, registry);
        let script = wiring::generate(&context);

        tracing::debug!(
            widgets = context.bindings().count(),
            copied = resolver.copied(),
            "wired dashboard"
        );

        Ok(Dashboard {
            config: self.config,
            copied: resolver.copied(),
            used_paths: resolver.into_used_paths(),
            context,
            script,
            colors,
            missing,
            warnings: self.warnings,
            ids,
        })
    }
}

fn next_id(counters: &mut BTreeMap<&'static str, usize>, kind: &'static str) -> ElementId {
    let n = counters.entry(kind).or_insert(0);
    let id = ElementId::new(kind, *n);
    *n += 1;
    id
}

/// Explicit axes win; otherwise the first two numeric columns, skipping the
/// identity column.
fn default_axes(table: &Table, config: &BundleConfig) -> Result<(String, String)> {
    let numeric: Vec<String> = table
        .numeric_columns()
        .into_iter()
        .filter(|name| !(config.add_id_column && name == ID_COLUMN))
        .collect();

    let x = match &config.x_axis {
        Some(x) => x.clone(),
        None => numeric.first().cloned().ok_or(BuildError::NotEnoughNumericColumns {
            needed: 2,
            found: numeric.len(),
        })?,
    };
    let y = match &config.y_axis {
        Some(y) => y.clone(),
        None => numeric
            .iter()
            .find(|name| **name != x)
            .cloned()
            .ok_or(BuildError::NotEnoughNumericColumns {
                needed: 2,
                found: numeric.len(),
            })?,
    };

    table.require_numeric(&x)?;
    table.require_numeric(&y)?;
    Ok((x, y))
}

/// Requested dropdown entries that are numeric columns (others are dropped
/// with a warning), or every numeric column. The active axes are always
/// offered.
fn dropdown_candidates(
    table: &Table,
    requested: Option<&[String]>,
    active: [&String; 2],
    warnings: &mut Warnings,
) -> Vec<String> {
    let mut candidates: Vec<String> = match requested {
        None => table.numeric_columns(),
        Some(names) => {
            let mut kept = Vec::new();
            for name in names {
                match table.column(name) {
                    None => warnings.push(Warning::UnknownDropdownOption(name.clone())),
                    Some(c) if !c.is_numeric() => {
                        warnings.push(Warning::NonNumericDropdownOption(name.clone()))
                    }
                    Some(_) if kept.contains(name) => {}
                    Some(_) => kept.push(name.clone()),
                }
            }
            kept
        }
    };
    for axis in active {
        if !candidates.contains(axis) {
            candidates.push(axis.clone());
        }
    }
    candidates
}

/// Ids of everything registered, for building custom layouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetIds {
    pub scatter: ElementId,
    pub axes: ElementId,
    /// Image and video panels, in registration order
    pub media: Vec<ElementId>,
    pub text: Vec<ElementId>,
    /// All panels, in registration order
    pub panels: Vec<ElementId>,
    pub slider: Option<ElementId>,
    pub legend: Option<ElementId>,
    pub video_toggle: Option<ElementId>,
}

/// A wired dashboard, ready to inspect or write
pub struct Dashboard {
    config: BundleConfig,
    context: SyncContext,
    script: ClientScript,
    colors: Option<ColorMapping>,
    missing: BTreeMap<String, Vec<bool>>,
    warnings: Warnings,
    used_paths: BTreeSet<PathBuf>,
    copied: usize,
    ids: WidgetIds,
}

impl Dashboard {
    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    pub fn script(&self) -> &ClientScript {
        &self.script
    }

    /// A fresh page lifetime, starting from the initial selection
    pub fn session(&self) -> Session<'_> {
        self.context.session()
    }

    pub fn ids(&self) -> &WidgetIds {
        &self.ids
    }

    pub fn color_mapping(&self) -> Option<&ColorMapping> {
        self.colors.as_ref()
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn used_paths(&self) -> &BTreeSet<PathBuf> {
        &self.used_paths
    }

    /// Scatter plot with its axis selectors underneath
    pub fn scatter_block(&self) -> Layout {
        Layout::column([Layout::widget(&self.ids.scatter), Layout::widget(&self.ids.axes)])
    }

    /// Controls, scatter block and text panels on the left; media panels on
    /// the right.
    pub fn default_layout(&self) -> Layout {
        let ids = &self.ids;
        let buttons: Vec<Layout> = [&ids.legend, &ids.video_toggle]
            .into_iter()
            .flatten()
            .map(Layout::widget)
            .collect();

        let mut left = Vec::new();
        if !buttons.is_empty() {
            left.push(Layout::row(buttons));
        }
        if let Some(slider) = &ids.slider {
            left.push(Layout::widget(slider));
        }
        left.push(self.scatter_block());
        left.extend(ids.text.iter().map(Layout::widget));

        let right: Vec<Layout> = ids.media.iter().map(Layout::widget).collect();
        if right.is_empty() {
            Layout::row([Layout::column(left)])
        } else {
            Layout::row([Layout::column(left), Layout::column(right)])
        }
    }

    fn document<'a>(&'a self, body: &'a str) -> Document<'a> {
        Document {
            title: &self.config.title,
            context: &self.context,
            script: &self.script,
            missing: &self.missing,
            body,
            generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn body(&self, layout: &Layout) -> Result<String> {
        layout.validate(&self.context)?;
        layout.render(&self.context, &self.context.initial_page())
    }

    /// The page as a string, `layout` defaulting to [`Dashboard::default_layout`]
    pub fn render(&self, layout: Option<&Layout>) -> Result<String> {
        let fallback;
        let layout = match layout {
            Some(layout) => layout,
            None => {
                fallback = self.default_layout();
                &fallback
            }
        };
        let body = self.body(layout)?;
        let html = self.config.output_dir().join(self.config.file_name());
        report::render(&self.document(&body)).map_err(|e| BuildError::io(html, e))
    }

    /// Write the document and the unzip reminder into the bundle
    pub fn write(self, layout: Option<Layout>) -> Result<BundleReport> {
        let layout = layout.unwrap_or_else(|| self.default_layout());
        let body = self.body(&layout)?;

        let output_dir = self.config.output_dir();
        let html = output_dir.join(self.config.file_name());
        report::generate(&html, &self.document(&body)).map_err(|e| BuildError::io(&html, e))?;
        write_marker(&output_dir)?;

        tracing::info!(
            html = %html.display(),
            copied = self.copied,
            warnings = self.warnings.len(),
            "bundle written"
        );

        Ok(BundleReport {
            html,
            output_dir,
            copied: self.copied,
            used_paths: self.used_paths,
            warnings: self.warnings.into_vec(),
        })
    }
}
