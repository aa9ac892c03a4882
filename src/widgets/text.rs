//! Text detail panel
//!
//! One `"<column>: <value>"` line per shown column for the current row. The
//! first line is assigned, later lines are appended with a `<br>` separator.
//! Float columns use the configured precision; everything else is rendered
//! with its default string form.

use super::{legend_overlay, Binding, ElementId, SyncView, WidgetKind};
use crate::report::escape;
use crate::sync::{PageView, TriggerKind};
use crate::table::{Column, ColumnKind, Table};
use crate::wiring::Fragment;

#[derive(Debug, Clone)]
pub struct TextPanel {
    id: ElementId,
    pub width: u32,
    pub height: u32,
    /// Allow-list; `None` shows every non-path column
    pub include: Option<Vec<String>>,
    pub ignore: Vec<String>,
    pub legend_text: Option<String>,
}

impl TextPanel {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            width: 500,
            height: 300,
            include: None,
            ignore: Vec::new(),
            legend_text: None,
        }
    }

    /// Columns shown, in table order
    pub fn shown_columns<'t>(&self, table: &'t Table) -> Vec<&'t Column> {
        table
            .columns()
            .iter()
            .filter(|c| c.kind != ColumnKind::Path)
            .filter(|c| match &self.include {
                Some(names) => names.iter().any(|n| *n == c.name),
                None => true,
            })
            .filter(|c| !self.ignore.iter().any(|n| *n == c.name))
            .collect()
    }

    /// Precision applied to a column, `None` for non-float kinds
    fn precision(column: &Column, view: &SyncView) -> Option<usize> {
        (column.kind == ColumnKind::Float).then_some(view.plan.float_precision)
    }

    /// `(column, rendered value)` for the current row
    fn cells<'t>(&self, view: &SyncView<'t>) -> Vec<(&'t str, String)> {
        let index = view.selection.current_index();
        self.shown_columns(view.table)
            .into_iter()
            .map(|c| {
                let value = c
                    .values
                    .get(index)
                    .map(|v| v.display(Self::precision(c, view)))
                    .unwrap_or_default();
                (c.name.as_str(), value)
            })
            .collect()
    }

    /// Plain lines for the current row
    pub fn lines(&self, view: &SyncView) -> Vec<String> {
        self.cells(view)
            .into_iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect()
    }

    fn rendered(&self, view: &SyncView) -> String {
        self.cells(view)
            .into_iter()
            .map(|(name, value)| format!("<b>{}</b>: {}", escape::html(name), escape::html(&value)))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

impl Binding for TextPanel {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::Text
    }

    fn fragment(&self, trigger: TriggerKind, view: &SyncView) -> Option<Fragment> {
        if !trigger.carries_index() {
            return None;
        }
        let target = format!("document.getElementById({}).innerHTML", escape::js_string(self.id.as_str()));
        let columns = self.shown_columns(view.table);
        if columns.is_empty() {
            return Some(Fragment::new(&self.id, format!("{} = \"\";", target)));
        }

        let lines: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let name = escape::js_string(&c.name);
                let precision = Self::precision(c, view)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "null".to_string());
                let line = format!("msLine({name}, source[{name}][index], {precision})");
                if i == 0 {
                    format!("{} = {};", target, line)
                } else {
                    format!("{} += \"<br>\" + {};", target, line)
                }
            })
            .collect();
        Some(Fragment::new(&self.id, lines.join("\n")))
    }

    fn apply(&self, trigger: TriggerKind, view: &SyncView, page: &mut PageView) {
        if trigger.carries_index() {
            page.text.insert(self.id.clone(), self.lines(view));
        }
    }

    fn markup(&self, view: &SyncView, _page: &PageView) -> String {
        format!(
            r#"<div class="ms-panel ms-text" style="width:{w}px;min-height:{h}px"><div id="{id}" class="ms-text-body">{body}</div>{legend}</div>"#,
            w = self.width,
            h = self.height,
            id = self.id,
            body = self.rendered(view),
            legend = legend_overlay(view, self.legend_text.as_deref().unwrap_or("")),
        )
    }
}
