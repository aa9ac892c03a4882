//! Page arrangement of registered widgets

use crate::error::{BuildError, Result};
use crate::sync::{PageView, SyncContext};
use crate::widgets::ElementId;
use std::collections::BTreeSet;

/// Nested rows and columns of widgets, referenced by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Row(Vec<Layout>),
    Column(Vec<Layout>),
    Widget(ElementId),
}

impl Layout {
    pub fn row<I: IntoIterator<Item = Layout>>(items: I) -> Self {
        Layout::Row(items.into_iter().collect())
    }

    pub fn column<I: IntoIterator<Item = Layout>>(items: I) -> Self {
        Layout::Column(items.into_iter().collect())
    }

    pub fn widget(id: &ElementId) -> Self {
        Layout::Widget(id.clone())
    }

    /// Widget ids in document order
    pub fn widgets(&self) -> Vec<&ElementId> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a ElementId>) {
        match self {
            Layout::Row(items) | Layout::Column(items) => {
                for item in items {
                    item.collect(out);
                }
            }
            Layout::Widget(id) => out.push(id),
        }
    }

    /// Every widget of `ctx` placed exactly once, and nothing else. The
    /// generated handlers reach every registered widget by id.
    pub fn validate(&self, ctx: &SyncContext) -> Result<()> {
        let mut placed = BTreeSet::new();
        for id in self.widgets() {
            if ctx.binding(id.as_str()).is_none() {
                return Err(BuildError::UnknownWidget(id.to_string()));
            }
            if !placed.insert(id) {
                return Err(BuildError::DuplicateWidget(id.to_string()));
            }
        }
        match ctx.bindings().find(|b| !placed.contains(b.id())) {
            Some(missing) => Err(BuildError::MissingWidget(missing.id().to_string())),
            None => Ok(()),
        }
    }

    /// Markup for the initial page
    pub fn render(&self, ctx: &SyncContext, page: &PageView) -> Result<String> {
        let view = ctx.view(ctx.initial_selection());
        match self {
            Layout::Row(items) | Layout::Column(items) => {
                let class = if matches!(self, Layout::Row(_)) { "ms-row" } else { "ms-column" };
                let mut html = format!(r#"<div class="{}">"#, class);
                for item in items {
                    html.push_str(&item.render(ctx, page)?);
                }
                html.push_str("</div>");
                Ok(html)
            }
            Layout::Widget(id) => ctx
                .binding(id.as_str())
                .map(|b| b.markup(&view, page))
                .ok_or_else(|| BuildError::UnknownWidget(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widgets_in_document_order() {
        let a = ElementId::new("image", 0);
        let b = ElementId::new("text", 0);
        let c = ElementId::new("image", 1);
        let layout = Layout::row([
            Layout::column([Layout::widget(&a), Layout::widget(&b)]),
            Layout::widget(&c),
        ]);
        assert_eq!(layout.widgets(), vec![&a, &b, &c]);
    }
}
