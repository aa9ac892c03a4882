//! Image and video panels
//!
//! A panel shows the file referenced by its path column for the current row.
//! Reloads are skipped when the row didn't change (`data-index` on the
//! element, `MediaView::shown_index` here), which keeps videos from
//! restarting when the same point is hovered twice.
//!
//! Files that were missing at build time are never requested; the panel shows
//! [`PLACEHOLDER`] instead. The runtime falls back to the same image on a load
//! error.

use super::{legend_overlay, Binding, ElementId, SyncView, WidgetKind};
use crate::report::escape;
use crate::sync::{MediaView, PageView, TriggerKind};
use crate::wiring::Fragment;

/// Inline SVG shown in place of missing media
pub const PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='300' height='200' viewBox='0 0 300 200'%3E%3Crect width='300' height='200' fill='%23eeeeee'/%3E%3Ctext x='150' y='105' font-family='sans-serif' font-size='16' text-anchor='middle' fill='%23888888'%3Emissing media%3C/text%3E%3C/svg%3E";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaPanel {
    id: ElementId,
    kind: MediaKind,
    column: String,
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    /// HTML shown by the legend toggle
    pub legend_text: Option<String>,
    /// Videos only
    pub autoplay: bool,
    /// Per row: file was missing when the bundle was built
    pub missing: Vec<bool>,
}

impl MediaPanel {
    pub fn new(id: ElementId, kind: MediaKind, column: &str) -> Self {
        Self {
            id,
            kind,
            column: column.to_string(),
            width: 300,
            height: 300,
            title: None,
            legend_text: None,
            autoplay: true,
            missing: Vec::new(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    fn load(&self, view: &SyncView, page: &mut PageView) {
        let index = view.selection.current_index();
        let value = view.table.value(index, &self.column);
        let src = value.map(|v| v.display(None)).unwrap_or_default();
        let missing = src.is_empty() || self.missing.get(index).copied().unwrap_or(false);

        match page.media.get_mut(&self.id) {
            Some(shown) if shown.shown_index == index => {}
            Some(shown) => {
                shown.src = src;
                shown.shown_index = index;
                shown.missing = missing;
                shown.loads += 1;
            }
            None => {
                page.media.insert(
                    self.id.clone(),
                    MediaView {
                        src,
                        shown_index: index,
                        loads: 1,
                        missing,
                        playing: self.kind == MediaKind::Video && self.autoplay,
                    },
                );
            }
        }
    }

    fn element(&self, shown: Option<&MediaView>) -> String {
        let (src, index, missing, playing) = match shown {
            Some(m) => (m.src.as_str(), m.shown_index, m.missing, m.playing),
            None => ("", 0, true, false),
        };
        let src = if missing { PLACEHOLDER.to_string() } else { escape::html(src) };

        match self.kind {
            MediaKind::Image => format!(
                r#"<img id="{id}" class="ms-media-element" src="{src}" data-index="{index}" width="{w}" height="{h}" alt="{alt}" onerror="msMediaError(this)">"#,
                id = self.id,
                src = src,
                index = index,
                w = self.width,
                h = self.height,
                alt = escape::html(&self.column),
            ),
            MediaKind::Video => {
                // muted so browsers allow autoplay
                let source = if missing {
                    format!(r#"poster="{}""#, PLACEHOLDER)
                } else {
                    format!(r#"src="{}""#, src)
                };
                format!(
                    r#"<video id="{id}" class="ms-media-element" {source} data-index="{index}" width="{w}" height="{h}" data-playing="{playing}" muted loop playsinline{autoplay} onerror="msMediaError(this)"></video>"#,
                    id = self.id,
                    source = source,
                    index = index,
                    w = self.width,
                    h = self.height,
                    playing = playing,
                    autoplay = if playing { " autoplay" } else { "" },
                )
            }
        }
    }
}

impl Binding for MediaPanel {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        match self.kind {
            MediaKind::Image => WidgetKind::Image,
            MediaKind::Video => WidgetKind::Video,
        }
    }

    fn source_column(&self) -> Option<&str> {
        Some(&self.column)
    }

    fn fragment(&self, trigger: TriggerKind, _view: &SyncView) -> Option<Fragment> {
        let id = escape::js_string(self.id.as_str());
        let code = match trigger {
            TriggerKind::Hover | TriggerKind::Slider => format!(
                "msSetMedia({}, {}, index);",
                id,
                escape::js_string(&self.column)
            ),
            TriggerKind::VideoToggle if self.kind == MediaKind::Video => {
                format!("msPlayVideo({}, ui.videosPlaying);", id)
            }
            _ => return None,
        };
        Some(Fragment::new(&self.id, code))
    }

    fn apply(&self, trigger: TriggerKind, view: &SyncView, page: &mut PageView) {
        match trigger {
            TriggerKind::Hover | TriggerKind::Slider => self.load(view, page),
            TriggerKind::VideoToggle if self.kind == MediaKind::Video => {
                let playing = page.videos_playing;
                if let Some(shown) = page.media.get_mut(&self.id) {
                    shown.playing = playing;
                }
            }
            _ => {}
        }
    }

    fn initialize(&self, view: &SyncView, page: &mut PageView) {
        self.load(view, page);
    }

    fn markup(&self, view: &SyncView, page: &PageView) -> String {
        let title = self
            .title
            .as_deref()
            .map(|t| format!(r#"<div class="ms-title">{}</div>"#, escape::html(t)))
            .unwrap_or_default();
        let legend = legend_overlay(view, self.legend_text.as_deref().unwrap_or(""));
        format!(
            r#"<div class="ms-panel ms-media ms-{kind}" style="width:{w}px">{title}{element}{legend}</div>"#,
            kind = self.kind.as_str(),
            w = self.width,
            title = title,
            element = self.element(page.media(&self.id)),
            legend = legend,
        )
    }
}
