//! Presentational toggle buttons
//!
//! Neither button touches the selection. The legend toggle shows or hides
//! every `.ms-legend` overlay through a class on `<body>`; the video toggle
//! flips `ui.videosPlaying`, which the video panels follow in their own
//! fragments.

use super::{Binding, ElementId, SyncView, WidgetKind};
use crate::report::escape;
use crate::sync::{PageView, TriggerKind};
use crate::wiring::{handler_name, Fragment};

/// Body class that makes legend overlays visible
pub const SHOW_LEGENDS_CLASS: &str = "ms-show-legends";

fn button(id: &ElementId, label: &str) -> String {
    format!(
        r#"<button type="button" id="{}" class="ms-button">{}</button>"#,
        id,
        escape::html(label)
    )
}

fn click_listener(id: &ElementId, kind: TriggerKind) -> Fragment {
    Fragment::new(
        id,
        format!(
            "document.getElementById({}).addEventListener(\"click\", function () {{\n    {}();\n}});",
            escape::js_string(id.as_str()),
            handler_name(kind)
        ),
    )
}

fn relabel(id: &ElementId, flag: &str, on: &str, off: &str) -> String {
    format!(
        "document.getElementById({}).textContent = {} ? {} : {};",
        escape::js_string(id.as_str()),
        flag,
        escape::js_string(on),
        escape::js_string(off)
    )
}

#[derive(Debug, Clone)]
pub struct LegendToggle {
    id: ElementId,
}

impl LegendToggle {
    pub fn new(id: ElementId) -> Self {
        Self { id }
    }

    fn label(visible: bool) -> &'static str {
        if visible {
            "Hide legends"
        } else {
            "Show legends"
        }
    }
}

impl Binding for LegendToggle {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::LegendToggle
    }

    fn fragment(&self, trigger: TriggerKind, _view: &SyncView) -> Option<Fragment> {
        if trigger != TriggerKind::LegendToggle {
            return None;
        }
        let code = format!(
            "document.body.classList.toggle({}, ui.legendsVisible);\n{}",
            escape::js_string(SHOW_LEGENDS_CLASS),
            relabel(&self.id, "ui.legendsVisible", Self::label(true), Self::label(false))
        );
        Some(Fragment::new(&self.id, code))
    }

    // the flag itself is flipped by the trigger prologue
    fn apply(&self, _trigger: TriggerKind, _view: &SyncView, _page: &mut PageView) {}

    fn setup(&self, _view: &SyncView) -> Option<Fragment> {
        Some(click_listener(&self.id, TriggerKind::LegendToggle))
    }

    fn markup(&self, _view: &SyncView, page: &PageView) -> String {
        button(&self.id, Self::label(page.legends_visible))
    }
}

#[derive(Debug, Clone)]
pub struct VideoToggle {
    id: ElementId,
}

impl VideoToggle {
    pub fn new(id: ElementId) -> Self {
        Self { id }
    }

    fn label(playing: bool) -> &'static str {
        if playing {
            "Pause videos"
        } else {
            "Play videos"
        }
    }
}

impl Binding for VideoToggle {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::VideoToggle
    }

    fn fragment(&self, trigger: TriggerKind, _view: &SyncView) -> Option<Fragment> {
        (trigger == TriggerKind::VideoToggle).then(|| {
            Fragment::new(
                &self.id,
                relabel(&self.id, "ui.videosPlaying", Self::label(true), Self::label(false)),
            )
        })
    }

    fn apply(&self, _trigger: TriggerKind, _view: &SyncView, _page: &mut PageView) {}

    fn setup(&self, _view: &SyncView) -> Option<Fragment> {
        Some(click_listener(&self.id, TriggerKind::VideoToggle))
    }

    fn markup(&self, _view: &SyncView, page: &PageView) -> String {
        button(&self.id, Self::label(page.videos_playing))
    }
}
