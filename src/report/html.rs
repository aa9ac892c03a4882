//! Self-contained HTML document
//!
//! Layout of the written file:
//!
//! - `<head>`: styles, the page runtime (`runtime.js`) and `MS_PLACEHOLDER`,
//!   so inline `onerror` handlers work while the body is still loading
//! - `<body>`: the pre-rendered widget markup
//! - closing `<script>`: the data (`source`, `state`, `ui`, `ROW_COUNT`,
//!   `MS_MISSING`), the generated handlers and the per-widget setup code

use crate::report::escape;
use crate::sync::SyncContext;
use crate::table::Table;
use crate::widgets::media::PLACEHOLDER;
use crate::widgets::controls::SHOW_LEGENDS_CLASS;
use crate::wiring::ClientScript;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::{self, Write};

const RUNTIME: &str = include_str!("runtime.js");

/// Everything the writer needs, borrowed from a wired dashboard
pub struct Document<'a> {
    pub title: &'a str,
    pub context: &'a SyncContext,
    pub script: &'a ClientScript,
    /// Path column → per-row "file missing at build time"
    pub missing: &'a BTreeMap<String, Vec<bool>>,
    /// Rendered widget layout
    pub body: &'a str,
    pub generated: String,
}

/// Every column as `name → [values]`
struct ColumnSource<'a>(&'a Table);

impl Serialize for ColumnSource<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.columns().len()))?;
        for column in self.0.columns() {
            map.serialize_entry(&column.name, &column.values)?;
        }
        map.end()
    }
}

pub fn write<W: Write>(writer: &mut W, doc: &Document) -> io::Result<()> {
    let ctx = doc.context;
    let source = escape::script_json(&ColumnSource(ctx.table()))?;
    let state = escape::script_json(ctx.initial_selection())?;
    let ui = escape::script_json(&json!({
        "legendsVisible": false,
        "videosPlaying": ctx.plan().autoplay,
    }))?;
    let missing = escape::script_json(doc.missing)?;

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="mediascatter {version}">
    <title>{title}</title>
    <style>
        :root {{
            --bg: #ffffff;
            --card: #f6f8fa;
            --border: #d0d7de;
            --text: #1f2328;
            --dim: #656d76;
            --accent: #0969da;
        }}
        * {{ box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            margin: 0;
            padding: 1rem;
            line-height: 1.4;
        }}
        h1 {{ font-size: 1.4rem; margin: 0 0 1rem 0; }}

        /* Layout */
        .ms-row {{ display: flex; flex-direction: row; flex-wrap: wrap; gap: 1rem; align-items: flex-start; }}
        .ms-column {{ display: flex; flex-direction: column; gap: 1rem; }}
        .ms-panel {{
            position: relative;
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 0.5rem;
        }}
        .ms-title {{ font-weight: 600; margin-bottom: 0.25rem; }}

        /* Plot */
        .ms-plot text {{ font-size: 11px; fill: var(--dim); }}
        .ms-plot .ms-axis-label {{ font-size: 13px; fill: var(--text); }}
        .ms-plot .ms-axis line {{ stroke: var(--dim); }}
        .ms-mark {{ cursor: pointer; }}
        .ms-category-legend text {{ font-size: 12px; fill: var(--text); }}

        /* Controls */
        .ms-axes {{ display: flex; gap: 1rem; }}
        .ms-slider input {{ width: 100%; }}
        .ms-button {{
            border: 1px solid var(--border);
            background: var(--bg);
            border-radius: 6px;
            padding: 0.3rem 0.8rem;
            cursor: pointer;
        }}
        .ms-button:hover {{ border-color: var(--accent); color: var(--accent); }}

        /* Media and text */
        .ms-media-element {{ display: block; max-width: 100%; object-fit: contain; background: #000; }}
        .ms-text-body {{ font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 0.85rem; overflow: auto; }}

        /* Usage hints, shown by the legend toggle */
        .ms-legend {{
            display: none;
            margin-top: 0.4rem;
            padding: 0.4rem 0.6rem;
            border-left: 3px solid var(--accent);
            background: rgba(9, 105, 218, 0.08);
            font-size: 0.85rem;
        }}
        body.{show_legends} .ms-legend {{ display: block; }}

        footer {{ margin-top: 1.5rem; color: var(--dim); font-size: 0.75rem; }}
    </style>
    <script>
{runtime}
const MS_PLACEHOLDER = {placeholder};
    </script>
</head>
<body>
    <h1>{title}</h1>
{body}
    <footer>Generated by mediascatter {version} on {generated}</footer>
    <script>
const source = {source};
const state = {state};
const ui = {ui};
const ROW_COUNT = {row_count};
const MS_MISSING = {missing};

{script}    </script>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
        title = escape::html(doc.title),
        show_legends = SHOW_LEGENDS_CLASS,
        runtime = RUNTIME,
        placeholder = escape::js_string(PLACEHOLDER),
        body = doc.body,
        generated = escape::html(&doc.generated),
        source = source,
        state = state,
        ui = ui,
        row_count = ctx.table().row_count(),
        missing = missing,
        script = doc.script.to_js(),
    )?;

    Ok(())
}
