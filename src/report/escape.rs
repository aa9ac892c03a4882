//! Escaping for HTML text and inline script literals

/// Escape text for HTML content and attribute values.
///
/// Must stay in sync with `msEscape` in the client runtime.
pub fn html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JavaScript string literal, safe inside a `<script>` element
pub fn js_string(text: &str) -> String {
    script_safe(serde_json::Value::String(text.to_string()).to_string())
}

/// JSON for embedding in a `<script>` element
pub fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value).map(script_safe)
}

fn script_safe(json: String) -> String {
    // "</" can only occur inside string literals, where "<\/" is equivalent
    json.replace("</", "<\\/")
}
