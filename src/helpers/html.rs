//! HTML helper functions and presentational components

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters kept as-is in a slug path segment
const SLUG: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a post slug for use as one path segment
pub fn encode_slug(slug: &str) -> String {
    utf8_percent_encode(slug, SLUG).to_string()
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// An icon followed by a line of text
///
/// # Examples
/// ```ignore
/// text_with_icon("/images/user.svg", "Joseph")
/// // -> <div class="text-with-icon"><img ...><span>Joseph</span></div>
/// ```
pub fn text_with_icon(icon: &str, text: &str) -> String {
    format!(
        r#"<div class="text-with-icon"><img src="{}" alt="{}"><span>{}</span></div>"#,
        html_escape(icon),
        html_escape(text),
        html_escape(text)
    )
}

/// Link that leaves preview mode; empty when preview is off
pub fn exit_preview_button(enabled: bool, label: &str) -> String {
    if !enabled {
        return String::new();
    }
    format!(
        r#"<aside class="exit-preview"><a href="/api/exit-preview">{}</a></aside>"#,
        html_escape(label)
    )
}

/// A document that immediately sends the browser to `url`
pub fn redirect_document(url: &str) -> String {
    // serde_json gives a quoted JS string literal; `<` is escaped so the
    // literal cannot close the script element.
    let js_url = serde_json::to_string(url)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace('<', "\\u003c");
    format!(
        r#"<!DOCTYPE html><html><head><meta http-equiv="Refresh" content="0; url={}" />
    <script>window.location.href = {}</script>
    </head></html>"#,
        html_escape(url),
        js_url
    )
}
