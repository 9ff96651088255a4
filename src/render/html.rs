//! HTML escaping and link helpers

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters percent-encoded in link destinations. Non-ASCII bytes are
/// always encoded; `%` is left alone so already-encoded URLs survive.
const HREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode and escape a link destination for an `href` attribute
pub fn escape_href(href: &str) -> String {
    let href = href.trim();
    if has_unsafe_scheme(href) {
        return "#".to_string();
    }
    html_escape(&utf8_percent_encode(href, HREF_ENCODE_SET).to_string())
}

/// Whether a link points off-site
pub fn is_external(href: &str) -> bool {
    let href = href.trim_start();
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

fn has_unsafe_scheme(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Generate an anchor tag
pub fn link_to(href: &str, text: &str, new_tab: bool) -> String {
    if new_tab {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape_href(href),
            text
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, escape_href(href), text)
    }
}
