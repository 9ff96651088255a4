//! Heading anchors and table of contents

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::html::html_escape;

/// One heading in the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Hands out unique anchor ids for headings within one document
#[derive(Debug, Default)]
pub(crate) struct AnchorSet {
    used: HashMap<String, usize>,
}

impl AnchorSet {
    pub(crate) fn anchor_for(&mut self, text: &str) -> String {
        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }

        let count = self.used.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, *count - 1)
        }
    }
}

/// Render a nested `<ol class="toc">` list
pub fn toc_html(entries: &[TocEntry]) -> String {
    let mut html = r#"<ol class="toc">"#.to_string();
    let base_level = entries.iter().map(|e| e.level).min().unwrap_or(1);
    let mut current_level = base_level;

    for entry in entries {
        while current_level < entry.level {
            html.push_str("<ol>");
            current_level += 1;
        }
        while current_level > entry.level {
            html.push_str("</ol>");
            current_level -= 1;
        }

        html.push_str(&format!(
            "<li class=\"toc-item toc-level-{}\"><a class=\"toc-link\" href=\"#{}\"><span class=\"toc-text\">{}</span></a></li>",
            entry.level,
            entry.anchor,
            html_escape(&entry.text)
        ));
    }

    while current_level > base_level {
        html.push_str("</ol>");
        current_level -= 1;
    }

    html.push_str("</ol>");
    html
}
