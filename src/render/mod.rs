//! Document rendering - turns parsed blocks into HTML
//!
//! Rendering is a pure function of the block sequence and the options:
//! the same blocks always produce byte-identical output. Each block maps
//! to exactly one HTML element, in source order.

mod html;
mod toc;

use serde::{Deserialize, Serialize};

use crate::markdown::{Alignment, Block, InlineRun, ListItem, TableCell};

pub use html::{escape_href, html_escape, is_external, link_to};
pub use toc::{toc_html, TocEntry};
use toc::AnchorSet;

/// Rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit `id` attributes on headings
    pub heading_ids: bool,
    /// Open `http(s)` links in a new tab
    pub external_links_new_tab: bool,
    /// Deepest heading level listed in the table of contents
    pub toc_max_depth: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_ids: true,
            external_links_new_tab: true,
            toc_max_depth: 3,
        }
    }
}

/// Presentation-ready output for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// First level-1 heading, else the first heading
    pub title: Option<String>,
    /// Rendered HTML body
    pub html: String,
    /// Headings down to `toc_max_depth`
    pub toc: Vec<TocEntry>,
    /// Code fence languages in order of first appearance
    pub languages: Vec<String>,
}

impl RenderedDocument {
    /// Table of contents as a nested HTML list
    pub fn toc_html(&self) -> String {
        toc_html(&self.toc)
    }
}

/// Renders block sequences to HTML
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    options: RenderOptions,
}

/// Per-document state collected while walking the blocks
#[derive(Default)]
struct RenderState {
    anchors: AnchorSet,
    toc: Vec<TocEntry>,
    languages: Vec<String>,
    first_heading: Option<String>,
    first_h1: Option<String>,
}

impl DocumentRenderer {
    /// Create a renderer with the given options
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render blocks to a document
    pub fn render(&self, blocks: &[Block]) -> RenderedDocument {
        let mut state = RenderState::default();
        let mut out = String::new();
        self.write_blocks(&mut out, blocks, &mut state);

        RenderedDocument {
            title: state.first_h1.or(state.first_heading),
            html: out,
            toc: state.toc,
            languages: state.languages,
        }
    }

    fn write_blocks(&self, out: &mut String, blocks: &[Block], state: &mut RenderState) {
        for block in blocks {
            self.write_block(out, block, state);
            out.push('\n');
        }
    }

    fn write_block(&self, out: &mut String, block: &Block, state: &mut RenderState) {
        match block {
            Block::Heading { level, text } => self.write_heading(out, *level, text, state),
            Block::Paragraph(runs) => {
                out.push_str("<p>");
                self.write_inlines(out, runs);
                out.push_str("</p>");
            }
            Block::CodeFence { language, body } => {
                match language {
                    Some(lang) => {
                        if !state.languages.contains(lang) {
                            state.languages.push(lang.clone());
                        }
                        out.push_str(&format!(
                            r#"<pre><code class="language-{}">"#,
                            html_escape(lang)
                        ));
                    }
                    None => out.push_str("<pre><code>"),
                }
                out.push_str(&html_escape(body));
                if !body.is_empty() {
                    out.push('\n');
                }
                out.push_str("</code></pre>");
            }
            Block::Blockquote(children) => {
                out.push_str("<blockquote>\n");
                self.write_blocks(out, children, state);
                out.push_str("</blockquote>");
            }
            Block::List {
                ordered,
                start,
                items,
            } => self.write_list(out, *ordered, *start, items, state),
            Block::Table {
                alignments,
                head,
                rows,
            } => self.write_table(out, alignments, head, rows),
            Block::Rule => out.push_str("<hr />"),
        }
    }

    fn write_heading(&self, out: &mut String, level: u8, text: &str, state: &mut RenderState) {
        if state.first_heading.is_none() {
            state.first_heading = Some(text.to_string());
        }
        if level == 1 && state.first_h1.is_none() {
            state.first_h1 = Some(text.to_string());
        }

        let anchor = state.anchors.anchor_for(text);
        if level <= self.options.toc_max_depth {
            state.toc.push(TocEntry {
                level,
                text: text.to_string(),
                anchor: anchor.clone(),
            });
        }

        if self.options.heading_ids {
            out.push_str(&format!(
                r#"<h{} id="{}">{}</h{}>"#,
                level,
                anchor,
                html_escape(text),
                level
            ));
        } else {
            out.push_str(&format!("<h{}>{}</h{}>", level, html_escape(text), level));
        }
    }

    fn write_list(
        &self,
        out: &mut String,
        ordered: bool,
        start: u64,
        items: &[ListItem],
        state: &mut RenderState,
    ) {
        let tag = if ordered { "ol" } else { "ul" };
        if ordered && start != 1 {
            out.push_str(&format!("<ol start=\"{}\">\n", start));
        } else {
            out.push_str(&format!("<{}>\n", tag));
        }

        for item in items {
            out.push_str("<li>");
            self.write_inlines(out, &item.content);
            if !item.children.is_empty() {
                out.push('\n');
                self.write_blocks(out, &item.children, state);
            }
            out.push_str("</li>\n");
        }

        out.push_str(&format!("</{}>", tag));
    }

    fn write_table(
        &self,
        out: &mut String,
        alignments: &[Alignment],
        head: &[TableCell],
        rows: &[Vec<TableCell>],
    ) {
        out.push_str("<table>\n<thead>\n");
        self.write_row(out, "th", alignments, head);
        out.push_str("</thead>\n");

        if !rows.is_empty() {
            out.push_str("<tbody>\n");
            for row in rows {
                self.write_row(out, "td", alignments, row);
            }
            out.push_str("</tbody>\n");
        }
        out.push_str("</table>");
    }

    fn write_row(&self, out: &mut String, tag: &str, alignments: &[Alignment], cells: &[TableCell]) {
        out.push_str("<tr>\n");
        for (i, cell) in cells.iter().enumerate() {
            let style = match alignments.get(i).copied().unwrap_or(Alignment::None) {
                Alignment::None => "",
                Alignment::Left => r#" style="text-align: left""#,
                Alignment::Center => r#" style="text-align: center""#,
                Alignment::Right => r#" style="text-align: right""#,
            };
            out.push_str(&format!("<{}{}>", tag, style));
            self.write_inlines(out, cell);
            out.push_str(&format!("</{}>\n", tag));
        }
        out.push_str("</tr>\n");
    }

    fn write_inlines(&self, out: &mut String, runs: &[InlineRun]) {
        for run in runs {
            match run {
                InlineRun::Text(text) => out.push_str(&html_escape(text)),
                InlineRun::Emphasis(children) => {
                    out.push_str("<em>");
                    self.write_inlines(out, children);
                    out.push_str("</em>");
                }
                InlineRun::Strong(children) => {
                    out.push_str("<strong>");
                    self.write_inlines(out, children);
                    out.push_str("</strong>");
                }
                InlineRun::CodeSpan(code) => {
                    out.push_str(&format!("<code>{}</code>", html_escape(code)));
                }
                InlineRun::Link { text, href } => {
                    let new_tab = self.options.external_links_new_tab && is_external(href);
                    out.push_str(&link_to(href, &html_escape(text), new_tab));
                }
            }
        }
    }
}
