//! Block and inline node types produced by the parser

use serde::Serialize;

/// A top-level structural unit of a parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// ATX heading, level 1-6
    Heading { level: u8, text: String },

    /// Paragraph of inline runs
    Paragraph(Vec<InlineRun>),

    /// Fenced code, body captured verbatim
    CodeFence {
        language: Option<String>,
        body: String,
    },

    /// Quoted blocks, parsed recursively
    Blockquote(Vec<Block>),

    /// Bullet or ordered list
    List {
        ordered: bool,
        start: u64,
        items: Vec<ListItem>,
    },

    /// Pipe table; `head` is the header row
    Table {
        alignments: Vec<Alignment>,
        head: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },

    /// Thematic break
    Rule,
}

/// One list item: leading inline content plus any nested blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub content: Vec<InlineRun>,
    pub children: Vec<Block>,
}

/// Inline runs of a single table cell
pub type TableCell = Vec<InlineRun>;

/// Column alignment taken from the table delimiter row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

/// A span-level unit inside a paragraph, list item or table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineRun {
    Text(String),
    Emphasis(Vec<InlineRun>),
    Strong(Vec<InlineRun>),
    CodeSpan(String),
    Link { text: String, href: String },
}

impl Block {
    /// Short name of the variant, used for logging and order checks
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::CodeFence { .. } => "code_fence",
            Block::Blockquote(_) => "blockquote",
            Block::List { .. } => "list",
            Block::Table { .. } => "table",
            Block::Rule => "rule",
        }
    }

    /// Text content of the block with all markup removed
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { text, .. } => text.clone(),
            Block::Paragraph(runs) => runs_plain_text(runs),
            Block::CodeFence { body, .. } => body.clone(),
            Block::Blockquote(blocks) => blocks_plain_text(blocks),
            Block::List { items, .. } => items
                .iter()
                .map(|item| {
                    let mut text = runs_plain_text(&item.content);
                    if !item.children.is_empty() {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(&blocks_plain_text(&item.children));
                    }
                    text
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table { head, rows, .. } => std::iter::once(head)
                .chain(rows.iter())
                .map(|row| {
                    row.iter()
                        .map(|cell| runs_plain_text(cell))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Rule => String::new(),
        }
    }
}

impl InlineRun {
    /// Text content of the run with markup removed
    pub fn plain_text(&self) -> String {
        match self {
            InlineRun::Text(text) | InlineRun::CodeSpan(text) => text.clone(),
            InlineRun::Emphasis(children) | InlineRun::Strong(children) => {
                runs_plain_text(children)
            }
            InlineRun::Link { text, .. } => text.clone(),
        }
    }
}

/// Concatenate the plain text of a sequence of inline runs
pub fn runs_plain_text(runs: &[InlineRun]) -> String {
    runs.iter().map(InlineRun::plain_text).collect()
}

/// Plain text of a block sequence, one block per line
pub fn blocks_plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::plain_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
