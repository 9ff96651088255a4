//! Lowers pulldown-cmark events into the block tree
//!
//! The builder never recurses: open containers and open inline spans live on
//! explicit stacks. Quotes and lists nested deeper than [`MAX_NESTING`] are
//! flattened into their nearest open ancestor, and emphasis nested deeper
//! than [`MAX_INLINE_NESTING`] is spliced into its parent run, so the tree
//! handed to the renderer stays shallow whatever the input looks like.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::borrow::Cow;

use super::block::{runs_plain_text, Alignment, Block, InlineRun, ListItem, TableCell};
use crate::error::{BlogError, Result};

/// Deepest quote/list nesting kept in the tree
pub const MAX_NESTING: usize = 32;

/// Deepest emphasis/strong/link nesting kept in the tree
pub const MAX_INLINE_NESTING: usize = 32;

fn options() -> Options {
    Options::ENABLE_TABLES
}

/// Parse Markdown text into blocks. Never fails; syntax it cannot make
/// sense of ends up in a paragraph.
pub fn parse(raw: &str) -> Vec<Block> {
    let text = normalize_newlines(raw);

    let mut builder = BlockBuilder::new();
    for event in Parser::new_ext(&text, options()) {
        builder.event(event);
    }
    let blocks = builder.finish();

    tracing::trace!(bytes = text.len(), blocks = blocks.len(), "Parsed markdown");
    blocks
}

/// Parse raw bytes, failing only when they are not UTF-8 text
pub fn parse_bytes(raw: &[u8]) -> Result<Vec<Block>> {
    let text = decode(raw, "<input>")?;
    Ok(parse(text))
}

/// Decode bytes as UTF-8, dropping a leading byte order mark
pub(crate) fn decode<'a>(raw: &'a [u8], source_name: &str) -> Result<&'a str> {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    std::str::from_utf8(raw).map_err(|source| BlogError::Encoding {
        source_name: source_name.to_string(),
        source,
    })
}

/// Text of the first non-empty heading, stopping as soon as it is found
pub fn first_heading(raw: &str) -> Option<String> {
    let text = normalize_newlines(raw);
    let mut heading: Option<String> = None;

    for event in Parser::new_ext(&text, options()) {
        match event {
            Event::Start(Tag::Heading { .. }) => heading = Some(String::new()),
            Event::Text(t) | Event::Code(t) => {
                if let Some(h) = heading.as_mut() {
                    h.push_str(&t);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(h) = heading.take() {
                    let h = h.trim();
                    if !h.is_empty() {
                        return Some(h.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn normalize_newlines(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// An open block container
enum Container {
    Root(Vec<Block>),
    Quote(Vec<Block>),
    List {
        ordered: bool,
        start: u64,
        items: Vec<ListItem>,
    },
    Item(ListItem),
    Table {
        alignments: Vec<Alignment>,
        head: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
        row: Vec<TableCell>,
    },
    /// Nested past the cap; blocks go to the container at this stack index
    Flattened(usize),
}

impl Container {
    /// Quotes and lists are what make the tree deeper
    fn adds_depth(&self) -> bool {
        matches!(self, Container::Quote(_) | Container::List { .. })
    }
}

#[derive(Debug, PartialEq)]
enum FrameKind {
    Paragraph,
    Heading(u8),
    Cell,
    /// Text outside a paragraph: tight list items and HTML blocks
    Implicit,
    Emphasis,
    Strong,
    Link(String),
    Image(String),
    /// Nested past the cap; runs are appended to the parent frame
    Spliced,
}

struct Frame {
    kind: FrameKind,
    runs: Vec<InlineRun>,
}

struct CodeBuffer {
    language: Option<String>,
    body: String,
}

struct BlockBuilder {
    containers: Vec<Container>,
    frames: Vec<Frame>,
    code: Option<CodeBuffer>,
    depth: usize,
    inline_depth: usize,
}

impl BlockBuilder {
    fn new() -> Self {
        Self {
            containers: vec![Container::Root(Vec::new())],
            frames: Vec::new(),
            code: None,
            depth: 0,
            inline_depth: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.body.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => self.push_run(InlineRun::CodeSpan(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            Event::Rule => {
                self.flush_implicit();
                self.push_block(Block::Rule);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.flush_implicit();
                self.open_frame(FrameKind::Paragraph);
            }
            Tag::Heading { level, .. } => {
                self.flush_implicit();
                self.open_frame(FrameKind::Heading(level as u8));
            }
            Tag::CodeBlock(kind) => {
                self.flush_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(String::from),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBuffer {
                    language,
                    body: String::new(),
                });
            }
            Tag::HtmlBlock => self.flush_implicit(),
            Tag::BlockQuote(..) => {
                self.flush_implicit();
                self.open_container(Container::Quote(Vec::new()));
            }
            Tag::List(first) => {
                self.flush_implicit();
                self.open_container(Container::List {
                    ordered: first.is_some(),
                    start: first.unwrap_or(1),
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.flush_implicit();
                self.open_container(Container::Item(ListItem::default()));
            }
            Tag::Table(alignments) => {
                self.flush_implicit();
                self.open_container(Container::Table {
                    alignments: alignments.into_iter().map(Alignment::from).collect(),
                    head: Vec::new(),
                    rows: Vec::new(),
                    row: Vec::new(),
                });
            }
            Tag::TableCell => self.open_frame(FrameKind::Cell),
            Tag::Emphasis => self.open_frame(FrameKind::Emphasis),
            Tag::Strong => self.open_frame(FrameKind::Strong),
            Tag::Link { dest_url, .. } => self.open_frame(FrameKind::Link(dest_url.into_string())),
            Tag::Image { dest_url, .. } => {
                self.open_frame(FrameKind::Image(dest_url.into_string()))
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => self.close_block_frame(),
            TagEnd::CodeBlock => {
                if let Some(CodeBuffer { language, mut body }) = self.code.take() {
                    if body.ends_with('\n') {
                        body.pop();
                    }
                    self.push_block(Block::CodeFence { language, body });
                }
            }
            TagEnd::HtmlBlock => self.flush_implicit(),
            TagEnd::BlockQuote(..) | TagEnd::List(_) | TagEnd::Item | TagEnd::Table => {
                self.flush_implicit();
                self.close_container();
            }
            TagEnd::TableCell => {
                let cell = self.close_frame();
                if let Some(Container::Table { row, .. }) = self.containers.last_mut() {
                    row.push(cell);
                }
            }
            TagEnd::TableHead => {
                if let Some(Container::Table {
                    alignments,
                    head,
                    row,
                    ..
                }) = self.containers.last_mut()
                {
                    *head = pad_row(std::mem::take(row), alignments.len());
                }
            }
            TagEnd::TableRow => {
                if let Some(Container::Table {
                    alignments,
                    rows,
                    row,
                    ..
                }) = self.containers.last_mut()
                {
                    rows.push(pad_row(std::mem::take(row), alignments.len()));
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Link | TagEnd::Image => {
                self.close_inline_frame()
            }
            _ => {}
        }
    }

    fn open_container(&mut self, container: Container) {
        let flatten = match container {
            Container::Table { .. } => false,
            _ => {
                (container.adds_depth() && self.depth >= MAX_NESTING)
                    || matches!(self.containers.last(), Some(Container::Flattened(_)))
            }
        };

        if flatten {
            let target = self.block_target();
            self.containers.push(Container::Flattened(target));
            return;
        }

        if container.adds_depth() {
            self.depth += 1;
        }
        self.containers.push(container);
    }

    fn close_container(&mut self) {
        let Some(container) = self.containers.pop() else {
            return;
        };
        if container.adds_depth() {
            self.depth -= 1;
        }

        match container {
            Container::Root(blocks) => {
                // Unbalanced end event; keep what was built
                self.containers.push(Container::Root(blocks));
            }
            Container::Quote(blocks) => self.push_block(Block::Blockquote(blocks)),
            Container::List {
                ordered,
                start,
                items,
            } => self.push_block(Block::List {
                ordered,
                start,
                items,
            }),
            Container::Item(item) => {
                if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                    items.push(item);
                }
            }
            Container::Table {
                alignments,
                head,
                rows,
                ..
            } => self.push_block(Block::Table {
                alignments,
                head,
                rows,
            }),
            Container::Flattened(_) => {}
        }
    }

    /// Stack index of the container that takes blocks right now
    fn block_target(&self) -> usize {
        match self.containers.last() {
            Some(Container::Flattened(target)) => *target,
            _ => self.containers.len().saturating_sub(1),
        }
    }

    fn push_block(&mut self, block: Block) {
        let target = self.block_target();
        match &mut self.containers[target] {
            Container::Root(blocks) | Container::Quote(blocks) => blocks.push(block),
            Container::Item(item) => match block {
                Block::Paragraph(runs) if item.content.is_empty() && item.children.is_empty() => {
                    item.content = runs;
                }
                block => item.children.push(block),
            },
            Container::List { items, .. } => {
                let mut item = ListItem::default();
                item.children.push(block);
                items.push(item);
            }
            // Tables only ever hold cells
            Container::Table { .. } | Container::Flattened(_) => {}
        }
    }

    fn open_frame(&mut self, kind: FrameKind) {
        let kind = match kind {
            FrameKind::Emphasis | FrameKind::Strong | FrameKind::Link(_) | FrameKind::Image(_) => {
                if self.inline_depth >= MAX_INLINE_NESTING {
                    FrameKind::Spliced
                } else {
                    self.inline_depth += 1;
                    kind
                }
            }
            kind => kind,
        };
        self.frames.push(Frame {
            kind,
            runs: Vec::new(),
        });
    }

    fn close_frame(&mut self) -> Vec<InlineRun> {
        match self.frames.pop() {
            Some(mut frame) => {
                trim_trailing_newlines(&mut frame.runs);
                frame.runs
            }
            None => Vec::new(),
        }
    }

    fn close_block_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let mut runs = frame.runs;
        trim_trailing_newlines(&mut runs);

        match frame.kind {
            FrameKind::Heading(level) => self.push_block(Block::Heading {
                level,
                text: runs_plain_text(&runs).trim().to_string(),
            }),
            _ if runs.is_empty() => {}
            _ => self.push_block(Block::Paragraph(runs)),
        }
    }

    fn close_inline_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let run = match frame.kind {
            FrameKind::Emphasis => InlineRun::Emphasis(frame.runs),
            FrameKind::Strong => InlineRun::Strong(frame.runs),
            FrameKind::Link(href) => InlineRun::Link {
                text: runs_plain_text(&frame.runs),
                href,
            },
            FrameKind::Image(href) => {
                let alt = runs_plain_text(&frame.runs);
                InlineRun::Link {
                    text: if alt.is_empty() { href.clone() } else { alt },
                    href,
                }
            }
            _ => {
                for run in frame.runs {
                    self.push_run(run);
                }
                return;
            }
        };
        self.inline_depth -= 1;
        self.push_run(run);
    }

    /// Close the paragraph opened for loose text, if one is open
    fn flush_implicit(&mut self) {
        if matches!(self.frames.last(), Some(f) if f.kind == FrameKind::Implicit) {
            self.close_block_frame();
        }
    }

    fn current_runs(&mut self) -> &mut Vec<InlineRun> {
        if self.frames.is_empty() {
            self.open_frame(FrameKind::Implicit);
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last].runs
    }

    fn push_text(&mut self, text: &str) {
        let runs = self.current_runs();
        match runs.last_mut() {
            Some(InlineRun::Text(last)) => last.push_str(text),
            _ => runs.push(InlineRun::Text(text.to_string())),
        }
    }

    fn push_run(&mut self, run: InlineRun) {
        match run {
            InlineRun::Text(text) => self.push_text(&text),
            run => self.current_runs().push(run),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        if let Some(CodeBuffer { language, mut body }) = self.code.take() {
            if body.ends_with('\n') {
                body.pop();
            }
            self.push_block(Block::CodeFence { language, body });
        }
        while let Some(frame) = self.frames.last() {
            let block_level = matches!(
                frame.kind,
                FrameKind::Paragraph | FrameKind::Heading(_) | FrameKind::Implicit
            );
            if block_level {
                self.close_block_frame();
            } else {
                self.close_inline_frame();
            }
        }
        while self.containers.len() > 1 {
            self.close_container();
        }

        match self.containers.pop() {
            Some(Container::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }
}

fn pad_row(mut row: Vec<TableCell>, columns: usize) -> Vec<TableCell> {
    row.resize_with(columns.max(row.len()), Vec::new);
    row
}

fn trim_trailing_newlines(runs: &mut Vec<InlineRun>) {
    if let Some(InlineRun::Text(last)) = runs.last_mut() {
        let trimmed = last.trim_end_matches('\n').len();
        last.truncate(trimmed);
        if last.is_empty() {
            runs.pop();
        }
    }
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Alignment::None,
            pulldown_cmark::Alignment::Left => Alignment::Left,
            pulldown_cmark::Alignment::Center => Alignment::Center,
            pulldown_cmark::Alignment::Right => Alignment::Right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentLoader, ContentRegistry};
    use crate::markdown::blocks_plain_text;
    use std::time::{Duration, Instant};

    fn text(s: &str) -> InlineRun {
        InlineRun::Text(s.to_string())
    }

    fn kinds(blocks: &[Block]) -> Vec<&'static str> {
        blocks.iter().map(Block::kind).collect()
    }

    /// Depth of the deepest quote/list chain
    fn nesting(blocks: &[Block]) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Block, usize)> = blocks.iter().map(|b| (b, 1)).collect();
        while let Some((block, depth)) = pending.pop() {
            match block {
                Block::Blockquote(children) => {
                    deepest = deepest.max(depth);
                    pending.extend(children.iter().map(|b| (b, depth + 1)));
                }
                Block::List { items, .. } => {
                    deepest = deepest.max(depth);
                    for item in items {
                        pending.extend(item.children.iter().map(|b| (b, depth + 1)));
                    }
                }
                _ => {}
            }
        }
        deepest
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn test_heading_then_body() {
        let blocks = parse("# Title\nbody");
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 1,
                text: "Title".to_string()
            }
        );
        assert_eq!(blocks[1], Block::Paragraph(vec![text("body")]));
    }

    #[test]
    fn test_end_to_end_example() {
        let blocks = parse("# Hello\n\nSome *em* and **strong** text.\n\n```js\nconsole.log(1)\n```\n");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Hello".to_string()
                },
                Block::Paragraph(vec![
                    text("Some "),
                    InlineRun::Emphasis(vec![text("em")]),
                    text(" and "),
                    InlineRun::Strong(vec![text("strong")]),
                    text(" text."),
                ]),
                Block::CodeFence {
                    language: Some("js".to_string()),
                    body: "console.log(1)".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_heading_levels_and_closing_hashes() {
        let blocks = parse("###### six ###\n####### seven\n#hashtag");
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 6,
                text: "six".to_string()
            }
        );
        assert_eq!(
            blocks[1],
            Block::Paragraph(vec![text("####### seven\n#hashtag")])
        );
    }

    #[test]
    fn test_heading_keeps_plain_text() {
        let blocks = parse("## The `Add` *trait*");
        assert_eq!(
            blocks,
            vec![Block::Heading {
                level: 2,
                text: "The Add trait".to_string()
            }]
        );
    }

    #[test]
    fn test_code_fence_is_verbatim() {
        let body = "fn main() {\n\t  let x = *y * 2; // **not strong**\n\n    # not a heading\n}";
        let source = format!("intro\n```rust\n{}\n```\noutro", body);
        let blocks = parse(&source);
        assert_eq!(kinds(&blocks), vec!["paragraph", "code_fence", "paragraph"]);
        assert_eq!(
            blocks[1],
            Block::CodeFence {
                language: Some("rust".to_string()),
                body: body.to_string()
            }
        );
    }

    #[test]
    fn test_fence_without_language_and_tilde_fence() {
        let blocks = parse("```\nplain\n```\n~~~~ sh extra\n```\nstill code\n~~~~");
        assert_eq!(
            blocks,
            vec![
                Block::CodeFence {
                    language: None,
                    body: "plain".to_string()
                },
                Block::CodeFence {
                    language: Some("sh".to_string()),
                    body: "```\nstill code".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_indented_code_has_no_language() {
        let blocks = parse("para\n\n    let x = 1;\n");
        assert_eq!(
            blocks[1],
            Block::CodeFence {
                language: None,
                body: "let x = 1;".to_string()
            }
        );
    }

    #[test]
    fn test_unterminated_fence_consumes_rest() {
        let blocks = parse("# A\n```py\nprint(1)\n\n# B\n");
        assert_eq!(kinds(&blocks), vec!["heading", "code_fence"]);
        assert_eq!(
            blocks[1],
            Block::CodeFence {
                language: Some("py".to_string()),
                body: "print(1)\n\n# B".to_string()
            }
        );
    }

    #[test]
    fn test_nested_blockquotes() {
        let blocks = parse("> outer\n> > inner *em*\n> back");
        let Block::Blockquote(outer) = &blocks[0] else {
            panic!("expected blockquote, got {:?}", blocks[0]);
        };
        assert_eq!(outer[0], Block::Paragraph(vec![text("outer")]));
        let Block::Blockquote(inner) = &outer[1] else {
            panic!("expected nested blockquote, got {:?}", outer[1]);
        };
        assert_eq!(
            inner[0],
            Block::Paragraph(vec![
                text("inner "),
                InlineRun::Emphasis(vec![text("em")]),
                text("\nback"),
            ])
        );
    }

    #[test]
    fn test_lazy_text_does_not_enter_quoted_fence() {
        let blocks = parse("> ```\n> code\nlazy text");
        assert_eq!(
            blocks,
            vec![
                Block::Blockquote(vec![Block::CodeFence {
                    language: None,
                    body: "code".to_string()
                }]),
                Block::Paragraph(vec![text("lazy text")]),
            ]
        );
    }

    #[test]
    fn test_deep_blockquote_is_capped() {
        let source = "> ".repeat(50_000) + "x";
        let blocks = parse(&source);

        assert_eq!(nesting(&blocks), MAX_NESTING);
        assert_eq!(blocks_plain_text(&blocks), "x");
    }

    #[test]
    fn test_deep_list_is_capped() {
        let source = "- ".repeat(5_000) + "x";
        let blocks = parse(&source);

        assert!(nesting(&blocks) <= MAX_NESTING);
        assert!(blocks_plain_text(&blocks).contains('x'));
    }

    #[test]
    fn test_deep_emphasis_is_spliced() {
        let source = format!("{}x{}", "*a ".repeat(2_000), " b*".repeat(2_000));
        let blocks = parse(&source);
        assert_eq!(kinds(&blocks), vec!["paragraph"]);

        let Block::Paragraph(runs) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let mut depth = 0;
        let mut level = runs.as_slice();
        while let Some(InlineRun::Emphasis(children) | InlineRun::Strong(children)) =
            level.iter().find(|r| !matches!(r, InlineRun::Text(_)))
        {
            depth += 1;
            level = children.as_slice();
        }
        assert!(depth <= MAX_INLINE_NESTING);
        assert!(blocks_plain_text(&blocks).contains('x'));
    }

    #[test]
    fn test_pathological_inlines_finish_quickly() {
        for source in ["[".repeat(100_000), "a* ".repeat(100_000)] {
            let started = Instant::now();
            let blocks = parse(&source);
            assert_eq!(kinds(&blocks), vec!["paragraph"]);
            assert!(started.elapsed() < Duration::from_secs(5));
        }
    }

    #[test]
    fn test_bullet_and_ordered_lists() {
        let blocks = parse("- one\n- two\n\n3. three\n4. four\n");
        assert_eq!(kinds(&blocks), vec!["list", "list"]);

        let Block::List {
            ordered,
            start,
            items,
        } = &blocks[1]
        else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(*start, 3);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].content, vec![text("four")]);
    }

    #[test]
    fn test_list_item_with_nested_blocks() {
        let source = "1. **Size:**  \n    must go behind a pointer:\n    \n    ```\n    fn f(a: &dyn Animal) {}\n    ```\n    \n2. second\n   - nested\n";
        let blocks = parse(source);
        assert_eq!(kinds(&blocks), vec!["list"]);

        let Block::List { items, .. } = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].content,
            vec![
                InlineRun::Strong(vec![text("Size:")]),
                text("\nmust go behind a pointer:"),
            ]
        );
        assert_eq!(
            items[0].children,
            vec![Block::CodeFence {
                language: None,
                body: "fn f(a: &dyn Animal) {}".to_string()
            }]
        );
        assert_eq!(items[1].content, vec![text("second")]);
        assert_eq!(kinds(&items[1].children), vec!["list"]);
    }

    #[test]
    fn test_list_ends_at_heading_without_blank_line() {
        let blocks = parse("1. a\n2. b\n# Next\n- x");
        assert_eq!(kinds(&blocks), vec!["list", "heading", "list"]);
    }

    #[test]
    fn test_bullet_kind_change_starts_new_list() {
        let blocks = parse("- a\n* b");
        assert_eq!(kinds(&blocks), vec!["list", "list"]);
    }

    #[test]
    fn test_table() {
        let source = "|Kind|Dispatch|Example|\n|:---|:-:|--:|\n|generic|static|`T: Add`|\n|object|*dynamic*|[docs](https://doc.rust-lang.org)|\n|short|\n\nafter";
        let blocks = parse(source);
        assert_eq!(kinds(&blocks), vec!["table", "paragraph"]);

        let Block::Table {
            alignments,
            head,
            rows,
        } = &blocks[0]
        else {
            panic!("expected table");
        };
        assert_eq!(
            alignments,
            &vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
        assert_eq!(head[1], vec![text("Dispatch")]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][2], vec![InlineRun::CodeSpan("T: Add".to_string())]);
        assert_eq!(rows[1][1], vec![InlineRun::Emphasis(vec![text("dynamic")])]);
        assert_eq!(
            rows[1][2],
            vec![InlineRun::Link {
                text: "docs".to_string(),
                href: "https://doc.rust-lang.org".to_string()
            }]
        );
        assert_eq!(rows[2].len(), 3);
        assert!(rows[2][1].is_empty());
    }

    #[test]
    fn test_pipe_without_delimiter_row_is_paragraph() {
        let blocks = parse("a | b\nc | d");
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("a | b\nc | d")])]);
    }

    #[test]
    fn test_rule() {
        let blocks = parse("text\n\n---\nnote\n\n* * *");
        assert_eq!(kinds(&blocks), vec!["paragraph", "rule", "paragraph", "rule"]);
    }

    #[test]
    fn test_order_preserved() {
        let source = "> quote\n\n## h2\n\n- item\n\n```\ncode\n```\n\npara\n\n|a|b|\n|-|-|\n|1|2|\n\n---";
        let blocks = parse(source);
        assert_eq!(
            kinds(&blocks),
            vec!["blockquote", "heading", "list", "code_fence", "paragraph", "table", "rule"]
        );
    }

    #[test]
    fn test_image_becomes_link() {
        let blocks = parse("![diagram](/img/a.png) and ![](/img/b.png)");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                InlineRun::Link {
                    text: "diagram".to_string(),
                    href: "/img/a.png".to_string()
                },
                text(" and "),
                InlineRun::Link {
                    text: "/img/b.png".to_string(),
                    href: "/img/b.png".to_string()
                },
            ])]
        );
    }

    #[test]
    fn test_html_is_kept_as_text() {
        let blocks = parse("<div>\nhi\n</div>\n\na <b>b</b>");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("<div>\nhi\n</div>")]),
                Block::Paragraph(vec![text("a <b>b</b>")]),
            ]
        );
    }

    #[test]
    fn test_crlf_input() {
        let blocks = parse("# Title\r\n\r\nbody\r\n");
        assert_eq!(kinds(&blocks), vec!["heading", "paragraph"]);
        assert_eq!(blocks[1], Block::Paragraph(vec![text("body")]));
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let err = parse_bytes(&[b'#', b' ', 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, BlogError::Encoding { .. }));
    }

    #[test]
    fn test_parse_bytes_skips_bom() {
        let blocks = parse_bytes(b"\xEF\xBB\xBF# Title").unwrap();
        assert_eq!(
            blocks,
            vec![Block::Heading {
                level: 1,
                text: "Title".to_string()
            }]
        );
    }

    #[test]
    fn test_first_heading_skips_fences() {
        let source = "intro\n```\n# not this\n```\n## This one\n# Later";
        assert_eq!(first_heading(source), Some("This one".to_string()));
        assert_eq!(first_heading("#\n\n# `code` title"), Some("code title".to_string()));
        assert_eq!(first_heading("no headings"), None);
    }

    #[test]
    fn test_idempotent_parse() {
        let source = "# A\n\n- *x*\n- `y`\n\n> q";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn test_bundled_posts_keep_their_words_in_order() {
        let mut registry = ContentRegistry::new();
        ContentLoader::new(&mut registry).load_bundled().unwrap();

        for entry in registry.entries() {
            let body = entry.body();
            let plain = blocks_plain_text(&parse(body));
            assert!(!plain.trim().is_empty(), "{} rendered no text", entry.slug());

            // Every character of the plain text comes from the source, in order
            let mut source = body.chars();
            for c in plain.chars().filter(|c| !c.is_whitespace()) {
                assert!(
                    source.any(|s| s == c),
                    "{}: {:?} is out of order or invented",
                    entry.slug(),
                    c
                );
            }

            // Every source word free of markup survives, in order
            let mut at = 0;
            for word in body
                .split_whitespace()
                .filter(|w| w.chars().all(char::is_alphanumeric))
            {
                match plain[at..].find(word) {
                    Some(offset) => at += offset + word.len(),
                    None => panic!("{}: lost {:?}", entry.slug(), word),
                }
            }
        }
    }
}
