//! Markdown module - parses raw Markdown into a block tree
//!
//! pulldown-cmark tokenizes the source; `parser` lowers its event stream
//! into headings, paragraphs, fences, quotes, lists, tables and rules, with
//! code spans, links and emphasis kept as inline runs.

mod block;
mod parser;

pub use block::{blocks_plain_text, runs_plain_text, Alignment, Block, InlineRun, ListItem, TableCell};
pub use parser::{first_heading, parse, parse_bytes, MAX_INLINE_NESTING, MAX_NESTING};
pub(crate) use parser::decode;
