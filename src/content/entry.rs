//! Content entries and listing summaries

use serde::Serialize;

use super::FrontMatter;
use crate::markdown;

/// One registered post: its slug, immutable source text and derived title
#[derive(Debug, Clone)]
pub struct ContentEntry {
    slug: String,
    raw: String,
    body_offset: usize,
    title: String,
    front_matter: FrontMatter,
}

impl ContentEntry {
    /// Build an entry from raw source, splitting off front-matter and
    /// deriving the title
    pub(crate) fn new(slug: String, raw: String) -> Self {
        let (front_matter, body_offset) = FrontMatter::parse(&raw);
        let title = front_matter
            .title
            .clone()
            .or_else(|| markdown::first_heading(&raw[body_offset..]))
            .unwrap_or_else(|| slug.clone());

        Self {
            slug,
            raw,
            body_offset,
            title,
            front_matter,
        }
    }

    /// Stable lookup key
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Full source text, front-matter included
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Markdown body without the front-matter
    pub fn body(&self) -> &str {
        &self.raw[self.body_offset..]
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// Publication date formatted as `YYYY-MM-DD`, if the front-matter has one
    pub fn date(&self) -> Option<String> {
        self.front_matter
            .parse_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Read-only summary for listings
    pub fn summary(&self) -> EntrySummary<'_> {
        EntrySummary {
            slug: &self.slug,
            title: &self.title,
            date: self.date(),
            description: self.front_matter.description.as_deref(),
            tags: &self.front_matter.tags,
        }
    }
}

/// Slug and title of an entry, plus the metadata a listing shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub tags: &'a [String],
}
