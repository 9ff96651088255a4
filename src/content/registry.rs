//! In-memory registry of posts keyed by slug

use indexmap::IndexMap;

use super::{ContentEntry, EntrySummary};
use crate::error::{BlogError, Result};
use crate::markdown;

/// Insertion-ordered map from slug to content entry.
///
/// Filled once at start-up through `&mut self`; everything after that only
/// needs shared access.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    entries: IndexMap<String, ContentEntry>,
}

impl ContentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register Markdown source under `slug`
    pub fn register(&mut self, slug: &str, raw: impl Into<String>) -> Result<&ContentEntry> {
        if self.entries.contains_key(slug) {
            return Err(BlogError::DuplicateSlug(slug.to_string()));
        }

        let entry = ContentEntry::new(slug.to_string(), raw.into());
        tracing::debug!(slug, title = entry.title(), "Registered content");

        let (index, _) = self.entries.insert_full(slug.to_string(), entry);
        Ok(&self.entries[index])
    }

    /// Register raw bytes, rejecting input that is not UTF-8 text
    pub fn register_bytes(&mut self, slug: &str, raw: &[u8]) -> Result<&ContentEntry> {
        let text = markdown::decode(raw, slug)?;
        self.register(slug, text)
    }

    /// Look up an entry by slug
    pub fn get(&self, slug: &str) -> Result<&ContentEntry> {
        self.entries
            .get(slug)
            .ok_or_else(|| BlogError::NotFound(slug.to_string()))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    /// Summaries in registration order. Each call starts a fresh pass.
    pub fn list(&self) -> impl ExactSizeIterator<Item = EntrySummary<'_>> + Clone + '_ {
        self.entries.values().map(ContentEntry::summary)
    }

    /// Entries in registration order
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &ContentEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
