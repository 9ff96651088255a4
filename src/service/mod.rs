//! Blog service - listing and memoized rendering over a content registry
//!
//! The registry is immutable once the service owns it, so lookups take no
//! lock. Rendered documents live in an append-only cache behind a
//! `RwLock`: the fast path only takes the read lock, and a miss re-checks
//! under the write lock before rendering, so each slug is parsed and
//! rendered at most once per service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::content::{ContentEntry, ContentRegistry, EntrySummary};
use crate::error::Result;
use crate::markdown::{self, Block};
use crate::render::{DocumentRenderer, RenderedDocument};

type RenderCache = HashMap<String, Arc<RenderedDocument>>;

/// Read-side facade over the registered content
pub struct BlogService {
    registry: ContentRegistry,
    renderer: DocumentRenderer,
    cache: RwLock<RenderCache>,
    parse_count: AtomicUsize,
}

impl BlogService {
    pub fn new(registry: ContentRegistry, renderer: DocumentRenderer) -> Self {
        Self {
            registry,
            renderer,
            cache: RwLock::new(HashMap::new()),
            parse_count: AtomicUsize::new(0),
        }
    }

    /// Summaries of every entry, in registration order
    pub fn list(&self) -> impl ExactSizeIterator<Item = EntrySummary<'_>> + Clone + '_ {
        self.registry.list()
    }

    /// Raw entry access
    pub fn get(&self, slug: &str) -> Result<&ContentEntry> {
        self.registry.get(slug)
    }

    /// Rendered document for `slug`.
    ///
    /// The first call parses and renders; every later call returns the same
    /// `Arc`. Unknown slugs fail with `NotFound` and are not cached.
    pub fn get_rendered(&self, slug: &str) -> Result<Arc<RenderedDocument>> {
        let entry = self.registry.get(slug)?;

        if let Some(doc) = self.read_cache().get(slug) {
            tracing::debug!(slug, "Render cache hit");
            return Ok(Arc::clone(doc));
        }

        let mut cache = self.write_cache();
        // Another caller may have rendered it while we waited
        if let Some(doc) = cache.get(slug) {
            return Ok(Arc::clone(doc));
        }

        let doc = Arc::new(self.render_entry(entry));
        cache.insert(slug.to_string(), Arc::clone(&doc));
        Ok(doc)
    }

    /// Parsed blocks for `slug`. Not cached and not counted.
    pub fn blocks(&self, slug: &str) -> Result<Vec<Block>> {
        let entry = self.registry.get(slug)?;
        Ok(markdown::parse(entry.body()))
    }

    /// Render every entry up front. Returns how many were newly rendered.
    pub fn render_all(&self) -> usize {
        let before = self.parse_count();
        for entry in self.registry.entries() {
            // Slugs come from the registry itself, so lookups cannot miss
            if let Err(e) = self.get_rendered(entry.slug()) {
                tracing::warn!("Failed to render {}: {}", entry.slug(), e);
            }
        }
        self.parse_count() - before
    }

    /// How many documents have been parsed for rendering
    pub fn parse_count(&self) -> usize {
        self.parse_count.load(Ordering::Acquire)
    }

    /// How many rendered documents are cached
    pub fn cached_count(&self) -> usize {
        self.read_cache().len()
    }

    fn render_entry(&self, entry: &ContentEntry) -> RenderedDocument {
        let start = Instant::now();
        let blocks = markdown::parse(entry.body());
        self.parse_count.fetch_add(1, Ordering::AcqRel);
        let doc = self.renderer.render(&blocks);

        tracing::debug!(
            slug = entry.slug(),
            blocks = blocks.len(),
            bytes = doc.html.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Rendered document"
        );
        doc
    }

    // The cache is append-only, so a panic mid-insert cannot leave it
    // inconsistent; recover from poisoning instead of propagating it.
    fn read_cache(&self) -> RwLockReadGuard<'_, RenderCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, RenderCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
