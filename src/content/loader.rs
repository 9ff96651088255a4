//! Content loader - fills a registry from the bundled posts and from a
//! content directory

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{ContentRegistry, FrontMatter};
use crate::error::Result;
use crate::markdown;

/// Posts compiled into the binary, as `(file name, source)` pairs
pub const BUNDLED_POSTS: &[(&str, &str)] = &[
    (
        "welcome-to-my-blog.md",
        include_str!("../../content/welcome-to-my-blog.md"),
    ),
    (
        "note-ownership-and-borrowing.md",
        include_str!("../../content/note-ownership-and-borrowing.md"),
    ),
    (
        "note-trait-draft.md",
        include_str!("../../content/note-trait-draft.md"),
    ),
    ("note-trait.md", include_str!("../../content/note-trait.md")),
    (
        "typescript-best-practices.md",
        include_str!("../../content/typescript-best-practices.md"),
    ),
];

/// Registers Markdown documents into a [`ContentRegistry`]
pub struct ContentLoader<'a> {
    registry: &'a mut ContentRegistry,
}

impl<'a> ContentLoader<'a> {
    pub fn new(registry: &'a mut ContentRegistry) -> Self {
        Self { registry }
    }

    /// Register every bundled post. Returns how many were registered.
    pub fn load_bundled(&mut self) -> Result<usize> {
        let mut count = 0;
        for (file_name, source) in BUNDLED_POSTS {
            if self.register_source(file_name, source)? {
                count += 1;
            }
        }
        tracing::debug!(count, "Loaded bundled posts");
        Ok(count)
    }

    /// Register every Markdown file under `dir`, in file-name order.
    ///
    /// Files that cannot be read, are not UTF-8 or reuse a slug are skipped
    /// with a warning. A missing directory registers nothing.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", dir);
            return Ok(0);
        }

        let mut count = 0;
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) || is_hidden(path) {
                continue;
            }

            match self.load_file(path) {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Skipping {:?}: {}", path, e),
            }
        }

        tracing::debug!(count, dir = %dir.display(), "Loaded content directory");
        Ok(count)
    }

    /// Register a single file. Returns `false` for unpublished posts.
    pub fn load_file(&mut self, path: &Path) -> Result<bool> {
        let bytes = fs::read(path)?;
        let source_name = path.display().to_string();
        let text = markdown::decode(&bytes, &source_name)?;

        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        self.register_source(file_name, text)
    }

    fn register_source(&mut self, file_name: &str, source: &str) -> Result<bool> {
        let (fm, _) = FrontMatter::parse(source);
        if !fm.published {
            tracing::debug!(file_name, "Skipping unpublished post");
            return Ok(false);
        }

        let slug = fm.slug.unwrap_or_else(|| slug_from_file_name(file_name));
        self.registry.register(&slug, source)?;
        Ok(true)
    }
}

/// Derive a slug from a file name: the stem, slugified
pub fn slug_from_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    match slug::slugify(stem) {
        s if s.is_empty() => "untitled".to_string(),
        s => s,
    }
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "md" | "markdown"))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with('.') || s.starts_with('_'))
        .unwrap_or(false)
}
