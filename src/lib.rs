//! markpost: a Markdown blog core with a memoized render cache
//!
//! Posts are registered into a [`content::ContentRegistry`], parsed into
//! blocks by [`markdown`], rendered to HTML by [`render`], and served
//! through [`service::BlogService`], which renders each post at most once.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod markdown;
pub mod render;
pub mod server;
pub mod service;

pub use error::BlogError;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentLoader, ContentRegistry};
use render::DocumentRenderer;
use service::BlogService;

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Blog configuration
    pub config: config::BlogConfig,
    /// Base directory
    pub base_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("markpost.yml");

        let config = if config_path.exists() {
            config::BlogConfig::load(&config_path)?
        } else {
            config::BlogConfig::default()
        };

        Ok(Self { config, base_dir })
    }

    /// Content directory, if configured
    pub fn content_dir(&self) -> Option<PathBuf> {
        self.config
            .content_dir
            .as_ref()
            .map(|dir| self.base_dir.join(dir))
    }

    /// Register the bundled posts and the content directory
    pub fn build_registry(&self) -> Result<ContentRegistry> {
        let mut registry = ContentRegistry::new();
        let mut loader = ContentLoader::new(&mut registry);

        let bundled = if self.config.bundled {
            loader.load_bundled()?
        } else {
            0
        };
        let loaded = match self.content_dir() {
            Some(dir) => loader.load_dir(&dir)?,
            None => 0,
        };

        tracing::info!(bundled, loaded, "Registered {} posts", registry.len());
        Ok(registry)
    }

    /// Build the service over a freshly loaded registry
    pub fn service(&self) -> Result<BlogService> {
        let registry = self.build_registry()?;
        let renderer = DocumentRenderer::new(self.config.render.clone());
        Ok(BlogService::new(registry, renderer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Markpost");
        assert_eq!(blog.content_dir(), None);

        let service = blog.service().unwrap();
        assert_eq!(service.list().len(), content::loader::BUNDLED_POSTS.len());
    }

    #[test]
    fn test_config_drives_loading_and_rendering() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("markpost.yml"),
            "title: Notes\nbundled: false\ncontent_dir: posts\nrender:\n  heading_ids: false\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("posts").join("first.md"), "# First\n").unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Notes");
        assert_eq!(blog.content_dir(), Some(dir.path().join("posts")));

        let service = blog.service().unwrap();
        let slugs: Vec<&str> = service.list().map(|s| s.slug).collect();
        assert_eq!(slugs, vec!["first"]);
        assert_eq!(service.get_rendered("first").unwrap().html, "<h1>First</h1>\n");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("markpost.yml"), "server: [not, a, map]\n").unwrap();
        assert!(Blog::new(dir.path()).is_err());
    }
}
