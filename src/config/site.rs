//! Blog configuration (markpost.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::RenderOptions;

/// Main blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Blog
    pub title: String,
    pub author: String,
    pub description: String,

    // URL
    pub url: String,
    pub root: String,

    // Content
    /// Register the posts compiled into the binary
    pub bundled: bool,
    /// Extra directory of Markdown files, relative to the base directory
    pub content_dir: Option<PathBuf>,

    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Markpost".to_string(),
            author: "John Doe".to_string(),
            description: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            bundled: true,
            content_dir: None,

            render: RenderOptions::default(),
            server: ServerConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BlogConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Site-relative URL of a post page
    pub fn post_path(&self, slug: &str) -> String {
        format!("{}/posts/{}", self.root.trim_end_matches('/'), slug)
    }
}

/// Preview server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
