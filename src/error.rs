//! Error types shared by the registry, parser and service

use std::str::Utf8Error;
use thiserror::Error;

/// Errors raised while registering, parsing or looking up content
#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("{source_name} is not valid UTF-8 text: {source}")]
    Encoding {
        source_name: String,
        #[source]
        source: Utf8Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlogError {
    /// Whether the error means "no such content" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound(_))
    }
}

/// Result alias for content operations
pub type Result<T, E = BlogError> = std::result::Result<T, E>;
