//! Content module - front-matter, registered entries and loading

mod entry;
mod frontmatter;
pub mod loader;
mod registry;

pub use entry::{ContentEntry, EntrySummary};
pub use frontmatter::FrontMatter;
pub use loader::ContentLoader;
pub use registry::ContentRegistry;
