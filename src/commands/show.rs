//! Show one rendered post

use anyhow::Result;
use clap::ValueEnum;

use crate::service::BlogService;
use crate::Blog;

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowFormat {
    /// Rendered HTML body
    Html,
    /// Rendered document as JSON
    Json,
    /// Table of contents, one heading per line
    Toc,
    /// Parsed block tree as JSON
    Blocks,
}

/// Print a post in the requested format
pub fn run(blog: &Blog, slug: &str, format: ShowFormat) -> Result<()> {
    let service = blog.service()?;
    print!("{}", show(&service, slug, format)?);
    Ok(())
}

pub fn show(service: &BlogService, slug: &str, format: ShowFormat) -> Result<String> {
    let out = match format {
        ShowFormat::Html => service.get_rendered(slug)?.html.clone(),
        ShowFormat::Json => {
            let doc = service.get_rendered(slug)?;
            serde_json::to_string_pretty(&*doc)? + "\n"
        }
        ShowFormat::Toc => {
            let doc = service.get_rendered(slug)?;
            let base = doc.toc.iter().map(|e| e.level).min().unwrap_or(1);
            let mut out = String::new();
            for entry in &doc.toc {
                let indent = "  ".repeat(usize::from(entry.level - base));
                out.push_str(&format!("{}- {} (#{})\n", indent, entry.text, entry.anchor));
            }
            out
        }
        ShowFormat::Blocks => serde_json::to_string_pretty(&service.blocks(slug)?)? + "\n",
    };
    Ok(out)
}
