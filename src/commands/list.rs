//! List registered posts

use anyhow::Result;

use crate::service::BlogService;
use crate::Blog;

/// Print every registered post
pub fn run(blog: &Blog) -> Result<()> {
    let service = blog.service()?;
    print!("{}", listing(&service));
    Ok(())
}

/// One line per post, in registration order
pub fn listing(service: &BlogService) -> String {
    let posts = service.list();
    let mut out = format!("Posts ({}):\n", posts.len());
    for post in posts {
        let date = post.date.as_deref().unwrap_or("----------");
        out.push_str(&format!("  {} - {} [{}]", date, post.title, post.slug));
        if !post.tags.is_empty() {
            out.push_str(&format!(" #{}", post.tags.join(" #")));
        }
        out.push('\n');
    }
    out
}
