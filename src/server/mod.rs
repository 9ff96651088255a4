//! Preview server - HTML pages and a JSON API over the blog service

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::BlogConfig;
use crate::content::EntrySummary;
use crate::error::BlogError;
use crate::render::{html_escape, RenderedDocument};
use crate::service::BlogService;
use crate::Blog;

/// Shared server state
pub struct ServerState {
    service: BlogService,
    config: BlogConfig,
}

impl ServerState {
    pub fn new(service: BlogService, config: BlogConfig) -> Self {
        Self { service, config }
    }
}

type SharedState = Arc<ServerState>;

/// JSON error body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Post listing response
#[derive(Serialize)]
struct PostsResponse<'a> {
    posts: Vec<EntrySummary<'a>>,
}

/// Rendered post plus its entry metadata
#[derive(Serialize)]
struct PostResponse<'a> {
    #[serde(flatten)]
    summary: EntrySummary<'a>,
    document: &'a RenderedDocument,
}

/// Start the preview server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let service = blog.service()?;
    let state = Arc::new(ServerState::new(service, blog.config.clone()));
    let app = build_router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Preview server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the axum router
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/posts/:slug", get(post_page))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTML index of every post
async fn index_page(State(state): State<SharedState>) -> Response {
    let mut body = String::from("<ul class=\"post-list\">\n");
    for post in state.service.list() {
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a>",
            html_escape(&state.config.post_path(post.slug)),
            html_escape(post.title)
        ));
        if let Some(date) = &post.date {
            body.push_str(&format!(" <time>{}</time>", date));
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n");

    Html(layout(&state.config, &state.config.title, &body)).into_response()
}

/// HTML page for one post
async fn post_page(State(state): State<SharedState>, Path(slug): Path<String>) -> Response {
    let entry = match state.service.get(&slug) {
        Ok(entry) => entry,
        Err(e) => return error_page(&state.config, e),
    };
    let doc = match state.service.get_rendered(&slug) {
        Ok(doc) => doc,
        Err(e) => return error_page(&state.config, e),
    };

    let mut body = String::from("<article class=\"post\">\n");
    if let Some(date) = entry.date() {
        body.push_str(&format!("<time>{}</time>\n", date));
    }
    if doc.toc.len() > 1 {
        body.push_str(&format!("<nav>{}</nav>\n", doc.toc_html()));
    }
    body.push_str(&doc.html);
    body.push_str("</article>\n");

    Html(layout(&state.config, entry.title(), &body)).into_response()
}

/// JSON list of post summaries
async fn list_posts(State(state): State<SharedState>) -> Response {
    let posts = PostsResponse {
        posts: state.service.list().collect(),
    };
    Json(posts).into_response()
}

/// JSON rendered post
async fn get_post(State(state): State<SharedState>, Path(slug): Path<String>) -> Response {
    let entry = match state.service.get(&slug) {
        Ok(entry) => entry,
        Err(e) => return error_json(e),
    };
    let doc = match state.service.get_rendered(&slug) {
        Ok(doc) => doc,
        Err(e) => return error_json(e),
    };

    Json(PostResponse {
        summary: entry.summary(),
        document: &doc,
    })
    .into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn status_for(error: &BlogError) -> StatusCode {
    if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_json(error: BlogError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn error_page(config: &BlogConfig, error: BlogError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }
    let body = format!("<p>{}</p>\n", html_escape(&error.to_string()));
    (status, Html(layout(config, "Not found", &body))).into_response()
}

/// Wrap a page body in the site layout
fn layout(config: &BlogConfig, title: &str, body: &str) -> String {
    let page_title = if title == config.title {
        html_escape(title)
    } else {
        format!("{} | {}", html_escape(title), html_escape(&config.title))
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="author" content="{author}">
<title>{page_title}</title>
</head>
<body>
<header><a href="{root}">{site}</a></header>
<main>
<h1 class="page-title">{title}</h1>
{body}</main>
</body>
</html>
"#,
        author = html_escape(&config.author),
        page_title = page_title,
        root = html_escape(&config.root),
        site = html_escape(&config.title),
        title = html_escape(title),
        body = body,
    )
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
