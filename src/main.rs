//! CLI entry point for markpost

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use markpost::commands::show::ShowFormat;

#[derive(Parser)]
#[command(name = "markpost")]
#[command(version)]
#[command(about = "Render and preview a Markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered posts
    #[command(alias = "ls")]
    List,

    /// Render a single post
    Show {
        /// Slug of the post
        slug: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: ShowFormat,
    },

    /// Start the preview server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "markpost=debug,info"
    } else {
        "markpost=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List => {
            let blog = markpost::Blog::new(&base_dir)?;
            markpost::commands::list::run(&blog)?;
        }

        Commands::Show { slug, format } => {
            let blog = markpost::Blog::new(&base_dir)?;
            markpost::commands::show::run(&blog, &slug, format)?;
        }

        Commands::Server { port, ip, open } => {
            let blog = markpost::Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            markpost::server::start(&blog, &ip, port, open).await?;
        }

        Commands::Version => {
            println!("markpost version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
