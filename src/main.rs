//! mangafinder - find the manga a page comes from
//!
//! Reverse image search on SauceNAO, enriched with MyAnimeList data via Jikan.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! mangafinder search page.png
//! mangafinder details "Naruto"
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! SAUCENAO_API_KEY=... mangafinder serve --port 8000
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mangafinder::{
    config::Settings,
    model::SearchResult,
    pipeline::Finder,
    server::{self, AppState},
    upload::{content_type_for_path, ImageUpload},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Manga source finder - reverse image search with bibliographic enrichment
#[derive(Parser)]
#[command(name = "mangafinder")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[command(flatten)]
        providers: ProviderArgs,
    },

    /// Reverse-search one image and print the result as JSON
    Search {
        /// Image file (JPEG, PNG, WEBP or GIF)
        image: PathBuf,

        /// Keep explicit hits
        #[arg(long)]
        include_nsfw: bool,

        #[command(flatten)]
        providers: ProviderArgs,
    },

    /// Look up a title directly and print the result as JSON
    Details {
        /// Manga title
        title: String,

        #[command(flatten)]
        providers: ProviderArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct ProviderArgs {
    /// SauceNAO API key
    #[arg(long, env = "SAUCENAO_API_KEY", hide_env_values = true)]
    saucenao_key: Option<String>,

    /// Timeout of each provider call, in seconds
    #[arg(long, env = "MANGAFINDER_HTTP_TIMEOUT", default_value_t = 15)]
    http_timeout: u64,

    /// Timeout of a whole request, in seconds
    #[arg(long, env = "MANGAFINDER_REQUEST_TIMEOUT", default_value_t = 60)]
    request_timeout: u64,

    /// Lifetime of cached details, in seconds
    #[arg(long, env = "MANGAFINDER_CACHE_TTL", default_value_t = 3600)]
    cache_ttl: u64,

    /// Maximum number of cached titles
    #[arg(long, env = "MANGAFINDER_CACHE_CAPACITY", default_value_t = 100)]
    cache_capacity: usize,

    /// Language synopses are translated into
    #[arg(long, env = "MANGAFINDER_TARGET_LANG", default_value = "es")]
    target_lang: String,
}

impl ProviderArgs {
    fn settings(&self) -> Settings {
        Settings {
            saucenao_api_key: self.saucenao_key.clone(),
            target_lang: self.target_lang.clone(),
            http_timeout: Duration::from_secs(self.http_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            cache_ttl: Duration::from_secs(self.cache_ttl),
            cache_capacity: self.cache_capacity,
            ..Default::default()
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON results on stdout stay clean
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Serve {
            port,
            host,
            providers,
        } => run_server(host, port, providers.settings()).await,
        Commands::Search {
            image,
            include_nsfw,
            providers,
        } => run_search(image, include_nsfw, providers.settings()).await,
        Commands::Details { title, providers } => run_details(title, providers.settings()).await,
    }
}

// ============================================================================
// One-shot lookups
// ============================================================================

async fn run_search(image: PathBuf, include_nsfw: bool, settings: Settings) -> Result<()> {
    let content_type = content_type_for_path(&image)
        .with_context(|| format!("Unsupported image extension: {}", image.display()))?;
    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let upload = ImageUpload::new(file_name, content_type, bytes)?;
    let finder = Finder::from_settings(&settings).context("Invalid configuration")?;

    let result = finder.search(&upload, include_nsfw).await?;
    print_result(&result)
}

async fn run_details(title: String, settings: Settings) -> Result<()> {
    let finder = Finder::from_settings(&settings).context("Invalid configuration")?;
    let result = finder.details(&title).await?;
    print_result(&result)
}

fn print_result(result: &SearchResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(host: String, port: u16, settings: Settings) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    if settings.saucenao_api_key.is_none() {
        tracing::warn!("SAUCENAO_API_KEY not set, /search will fail until it is configured");
    }

    let finder = Finder::from_settings(&settings).context("Invalid configuration")?;
    let state = Arc::new(AppState::new(finder, settings.request_timeout));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    println!("Listening on http://{}", addr);
    server::serve(addr, state).await.context("Server error")?;

    Ok(())
}
