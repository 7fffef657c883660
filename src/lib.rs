//! # mangafinder
//!
//! Find the manga a page or panel comes from: reverse image search, then
//! bibliographic enrichment and synopsis translation.
//!
//! ## Modules
//!
//! - [`saucenao`] - SauceNAO reverse image search client
//! - [`jikan`] - Jikan (MyAnimeList) API client
//! - [`translate`] - Synopsis translation
//! - [`matching`] - Hit filtering, title/author extraction, alternatives
//! - [`enrich`] - Bibliographic enrichment with caching
//! - [`merge`] - Merge of image-match and bibliographic data
//! - [`pipeline`] - Per-request orchestration
//! - [`server`] - HTTP API
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mangafinder::{config::Settings, pipeline::Finder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let finder = Finder::from_settings(&Settings::default())?;
//!     let result = finder.details("Naruto").await?;
//!     println!("{:?}", result.synopsis);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod fallback;
pub mod jikan;
pub mod matching;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod saucenao;
pub mod server;
pub mod translate;
pub mod upload;

#[cfg(test)]
mod testing;

pub use error::{FinderError, Result};
