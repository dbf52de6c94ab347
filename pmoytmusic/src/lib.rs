//! YouTube Music catalog client for PMOMusic
//!
//! This crate reads the YouTube Music catalog through the undocumented
//! InnerTube JSON API used by the web app, and turns its deeply nested
//! "renderer" trees into flat, validated metadata records.
//!
//! # Features
//!
//! - **Search**: mixed tracks, albums, playlists and artists, deduplicated
//! - **Browse**: albums, playlists, artist pages and the home feed
//! - **URL resolution**: `watch?v=`, `youtu.be/`, `playlist?list=` and
//!   `/browse/` links
//! - **Enrichment**: ISRC and links to Deezer, Tidal, Qobuz, Spotify, Amazon
//!   and Apple Music through song.link
//! - **Resilience**: per-attempt timeouts, bounded retries with exponential
//!   backoff, response caching with TTL and in-flight deduplication
//! - **Output hygiene**: every URL field is an absolute http(s) URL or null,
//!   records without id are dropped, and a pre-flight validator guards native
//!   download calls
//!
//! # Example
//!
//! ```no_run
//! use pmoytmusic::YtMusicClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = YtMusicClient::new()?;
//!
//!     let results = client.search("abba waterloo").await;
//!     println!("Found {} results", results.len());
//!
//!     if let Some(resolved) = client
//!         .resolve_url("https://music.youtube.com/playlist?list=OLAK5uy_abc")
//!         .await
//!     {
//!         println!("{:?}", resolved);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Callers without an async runtime use [`BlockingClient`].
//!
//! # Module layout
//!
//! - [`http`], [`cache`]: transport resilience and caching
//! - [`walker`], [`extract`], [`parser`]: renderer tree analysis
//! - [`sanitize`]: conversion to the output contract and validation
//! - [`enrich`]: song.link / Deezer lookups
//! - [`client`], [`blocking`]: public facades

pub mod blocking;
pub mod cache;
pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod http;
pub mod links;
pub mod media;
pub mod models;
pub mod parser;
pub mod sanitize;
pub mod walker;

// Re-exports
pub use blocking::BlockingClient;
pub use cache::{Clock, InFlight, ResponseCache, SystemClock};
#[cfg(feature = "test-util")]
pub use cache::ManualClock;
pub use client::{ClientBuilder, Endpoint, YtMusicClient};
pub use config::{load_config, YtMusicConfig};
pub use error::{Error, Result};
pub use http::{FetchRequest, HttpFetcher, RetryPolicy};
pub use models::{
    AlbumMetadata, AlbumType, ArtistMetadata, CollectionHeader, CollectionMetadata,
    EnrichedTrack, Enrichment, ExternalLinks, HomeFeedItemMetadata, HomeFeedSectionMetadata,
    ItemType, PlaylistMetadata, ResolvedUrl, SearchResult, TrackMetadata, ValidationOutcome,
};
