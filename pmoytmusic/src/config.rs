//! Static configuration of the YouTube Music client
//!
//! Every knob has a compile-time default (`DEFAULT_*`). A [`YtMusicConfig`] is
//! handed to the [`ClientBuilder`](crate::ClientBuilder) once; the client never
//! changes it afterwards.
//!
//! ```yaml
//! fetch_timeout_ms: 15000
//! max_retries: 2
//! backoff_base_ms: 250
//! cache_ttl_ms: 120000
//! thumbnail_size: 512
//! client_version: "1.20240801.01.00"
//! max_results: 12
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-attempt timeout for upstream requests (ms)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;

/// Retries allowed beyond the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay of the exponential backoff (ms)
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 250;

/// Upper bound of the random jitter added to each backoff delay (ms)
pub const DEFAULT_MAX_JITTER_MS: u64 = 100;

/// Time-to-live of cached upstream responses (ms)
pub const DEFAULT_CACHE_TTL_MS: u64 = 120_000;

/// Side of the square thumbnails requested from the image CDN (px)
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 512;

/// InnerTube `WEB_REMIX` client version
pub const DEFAULT_CLIENT_VERSION: &str = "1.20240801.01.00";

/// Maximum number of search results returned to the host
pub const DEFAULT_MAX_RESULTS: usize = 12;

/// Interface language sent in the InnerTube context
pub const DEFAULT_LANGUAGE: &str = "en";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtMusicConfig {
    #[serde(default = "YtMusicConfig::default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "YtMusicConfig::default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "YtMusicConfig::default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "YtMusicConfig::default_max_jitter_ms")]
    pub max_jitter_ms: u64,
    #[serde(default = "YtMusicConfig::default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "YtMusicConfig::default_thumbnail_size")]
    pub thumbnail_size: u32,
    #[serde(default = "YtMusicConfig::default_client_version")]
    pub client_version: String,
    #[serde(default = "YtMusicConfig::default_max_results")]
    pub max_results: usize,
    #[serde(default = "YtMusicConfig::default_language")]
    pub language: String,
}

impl YtMusicConfig {
    const fn default_fetch_timeout_ms() -> u64 {
        DEFAULT_FETCH_TIMEOUT_MS
    }

    const fn default_max_retries() -> u32 {
        DEFAULT_MAX_RETRIES
    }

    const fn default_backoff_base_ms() -> u64 {
        DEFAULT_BACKOFF_BASE_MS
    }

    const fn default_max_jitter_ms() -> u64 {
        DEFAULT_MAX_JITTER_MS
    }

    const fn default_cache_ttl_ms() -> u64 {
        DEFAULT_CACHE_TTL_MS
    }

    const fn default_thumbnail_size() -> u32 {
        DEFAULT_THUMBNAIL_SIZE
    }

    fn default_client_version() -> String {
        DEFAULT_CLIENT_VERSION.to_string()
    }

    const fn default_max_results() -> usize {
        DEFAULT_MAX_RESULTS
    }

    fn default_language() -> String {
        DEFAULT_LANGUAGE.to_string()
    }

    /// Parse a YAML document, missing keys take their default value
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("invalid pmoytmusic configuration")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for YtMusicConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: Self::default_fetch_timeout_ms(),
            max_retries: Self::default_max_retries(),
            backoff_base_ms: Self::default_backoff_base_ms(),
            max_jitter_ms: Self::default_max_jitter_ms(),
            cache_ttl_ms: Self::default_cache_ttl_ms(),
            thumbnail_size: Self::default_thumbnail_size(),
            client_version: Self::default_client_version(),
            max_results: Self::default_max_results(),
            language: Self::default_language(),
        }
    }
}

/// Load a configuration file from disk
pub fn load_config(path: impl AsRef<Path>) -> Result<YtMusicConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    YtMusicConfig::from_yaml_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))
}
