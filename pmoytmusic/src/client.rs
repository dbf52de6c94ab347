//! Async client for the YouTube Music catalog
//!
//! All catalog calls go through the InnerTube JSON API
//! (`/youtubei/v1/{search,browse,player}`), with the `WEB_REMIX` client
//! identity. Raw responses are cached for the configured TTL and concurrent
//! identical requests share a single upstream call.
//!
//! The host-facing operations never fail: upstream and parsing errors are
//! logged and turned into an empty list or `None`. [`YtMusicClient::innertube`]
//! is the only method returning the underlying [`Result`].
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
//!     for result in client.search("dancing queen").await {
//!         println!("{} ({})", result.id(), result.item_type().as_str());
//!     }
//!
//!     if let Some(album) = client.get_album("MPREb_7kUl1R9eA0k").await {
//!         println!("{} - {} tracks", album.name, album.total_tracks);
//!     }
//!     Ok(())
//! }
//! ```

use crate::cache::{Clock, InFlight, ResponseCache, SystemClock};
use crate::config::YtMusicConfig;
use crate::enrich::{Enricher, DEFAULT_DEEZER_BASE_URL, DEFAULT_ODESLI_BASE_URL};
use crate::error::{Error, Result};
use crate::http::{random_user_agent, FetchRequest, HttpFetcher, RetryPolicy};
use crate::links::{extract_browse_id, extract_playlist_id, extract_video_id, playlist_browse_id};
use crate::models::{
    AlbumMetadata, ArtistMetadata, BrowseResult, EnrichedTrack, HomeFeedSectionMetadata,
    PlaylistMetadata, ResolvedUrl, SearchResult, Track, TrackMetadata, ValidationOutcome,
};
use crate::parser::home::HOME_BROWSE_ID;
use crate::parser::{
    parse_artist_response, parse_browse_response, parse_home_response, parse_player_response,
    parse_search_response,
};
use crate::sanitize;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default YouTube Music origin
pub const DEFAULT_BASE_URL: &str = "https://music.youtube.com";

/// InnerTube client name of the YouTube Music web app
pub const CLIENT_NAME: &str = "WEB_REMIX";

/// InnerTube endpoints used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    Browse,
    Player,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Browse => "browse",
            Self::Player => "player",
        }
    }

    /// Body field carrying the request argument
    fn argument_field(&self) -> &'static str {
        match self {
            Self::Search => "query",
            Self::Browse => "browseId",
            Self::Player => "videoId",
        }
    }
}

/// Outcome shared between the callers of a deduplicated fetch
type FetchOutcome = std::result::Result<Arc<Value>, Arc<Error>>;

/// YouTube Music client
///
/// Cheap to clone: caches and in-flight tables are shared between clones.
#[derive(Clone)]
pub struct YtMusicClient {
    fetcher: HttpFetcher,
    base_url: String,
    config: Arc<YtMusicConfig>,
    responses: Arc<ResponseCache<Arc<Value>>>,
    in_flight: Arc<InFlight<FetchOutcome>>,
    tracks: Arc<ResponseCache<TrackMetadata>>,
    track_loads: Arc<InFlight<()>>,
    enricher: Enricher,
}

impl YtMusicClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &YtMusicConfig {
        &self.config
    }

    // ========================================================================
    // InnerTube transport
    // ========================================================================

    fn innertube_request(&self, endpoint: Endpoint, argument: &str) -> FetchRequest {
        let mut body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": self.config.client_version,
                    "hl": self.config.language,
                }
            }
        });
        body[endpoint.argument_field()] = Value::String(argument.to_string());

        FetchRequest::post_json(
            format!("{}/youtubei/v1/{}?alt=json", self.base_url, endpoint.as_str()),
            body,
        )
        .header("User-Agent", random_user_agent())
        .header("x-youtube-client-name", CLIENT_NAME)
        .header("x-youtube-client-version", self.config.client_version.as_str())
    }

    /// Raw InnerTube response, cached and deduplicated by `endpoint:argument`
    pub async fn innertube(&self, endpoint: Endpoint, argument: &str) -> Result<Arc<Value>> {
        let key = format!("{}:{}", endpoint.as_str(), argument);
        if let Some(hit) = self.responses.get(&key) {
            debug!("response cache hit for {}", key);
            return Ok(hit);
        }

        let fetcher = self.fetcher.clone();
        let responses = Arc::clone(&self.responses);
        let request = self.innertube_request(endpoint, argument);
        let cache_key = key.clone();

        let outcome = self
            .in_flight
            .dedup(&key, move || async move {
                match fetcher.fetch_json(&request).await {
                    Ok(value) => {
                        let value = Arc::new(value);
                        responses.set(cache_key, Arc::clone(&value));
                        Ok(value)
                    }
                    Err(e) => Err(Arc::new(e)),
                }
            })
            .await;

        outcome.map_err(Error::Shared)
    }

    async fn innertube_or_log(&self, endpoint: Endpoint, argument: &str) -> Option<Arc<Value>> {
        match self.innertube(endpoint, argument).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!("{} {:?} failed: {}", endpoint.as_str(), argument, e);
                None
            }
        }
    }

    // ========================================================================
    // Catalog operations
    // ========================================================================

    /// Search tracks, albums, playlists and artists
    ///
    /// Results are deduplicated by id, capped to `max_results` and sanitized.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let Some(data) = self.innertube_or_log(Endpoint::Search, query).await else {
            return Vec::new();
        };
        let items = parse_search_response(&data, self.config.max_results, self.config.thumbnail_size);
        let results = sanitize::sanitize_search_results(&items);
        info!("search {:?}: {} results", query, results.len());
        results
    }

    async fn browse(&self, browse_id: &str) -> Option<BrowseResult> {
        let data = self.innertube_or_log(Endpoint::Browse, browse_id).await?;
        let result = parse_browse_response(&data, browse_id, self.config.thumbnail_size);
        if result.is_none() {
            warn!("browse {} returned an unusable response", browse_id);
        }
        result
    }

    /// Album with its tracks
    pub async fn get_album(&self, album_id: &str) -> Option<AlbumMetadata> {
        let album = sanitize::sanitize_album(&self.browse(album_id.trim()).await?)?;
        info!("album {}: {:?}, {} tracks", album.id, album.name, album.total_tracks);
        Some(album)
    }

    /// Playlist with its tracks, `VL` is added to the browse id when needed
    pub async fn get_playlist(&self, playlist_id: &str) -> Option<PlaylistMetadata> {
        let playlist_id = playlist_id.trim();
        let result = self.browse(&playlist_browse_id(playlist_id)).await?;
        let playlist = sanitize::sanitize_playlist(&result, playlist_id)?;
        info!("playlist {}: {:?}, {} tracks", playlist.id, playlist.name, playlist.total_tracks);
        Some(playlist)
    }

    /// Artist page: top tracks and discography
    pub async fn get_artist(&self, artist_id: &str) -> Option<ArtistMetadata> {
        let artist_id = artist_id.trim();
        let data = self.innertube_or_log(Endpoint::Browse, artist_id).await?;
        let page = parse_artist_response(&data, artist_id, self.config.thumbnail_size)?;
        let artist = sanitize::sanitize_artist(&page)?;
        info!(
            "artist {}: {:?}, {} top tracks, {} albums",
            artist.id,
            artist.name,
            artist.top_tracks.len(),
            artist.albums.len()
        );
        Some(artist)
    }

    /// Named sections of the home page
    pub async fn get_home_feed(&self) -> Vec<HomeFeedSectionMetadata> {
        let Some(data) = self.innertube_or_log(Endpoint::Browse, HOME_BROWSE_ID).await else {
            return Vec::new();
        };
        let feed = sanitize::sanitize_home_feed(&parse_home_response(&data, self.config.thumbnail_size));
        info!("home feed: {} sections", feed.len());
        feed
    }

    /// Track metadata from the player endpoint, cached by video id
    pub async fn get_track(&self, video_id: &str) -> Option<TrackMetadata> {
        let video_id = video_id.trim();
        if let Some(track) = self.tracks.get(video_id) {
            return Some(track);
        }

        let data = self.innertube_or_log(Endpoint::Player, video_id).await?;
        let track = parse_player_response(&data, video_id, self.config.thumbnail_size)
            .and_then(|track| sanitize::sanitize_track(&track))?;
        self.tracks.set(video_id, track.clone());
        Some(track)
    }

    /// Resolve a YouTube / YouTube Music URL
    ///
    /// Album and playlist pages are fetched before returning. A single video
    /// is returned from the track cache when possible; otherwise a
    /// `pending` placeholder is returned at once while the metadata is loaded
    /// in the background, and a later call returns the real track.
    pub async fn resolve_url(&self, url: &str) -> Option<ResolvedUrl> {
        info!("resolving {}", url);

        let browse_id = extract_browse_id(url);
        if let Some(browse_id) = &browse_id {
            if let Some(resolved) = self.resolve_collection(browse_id).await {
                return Some(resolved);
            }
        } else if let Some(playlist_id) = extract_playlist_id(url) {
            if let Some(resolved) = self.resolve_collection(&playlist_browse_id(&playlist_id)).await {
                return Some(resolved);
            }
        }

        let Some(video_id) = extract_video_id(url) else {
            warn!("no video id in {}", url);
            return None;
        };

        if let Some(track) = self.tracks.get(&video_id) {
            debug!("track {} served from cache", video_id);
            return Some(ResolvedUrl::Track {
                track,
                pending: false,
            });
        }

        self.load_track_in_background(&video_id);
        let placeholder = sanitize::sanitize_track(&Track::placeholder(video_id))?;
        Some(ResolvedUrl::Track {
            track: placeholder,
            pending: true,
        })
    }

    async fn resolve_collection(&self, browse_id: &str) -> Option<ResolvedUrl> {
        let result = self.browse(browse_id).await?;
        let header = sanitize::sanitize_header(&result)?;
        let tracks = result
            .tracks
            .iter()
            .filter_map(sanitize::sanitize_track)
            .collect();

        Some(if result.is_playlist() {
            ResolvedUrl::Playlist {
                playlist: header,
                tracks,
            }
        } else {
            ResolvedUrl::Album {
                album: header,
                tracks,
            }
        })
    }

    fn load_track_in_background(&self, video_id: &str) {
        let client = self.clone();
        let id = video_id.to_string();
        let load = self.track_loads.dedup(&format!("video:{video_id}"), move || async move {
            match client.get_track(&id).await {
                Some(track) => info!("track {} loaded: {:?}", id, track.name),
                None => warn!("track {} could not be loaded", id),
            }
        });
        tokio::spawn(load);
    }

    // ========================================================================
    // Enrichment & guards
    // ========================================================================

    /// ISRC and cross-platform links of a track; the track is returned as is
    /// when nothing can be found
    pub async fn enrich(&self, track: TrackMetadata) -> EnrichedTrack {
        self.enricher.enrich(track).await
    }

    /// Pre-flight check of a record before a native download call
    pub fn validate_for_external_call<T: Serialize>(&self, record: &T) -> ValidationOutcome {
        match serde_json::to_value(record) {
            Ok(value) => sanitize::validate_for_external_call(&value),
            Err(_) => ValidationOutcome::rejected("invalid_track"),
        }
    }

    /// Same check as a gate; blocked records are logged
    pub fn final_guard<T: Serialize>(&self, record: &T) -> bool {
        match serde_json::to_value(record) {
            Ok(value) => sanitize::final_guard(&value),
            Err(e) => {
                error!("native call blocked, record not serializable: {}", e);
                false
            }
        }
    }
}

/// Builder for [`YtMusicClient`]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    odesli_base_url: String,
    deezer_base_url: String,
    config: YtMusicConfig,
    clock: Arc<dyn Clock>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            odesli_base_url: DEFAULT_ODESLI_BASE_URL.to_string(),
            deezer_base_url: DEFAULT_DEEZER_BASE_URL.to_string(),
            config: YtMusicConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the YouTube Music origin
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the song.link API root
    pub fn odesli_base_url(mut self, url: impl Into<String>) -> Self {
        self.odesli_base_url = url.into();
        self
    }

    /// Set the Deezer API root
    pub fn deezer_base_url(mut self, url: impl Into<String>) -> Self {
        self.deezer_base_url = url.into();
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: YtMusicConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the number of retries after the first attempt
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Clock used by the response caches
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<YtMusicClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .connect_timeout(self.config.fetch_timeout())
                .build()?,
        };

        let fetcher = HttpFetcher::new(client, RetryPolicy::from_config(&self.config));
        let ttl = self.config.cache_ttl();
        let enricher = Enricher::new(
            fetcher.clone(),
            self.odesli_base_url,
            self.deezer_base_url,
            ttl,
        );

        Ok(YtMusicClient {
            fetcher,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            responses: Arc::new(ResponseCache::with_clock(ttl, Arc::clone(&self.clock))),
            in_flight: Arc::new(InFlight::new()),
            tracks: Arc::new(ResponseCache::with_clock(ttl, self.clock)),
            track_loads: Arc::new(InFlight::new()),
            config: Arc::new(self.config),
            enricher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemType, PROVIDER_ID};

    #[test]
    fn test_innertube_request_body() {
        let client = YtMusicClient::builder()
            .base_url("https://example.test/")
            .build()
            .unwrap();
        let request = client.innertube_request(Endpoint::Browse, "MPREb_x");
        assert_eq!(request.url(), "https://example.test/youtubei/v1/browse?alt=json");
    }

    #[test]
    fn test_endpoint_fields() {
        assert_eq!(Endpoint::Search.argument_field(), "query");
        assert_eq!(Endpoint::Browse.argument_field(), "browseId");
        assert_eq!(Endpoint::Player.argument_field(), "videoId");
    }

    #[test]
    fn test_guards_accept_typed_records() {
        let client = YtMusicClient::new().unwrap();
        let track = TrackMetadata {
            id: "abc".into(),
            name: "x".into(),
            artists: String::new(),
            album_name: String::new(),
            duration_ms: 0,
            cover_url: None,
            provider_id: PROVIDER_ID.into(),
            item_type: ItemType::Track,
        };
        assert!(client.validate_for_external_call(&track).ok);
        assert!(client.final_guard(&track));

        let blank = TrackMetadata {
            id: " ".into(),
            ..track
        };
        assert_eq!(
            client.validate_for_external_call(&blank).reason.as_deref(),
            Some("missing_id")
        );
    }

    #[tokio::test]
    async fn test_empty_query_skips_network() {
        let client = YtMusicClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert!(client.search("   ").await.is_empty());
    }
}
