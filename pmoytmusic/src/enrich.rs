//! Cross-platform enrichment through song.link (Odesli) and Deezer
//!
//! The canonical watch URL of a track is resolved by song.link, which answers
//! with the matching entities on other platforms (ISRC, title, artist) and one
//! link per platform. When no entity carries an ISRC but a Deezer track id is
//! known, Deezer's public track endpoint is asked for it.
//!
//! Only enrichments carrying at least one fact are cached, so an empty answer
//! is retried on the next call.

use crate::error::Result;
use crate::http::{random_user_agent, FetchRequest, HttpFetcher};
use crate::links::watch_url;
use crate::models::{EnrichedTrack, Enrichment, ExternalLinks, TrackMetadata};
use moka::future::Cache as MokaCache;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default song.link API root
pub const DEFAULT_ODESLI_BASE_URL: &str = "https://api.song.link";

/// Default Deezer API root
pub const DEFAULT_DEEZER_BASE_URL: &str = "https://api.deezer.com";

const ENRICHMENT_CACHE_CAPACITY: u64 = 1000;

static NUMERIC_TRACK_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/track/(\d+)").ok());
static ALNUM_TRACK_ID: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/track/([a-zA-Z0-9]+)").ok());

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OdesliResponse {
    #[serde(default)]
    entities_by_unique_id: Map<String, Value>,
    #[serde(default)]
    links_by_platform: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OdesliEntity {
    isrc: Option<String>,
    title: Option<String>,
    artist_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    isrc: Option<String>,
}

fn capture(re: Option<&Regex>, url: &str) -> Option<String> {
    re?.captures(url)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl OdesliResponse {
    fn link(&self, platform: &str) -> Option<String> {
        // Entries are read one by one, a malformed platform only loses its own link
        let url = self.links_by_platform.get(platform)?.get("url")?.as_str()?;
        filled(Some(url.to_string()))
    }

    /// Facts of the answer, without the Deezer fallback
    fn enrichment(&self) -> Enrichment {
        let mut enrichment = Enrichment::default();

        // Entities keep their upstream order: the first non-empty value wins
        for value in self.entities_by_unique_id.values() {
            let Ok(entity) = OdesliEntity::deserialize(value) else {
                continue;
            };
            if enrichment.isrc.is_none() {
                enrichment.isrc = filled(entity.isrc);
            }
            if enrichment.enriched_title.is_none() {
                enrichment.enriched_title = filled(entity.title);
            }
            if enrichment.enriched_artist.is_none() {
                enrichment.enriched_artist = filled(entity.artist_name);
            }
        }

        let links = ExternalLinks {
            deezer: self.link("deezer"),
            tidal: self.link("tidal"),
            qobuz: self.link("qobuz"),
            spotify: self.link("spotify"),
            amazon: self.link("amazonMusic"),
            apple: self.link("appleMusic"),
        };
        enrichment.deezer_id = links.deezer.as_deref().and_then(|u| capture(NUMERIC_TRACK_ID.as_ref(), u));
        enrichment.tidal_id = links.tidal.as_deref().and_then(|u| capture(NUMERIC_TRACK_ID.as_ref(), u));
        enrichment.qobuz_id = links.qobuz.as_deref().and_then(|u| capture(NUMERIC_TRACK_ID.as_ref(), u));
        enrichment.spotify_id = links.spotify.as_deref().and_then(|u| capture(ALNUM_TRACK_ID.as_ref(), u));
        enrichment.external_links = links;

        enrichment
    }
}

/// Client song.link + Deezer avec cache des enrichissements
#[derive(Clone)]
pub struct Enricher {
    fetcher: HttpFetcher,
    odesli_base_url: String,
    deezer_base_url: String,
    cache: MokaCache<String, Enrichment>,
}

impl Enricher {
    pub fn new(
        fetcher: HttpFetcher,
        odesli_base_url: impl Into<String>,
        deezer_base_url: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            odesli_base_url: odesli_base_url.into().trim_end_matches('/').to_string(),
            deezer_base_url: deezer_base_url.into().trim_end_matches('/').to_string(),
            cache: MokaCache::builder()
                .max_capacity(ENRICHMENT_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Enrich `track`; any failure yields the track unchanged
    pub async fn enrich(&self, track: TrackMetadata) -> EnrichedTrack {
        if track.id.trim().is_empty() {
            warn!("enrich called without track id");
            return EnrichedTrack::unenriched(track);
        }

        if let Some(enrichment) = self.cache.get(&track.id).await {
            debug!("enrichment cache hit for {}", track.id);
            return EnrichedTrack { track, enrichment };
        }

        match self.lookup(&track.id).await {
            Ok(enrichment) => {
                if enrichment.has_facts() {
                    info!(
                        "enriched {}: isrc={:?}, {} links",
                        track.id,
                        enrichment.isrc,
                        enrichment.external_links.len()
                    );
                    self.cache.insert(track.id.clone(), enrichment.clone()).await;
                } else {
                    debug!("nothing found for {}, not cached", track.id);
                }
                EnrichedTrack { track, enrichment }
            }
            Err(e) => {
                warn!("enrichment of {} failed: {}", track.id, e);
                EnrichedTrack::unenriched(track)
            }
        }
    }

    async fn lookup(&self, video_id: &str) -> Result<Enrichment> {
        let odesli_url = Url::parse_with_params(
            &format!("{}/v1-alpha.1/links", self.odesli_base_url),
            &[("url", watch_url(video_id))],
        )?;
        let request = FetchRequest::get(odesli_url.as_str()).header("User-Agent", random_user_agent());
        let response: OdesliResponse = serde_json::from_value(self.fetcher.fetch_json(&request).await?)?;

        let mut enrichment = response.enrichment();
        if enrichment.isrc.is_none() {
            if let Some(deezer_id) = enrichment.deezer_id.clone() {
                enrichment.isrc = self.deezer_isrc(&deezer_id).await;
            }
        }
        Ok(enrichment)
    }

    /// Secondary ISRC lookup, failures only logged
    async fn deezer_isrc(&self, deezer_id: &str) -> Option<String> {
        let request = FetchRequest::get(format!("{}/track/{}", self.deezer_base_url, deezer_id))
            .header("User-Agent", random_user_agent());
        let value = match self.fetcher.fetch_json(&request).await {
            Ok(value) => value,
            Err(e) => {
                debug!("Deezer lookup of {} failed: {}", deezer_id, e);
                return None;
            }
        };
        let isrc = serde_json::from_value::<DeezerTrack>(value)
            .ok()
            .and_then(|track| filled(track.isrc));
        debug!("Deezer ISRC for {}: {:?}", deezer_id, isrc);
        isrc
    }
}
