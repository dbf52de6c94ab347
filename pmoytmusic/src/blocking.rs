//! Synchronous facade for callers that cannot await
//!
//! [`BlockingClient`] owns a private multi-thread runtime with one worker.
//! Background track loads started by [`BlockingClient::resolve_url`] keep
//! running on that worker between calls.
//!
//! Must not be used from inside another tokio runtime: `block_on` panics there.

use crate::client::YtMusicClient;
use crate::error::{Error, Result};
use crate::models::{
    AlbumMetadata, ArtistMetadata, EnrichedTrack, HomeFeedSectionMetadata, PlaylistMetadata,
    ResolvedUrl, SearchResult, TrackMetadata, ValidationOutcome,
};
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};

pub struct BlockingClient {
    runtime: Runtime,
    client: YtMusicClient,
}

impl BlockingClient {
    /// Blocking client with default settings
    pub fn new() -> Result<Self> {
        Self::with_client(YtMusicClient::new()?)
    }

    /// Wrap an already configured async client
    pub fn with_client(client: YtMusicClient) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pmoytmusic-blocking")
            .enable_all()
            .build()
            .map_err(|e| Error::other(format!("cannot start runtime: {}", e)))?;
        Ok(Self { runtime, client })
    }

    pub fn client(&self) -> &YtMusicClient {
        &self.client
    }

    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.runtime.block_on(self.client.search(query))
    }

    pub fn resolve_url(&self, url: &str) -> Option<ResolvedUrl> {
        self.runtime.block_on(self.client.resolve_url(url))
    }

    pub fn get_track(&self, video_id: &str) -> Option<TrackMetadata> {
        self.runtime.block_on(self.client.get_track(video_id))
    }

    pub fn get_album(&self, album_id: &str) -> Option<AlbumMetadata> {
        self.runtime.block_on(self.client.get_album(album_id))
    }

    pub fn get_playlist(&self, playlist_id: &str) -> Option<PlaylistMetadata> {
        self.runtime.block_on(self.client.get_playlist(playlist_id))
    }

    pub fn get_artist(&self, artist_id: &str) -> Option<ArtistMetadata> {
        self.runtime.block_on(self.client.get_artist(artist_id))
    }

    pub fn get_home_feed(&self) -> Vec<HomeFeedSectionMetadata> {
        self.runtime.block_on(self.client.get_home_feed())
    }

    pub fn enrich(&self, track: TrackMetadata) -> EnrichedTrack {
        self.runtime.block_on(self.client.enrich(track))
    }

    pub fn validate_for_external_call<T: Serialize>(&self, record: &T) -> ValidationOutcome {
        self.client.validate_for_external_call(record)
    }

    pub fn final_guard<T: Serialize>(&self, record: &T) -> bool {
        self.client.final_guard(record)
    }
}
