//! Conversion of extracted records into the host output contract
//!
//! Every record leaving the crate goes through this module. Whatever the
//! extractors produced, the output obeys two rules:
//!
//! - a record whose id is empty after trimming is dropped;
//! - URL fields are either a normalized absolute http(s) URL or `None`.
//!
//! [`strip_url_like_fields`] is a second, name-based pass applied to search
//! results on top of the typed conversion. [`validate_for_external_call`]
//! checks arbitrary JSON records before they reach a native download call.

use crate::media::{is_absolute_http_url, normalize_opt, normalize_url};
use crate::models::{
    AlbumMetadata, ArtistMetadata, ArtistPage, BrowseResult, Collection,
    CollectionHeader, CollectionMetadata, HomeFeedItemMetadata, HomeFeedSection,
    HomeFeedSectionMetadata, ItemType, PlaylistMetadata, SearchItem, SearchResult, Track,
    TrackMetadata, ValidationOutcome, PROVIDER_ID,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

/// Default name of a track without title
pub const UNKNOWN_TRACK_TITLE: &str = "Unknown title";

/// Default name of a collection without title
pub const UNKNOWN_COLLECTION_TITLE: &str = "Unknown";

/// Fields inspected by [`validate_for_external_call`]
pub const VALIDATED_URL_FIELDS: &[&str] = &[
    "downloadUrl",
    "coverUrl",
    "thumbnail",
    "url",
    "uri",
    "cover_url",
    "download_url",
];

static URL_LIKE_KEY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)url|uri|link|cover|download|thumbnail").ok());

fn trimmed_id(id: &str) -> Option<String> {
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

fn or_default(text: &str, default: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        default.to_string()
    } else {
        text.to_string()
    }
}

/// Convert an extracted track, `None` when its id is blank
pub fn sanitize_track(track: &Track) -> Option<TrackMetadata> {
    let Some(id) = trimmed_id(&track.id) else {
        debug!("dropping track {:?} without id", track.title);
        return None;
    };

    Some(TrackMetadata {
        id,
        name: or_default(&track.title, UNKNOWN_TRACK_TITLE),
        artists: track.artist.trim().to_string(),
        album_name: track.album.trim().to_string(),
        duration_ms: u64::from(track.duration) * 1000,
        cover_url: normalize_opt(track.thumbnail.as_deref()),
        provider_id: PROVIDER_ID.to_string(),
        item_type: ItemType::Track,
    })
}

/// Convert an extracted album, playlist or artist, `None` when its id is blank
pub fn sanitize_collection(collection: &Collection) -> Option<CollectionMetadata> {
    let Some(id) = trimmed_id(&collection.id) else {
        debug!("dropping collection {:?} without id", collection.title);
        return None;
    };
    let name = or_default(&collection.title, UNKNOWN_COLLECTION_TITLE);

    Some(CollectionMetadata {
        id,
        album_name: name.clone(),
        name,
        artists: collection.artist.trim().to_string(),
        album_type: collection.album_type,
        release_date: collection.year.clone(),
        cover_url: normalize_opt(collection.thumbnail.as_deref()),
        provider_id: PROVIDER_ID.to_string(),
        item_type: collection.kind.into(),
    })
}

pub fn sanitize_search_item(item: &SearchItem) -> Option<SearchResult> {
    match item {
        SearchItem::Track(track) => sanitize_track(track).map(SearchResult::Track),
        SearchItem::Collection(collection) => {
            sanitize_collection(collection).map(SearchResult::Collection)
        }
    }
}

/// Null every top-level URL-like field that is not an absolute http(s) URL
///
/// Field names are matched case-insensitively against
/// `url|uri|link|cover|download|thumbnail`; valid URLs are renormalized.
/// Non-object values are returned unchanged.
pub fn strip_url_like_fields(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let Some(pattern) = URL_LIKE_KEY.as_ref() else {
        return Value::Object(map);
    };

    let stripped: Map<String, Value> = map
        .into_iter()
        .map(|(key, v)| {
            if !pattern.is_match(&key) {
                return (key, v);
            }
            let kept = v
                .as_str()
                .filter(|s| is_absolute_http_url(s))
                .and_then(normalize_url)
                .map(Value::String)
                .unwrap_or(Value::Null);
            (key, kept)
        })
        .collect();
    Value::Object(stripped)
}

/// Run a typed record through [`strip_url_like_fields`]
///
/// The record is dropped if it no longer deserializes afterwards.
pub fn harden<T: Serialize + DeserializeOwned>(record: T) -> Option<T> {
    let value = match serde_json::to_value(&record) {
        Ok(value) => value,
        Err(e) => {
            warn!("cannot serialize record: {}", e);
            return None;
        }
    };
    match serde_json::from_value(strip_url_like_fields(value)) {
        Ok(hardened) => Some(hardened),
        Err(e) => {
            warn!("record rejected by URL field filter: {}", e);
            None
        }
    }
}

/// Sanitize and harden a list of search items, order preserved
pub fn sanitize_search_results(items: &[SearchItem]) -> Vec<SearchResult> {
    items
        .iter()
        .filter_map(sanitize_search_item)
        .filter_map(harden)
        .collect()
}

fn sanitize_tracks(tracks: &[Track]) -> Vec<TrackMetadata> {
    tracks.iter().filter_map(sanitize_track).collect()
}

/// Header of a resolved album or playlist, `None` when the id is blank
pub fn sanitize_header(result: &BrowseResult) -> Option<CollectionHeader> {
    let id = trimmed_id(&result.id)?;
    let header = &result.header;
    Some(CollectionHeader {
        id,
        name: or_default(&header.name, UNKNOWN_COLLECTION_TITLE),
        artists: header.artists.trim().to_string(),
        artist_id: header.artist_id.clone(),
        cover_url: normalize_opt(header.cover.as_deref()),
        release_date: header.release_date.clone(),
        total_tracks: result.tracks.iter().filter(|t| !t.id.trim().is_empty()).count(),
        album_type: header.album_type,
    })
}

pub fn sanitize_album(result: &BrowseResult) -> Option<AlbumMetadata> {
    let header = sanitize_header(result)?;
    let tracks = sanitize_tracks(&result.tracks);
    Some(AlbumMetadata {
        id: header.id,
        name: header.name,
        artists: header.artists,
        artist_id: header.artist_id,
        cover_url: header.cover_url,
        release_date: header.release_date,
        total_tracks: tracks.len(),
        album_type: header.album_type,
        tracks,
        provider_id: PROVIDER_ID.to_string(),
    })
}

/// Playlist output keyed by `playlist_id`, the id the host asked for
///
/// The browse id may carry a `VL` prefix added for the request.
pub fn sanitize_playlist(result: &BrowseResult, playlist_id: &str) -> Option<PlaylistMetadata> {
    let id = trimmed_id(playlist_id)?;
    let tracks = sanitize_tracks(&result.tracks);
    Some(PlaylistMetadata {
        id,
        name: or_default(&result.header.name, UNKNOWN_COLLECTION_TITLE),
        owner: result.header.artists.trim().to_string(),
        cover_url: normalize_opt(result.header.cover.as_deref()),
        total_tracks: tracks.len(),
        tracks,
        provider_id: PROVIDER_ID.to_string(),
    })
}

pub fn sanitize_artist(page: &ArtistPage) -> Option<ArtistMetadata> {
    let id = trimmed_id(&page.id)?;
    Some(ArtistMetadata {
        id,
        name: or_default(&page.name, UNKNOWN_COLLECTION_TITLE),
        image_url: normalize_opt(page.image.as_deref()),
        top_tracks: sanitize_tracks(&page.top_tracks),
        albums: page
            .collections
            .iter()
            .filter_map(sanitize_collection)
            .collect(),
        provider_id: PROVIDER_ID.to_string(),
    })
}

fn home_item(item: &SearchItem) -> Option<HomeFeedItemMetadata> {
    let (id, name, artists, cover_url, item_type) = match sanitize_search_item(item)? {
        SearchResult::Track(t) => (t.id, t.name, t.artists, t.cover_url, t.item_type),
        SearchResult::Collection(c) => (c.id, c.name, c.artists, c.cover_url, c.item_type),
    };
    Some(HomeFeedItemMetadata {
        uri: format!("{}:{}:{}", PROVIDER_ID, item_type.as_str(), id),
        id,
        name,
        artists,
        cover_url,
        item_type,
    })
}

/// Sanitize home feed sections, sections left empty are dropped
pub fn sanitize_home_feed(sections: &[HomeFeedSection]) -> Vec<HomeFeedSectionMetadata> {
    sections
        .iter()
        .filter_map(|section| {
            let items: Vec<_> = section.items.iter().filter_map(home_item).collect();
            (!items.is_empty()).then(|| HomeFeedSectionMetadata {
                title: section.title.clone(),
                items,
            })
        })
        .collect()
}

fn id_is_blank(id: Option<&Value>) -> bool {
    match id {
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Number(_)) => false,
        _ => true,
    }
}

/// Pre-flight check of a record about to be handed to a native call
///
/// Reasons: `invalid_track`, `missing_id`, `<field>_empty`, `<field>_invalid`.
/// Absent and null URL fields are accepted.
pub fn validate_for_external_call(record: &Value) -> ValidationOutcome {
    let Some(map) = record.as_object() else {
        return ValidationOutcome::rejected("invalid_track");
    };
    if id_is_blank(map.get("id")) {
        return ValidationOutcome::rejected("missing_id");
    }

    for key in VALIDATED_URL_FIELDS {
        match map.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => {
                return ValidationOutcome::rejected(format!("{key}_empty"));
            }
            Some(Value::String(s)) if is_absolute_http_url(s) => continue,
            Some(_) => return ValidationOutcome::rejected(format!("{key}_invalid")),
        }
    }
    ValidationOutcome::accepted()
}

/// [`validate_for_external_call`] as a gate, logging blocked records
pub fn final_guard(record: &Value) -> bool {
    let outcome = validate_for_external_call(record);
    if outcome.ok {
        return true;
    }

    let offending: Map<String, Value> = record
        .as_object()
        .map(|map| {
            VALIDATED_URL_FIELDS
                .iter()
                .filter_map(|key| map.get(*key).map(|v| (key.to_string(), v.clone())))
                .collect()
        })
        .unwrap_or_default();
    let offending = Value::Object(offending);
    let reason = outcome.reason.as_deref().unwrap_or_default();
    error!(
        reason,
        id = ?record.get("id"),
        "native call blocked: {}",
        offending
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlbumType, BrowseHeader, CollectionKind, SOURCE_TAG};
    use serde_json::json;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: "Dancing Queen".into(),
            artist: "ABBA".into(),
            album: "Arrival".into(),
            duration: 231,
            thumbnail: Some("https://lh3.googleusercontent.com/x=w512-h512".into()),
            source: SOURCE_TAG.into(),
        }
    }

    fn collection(id: &str, kind: CollectionKind) -> Collection {
        Collection {
            id: id.to_string(),
            title: "Arrival".into(),
            artist: "ABBA".into(),
            kind,
            album_type: AlbumType::for_kind(kind),
            year: "1976".into(),
            thumbnail: Some("not a url".into()),
        }
    }

    #[test]
    fn test_sanitize_track() {
        let out = sanitize_track(&track("  abc ")).unwrap();
        assert_eq!(out.id, "abc");
        assert_eq!(out.name, "Dancing Queen");
        assert_eq!(out.duration_ms, 231_000);
        assert_eq!(out.item_type, ItemType::Track);
        assert_eq!(out.provider_id, "ytmusic");
        assert!(out.cover_url.unwrap().starts_with("https://"));
    }

    #[test]
    fn test_blank_id_is_dropped() {
        for id in ["", "   ", "\t"] {
            assert!(sanitize_track(&track(id)).is_none());
            assert!(sanitize_collection(&collection(id, CollectionKind::Album)).is_none());
        }
    }

    #[test]
    fn test_defaults_and_invalid_cover() {
        let mut t = track("abc");
        t.title = " ".into();
        t.thumbnail = Some("/relative.jpg".into());
        let out = sanitize_track(&t).unwrap();
        assert_eq!(out.name, UNKNOWN_TRACK_TITLE);
        assert_eq!(out.cover_url, None);

        let c = sanitize_collection(&collection("MPREb_a", CollectionKind::Album)).unwrap();
        assert_eq!(c.album_name, "Arrival");
        assert_eq!(c.release_date, "1976");
        assert_eq!(c.cover_url, None);
        assert_eq!(c.item_type, ItemType::Album);
    }

    #[test]
    fn test_strip_url_like_fields() {
        let stripped = strip_url_like_fields(json!({
            "id": "x",
            "cover_url": "ftp://example.com/a.jpg",
            "downloadUrl": "",
            "Thumbnail": "https://example.com/t.jpg",
            "external_link": 42,
            "name": "relative/path"
        }));
        assert_eq!(stripped["cover_url"], Value::Null);
        assert_eq!(stripped["downloadUrl"], Value::Null);
        assert_eq!(stripped["Thumbnail"], "https://example.com/t.jpg");
        assert_eq!(stripped["external_link"], Value::Null);
        assert_eq!(stripped["name"], "relative/path");
        assert_eq!(strip_url_like_fields(json!([1])), json!([1]));
    }

    #[test]
    fn test_search_results_keep_variant() {
        let items = vec![
            SearchItem::Track(track("v1")),
            SearchItem::Collection(collection("MPREb_a", CollectionKind::Album)),
            SearchItem::Track(track(" ")),
        ];
        let results = sanitize_search_results(&items);
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], SearchResult::Track(_)));
        assert!(matches!(results[1], SearchResult::Collection(_)));
        assert_eq!(results[1].item_type(), ItemType::Album);
    }

    #[test]
    fn test_album_and_playlist() {
        let result = BrowseResult {
            id: "VLPLabc".into(),
            header: BrowseHeader {
                name: "Road trip".into(),
                artists: "Someone".into(),
                album_type: AlbumType::Playlist,
                ..Default::default()
            },
            tracks: vec![track("v1"), track(""), track("v2")],
        };
        let playlist = sanitize_playlist(&result, "PLabc").unwrap();
        assert_eq!(playlist.id, "PLabc");
        assert_eq!(playlist.owner, "Someone");
        assert_eq!(playlist.total_tracks, 2);

        let album = sanitize_album(&result).unwrap();
        assert_eq!(album.id, "VLPLabc");
        assert_eq!(album.total_tracks, 2);
    }

    #[test]
    fn test_home_feed_uri() {
        let sections = vec![
            HomeFeedSection {
                title: "Quick picks".into(),
                items: vec![
                    SearchItem::Track(track("v1")),
                    SearchItem::Collection(collection("VLPLx", CollectionKind::Playlist)),
                ],
            },
            HomeFeedSection {
                title: "Nothing valid".into(),
                items: vec![SearchItem::Track(track(""))],
            },
        ];
        let feed = sanitize_home_feed(&sections);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].items[0].uri, "ytmusic:track:v1");
        assert_eq!(feed[0].items[1].uri, "ytmusic:playlist:VLPLx");
    }

    #[test]
    fn test_validate_reasons() {
        let reason = |v: Value| validate_for_external_call(&v).reason;
        assert_eq!(reason(json!("str")), Some("invalid_track".into()));
        assert_eq!(reason(json!({ "id": "  " })), Some("missing_id".into()));
        assert_eq!(reason(json!({ "name": "x" })), Some("missing_id".into()));
        assert_eq!(
            reason(json!({ "id": "a", "coverUrl": "" })),
            Some("coverUrl_empty".into())
        );
        assert_eq!(
            reason(json!({ "id": "a", "thumbnail": "/img.jpg" })),
            Some("thumbnail_invalid".into())
        );
        assert_eq!(
            reason(json!({ "id": "a", "cover_url": 3 })),
            Some("cover_url_invalid".into())
        );
        assert!(validate_for_external_call(&json!({ "id": 12, "url": null })).ok);
        assert!(
            validate_for_external_call(&json!({ "id": "a", "uri": "https://music.youtube.com/watch?v=a" }))
                .ok
        );
    }

    #[test]
    fn test_final_guard() {
        assert!(final_guard(&json!({ "id": "a" })));
        assert!(!final_guard(&json!({ "id": "a", "downloadUrl": "" })));
        assert!(!final_guard(&Value::Null));
        assert!(!final_guard(&json!({ "id": 7, "coverUrl": "ftp://x/y.jpg", "url": "https://a.b/c" })));
    }
}
