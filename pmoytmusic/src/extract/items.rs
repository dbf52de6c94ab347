//! Record assembly and candidate dispatch

use super::fields::{self, flex_column};
use super::renderer::Renderer;
use super::text::{is_noise, is_year, join_runs, non_empty, run_text, runs, BULLET_SEPARATOR};
use crate::models::{AlbumType, Collection, CollectionKind, SearchItem, Track, ARTIST_PREFIX, SOURCE_TAG};
use serde_json::Value;
use tracing::debug;

/// Build a track from a classified renderer
///
/// Only a node without both title and identifier is rejected; an id-less
/// track is dropped later by the sanitizer.
pub fn extract_track(renderer: &Renderer<'_>, thumbnail_size: u32) -> Option<Track> {
    let node = renderer.node;
    let title = fields::title(node);
    let id = fields::track_id(node);

    if title.is_none() && id.is_none() {
        debug!("{:?} node has neither title nor id", renderer.kind);
        return None;
    }

    Some(Track {
        id: id.unwrap_or_default(),
        title: title.unwrap_or_default(),
        artist: fields::artists(node),
        album: fields::album(node).unwrap_or_default(),
        duration: fields::duration(node),
        thumbnail: fields::thumbnail(node, thumbnail_size),
        source: SOURCE_TAG.to_string(),
    })
}

/// Subtitle of a collection node: second flex column, else subtitle runs
fn collection_subtitle(node: &Value) -> String {
    let from_column = join_runs(flex_column(node, 1), "");
    if !from_column.trim().is_empty() {
        return from_column;
    }
    join_runs(node.get("subtitle"), "")
}

/// Positional fields of a "Kind • Contributor • Year" subtitle
#[derive(Debug, Default, PartialEq, Eq)]
struct SubtitleFields {
    album_type: Option<AlbumType>,
    contributor: String,
    year: String,
}

fn split_subtitle(subtitle: &str) -> SubtitleFields {
    let parts: Vec<&str> = subtitle.split(BULLET_SEPARATOR).map(str::trim).collect();
    let mut fields = SubtitleFields {
        album_type: parts.first().and_then(|label| AlbumType::from_label(label)),
        ..Default::default()
    };

    if let Some(second) = parts.get(1) {
        if is_year(second) {
            fields.year = second.to_string();
        } else if !is_noise(second) {
            fields.contributor = second.to_string();
        }
    }
    if let Some(third) = parts.get(2) {
        if fields.year.is_empty() && is_year(third) {
            fields.year = third.to_string();
        }
    }
    fields
}

/// Build an album, playlist or artist from a classified renderer
///
/// The kind comes only from the prefix of the browse target; nodes without a
/// recognised target are rejected.
pub fn extract_collection(renderer: &Renderer<'_>, thumbnail_size: u32) -> Option<Collection> {
    let node = renderer.node;
    let id = fields::browse_target(node)?;
    let kind = CollectionKind::from_browse_id(&id)?;
    let title = fields::title(node)?;

    let subtitle = split_subtitle(&collection_subtitle(node));
    let (artist, album_type) = match kind {
        CollectionKind::Artist => (title.clone(), AlbumType::Artist),
        CollectionKind::Album => (
            subtitle.contributor,
            subtitle
                .album_type
                .filter(|t| *t != AlbumType::Playlist)
                .unwrap_or(AlbumType::Album),
        ),
        CollectionKind::Playlist => (subtitle.contributor, AlbumType::Playlist),
    };

    debug!("collection {} ({}) {:?}", id, kind.as_str(), title);
    Some(Collection {
        id,
        title,
        artist,
        kind,
        album_type,
        year: subtitle.year,
        thumbnail: fields::thumbnail(node, thumbnail_size),
    })
}

fn card_browse_id(card: &Value) -> Option<String> {
    let from_title = card
        .pointer("/title/runs/0/navigationEndpoint/browseEndpoint/browseId")
        .and_then(Value::as_str);
    let from_tap = card
        .pointer("/onTap/browseEndpoint/browseId")
        .and_then(Value::as_str);
    let from_buttons = || {
        card.get("buttons")
            .and_then(Value::as_array)?
            .iter()
            .find_map(|button| button.pointer("/buttonRenderer/navigationEndpoint/browseEndpoint/browseId"))
            .and_then(Value::as_str)
    };
    from_title.or(from_tap).or_else(from_buttons).and_then(non_empty)
}

/// Featured artist card (`musicCardShelfRenderer` inner node)
///
/// Accepted only when it points to an artist channel.
pub fn extract_artist_card(card: &Value, thumbnail_size: u32) -> Option<Collection> {
    let id = card_browse_id(card)?;
    if !id.starts_with(ARTIST_PREFIX) {
        debug!("card shelf {} is not an artist", id);
        return None;
    }
    let title = runs(card.get("title")).first().and_then(run_text).and_then(non_empty)?;

    Some(Collection {
        id,
        artist: title.clone(),
        title,
        kind: CollectionKind::Artist,
        album_type: AlbumType::Artist,
        year: String::new(),
        thumbnail: fields::thumbnail_at(
            card,
            "/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
            thumbnail_size,
        ),
    })
}

/// Classify a walker candidate: artist card, then collection, then track
pub fn extract_search_item(candidate: &Value, thumbnail_size: u32) -> Option<SearchItem> {
    let renderer = Renderer::classify(candidate);

    if renderer.is_card_shelf() {
        return extract_artist_card(renderer.node, thumbnail_size).map(SearchItem::Collection);
    }
    if let Some(collection) = extract_collection(&renderer, thumbnail_size) {
        return Some(SearchItem::Collection(collection));
    }
    extract_track(&renderer, thumbnail_size).map(SearchItem::Track)
}
