//! Artist page parsing
//!
//! Shelves are told apart by their title: a list shelf whose title mentions
//! songs, top or popular holds the top tracks, carousels hold albums and
//! playlists. Titles are matched in English only.

use super::sections;
use crate::extract::fields;
use crate::extract::text::{join_runs, non_empty};
use crate::extract::{extract_collection, extract_track, Renderer};
use crate::models::{ArtistPage, Collection, CollectionKind};
use crate::walker::{collect_candidates, MAX_CANDIDATES};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Title keywords of the top tracks shelf
pub const TOP_SONGS_KEYWORDS: &[&str] = &["song", "top", "popular"];

const HEADER_KINDS: &[&str] = &[
    "musicImmersiveHeaderRenderer",
    "musicVisualHeaderRenderer",
    "musicDetailHeaderRenderer",
    "musicResponsiveHeaderRenderer",
];

fn is_top_songs_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    TOP_SONGS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn is_discography(collection: &Collection) -> bool {
    matches!(collection.kind, CollectionKind::Album | CollectionKind::Playlist)
}

fn parse_artist_header(data: &Value, size: u32) -> (String, Option<String>) {
    let Some(header) = HEADER_KINDS
        .iter()
        .find_map(|kind| data.pointer("/header")?.get(*kind))
    else {
        return (String::new(), None);
    };

    let name = non_empty(&join_runs(header.get("title"), "")).unwrap_or_default();
    let image = fields::thumbnail_at(
        header,
        "/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
        size,
    )
    .or_else(|| {
        fields::thumbnail_at(
            header,
            "/foregroundThumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
            size,
        )
    });
    (name, image)
}

/// Parse an artist `browse` response
///
/// Returns `None` only when the response is not a JSON object.
pub fn parse_artist_response(data: &Value, artist_id: &str, thumbnail_size: u32) -> Option<ArtistPage> {
    if !data.is_object() {
        return None;
    }

    let (name, image) = parse_artist_header(data, thumbnail_size);
    let mut page = ArtistPage {
        id: artist_id.to_string(),
        name,
        image,
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for section in sections(data) {
        if let Some(shelf) = section.get("musicShelfRenderer") {
            let title = join_runs(shelf.get("title"), "");
            if page.top_tracks.is_empty() && is_top_songs_title(&title) {
                page.top_tracks = shelf
                    .get("contents")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(|item| extract_track(&Renderer::classify(item), thumbnail_size))
                    .filter(|track| !track.id.is_empty())
                    .collect();
                debug!("top tracks shelf {:?}: {} tracks", title, page.top_tracks.len());
            }
        } else if let Some(carousel) = section.get("musicCarouselShelfRenderer") {
            let items = carousel.get("contents").and_then(Value::as_array).into_iter().flatten();
            for collection in items
                .filter_map(|item| extract_collection(&Renderer::classify(item), thumbnail_size))
                .filter(is_discography)
            {
                if seen.insert(collection.id.clone()) {
                    page.collections.push(collection);
                }
            }
        }
    }

    if page.collections.is_empty() {
        debug!("no carousel for {}, scanning the whole page", artist_id);
        if let Some(contents) = data.get("contents") {
            for collection in collect_candidates(contents, MAX_CANDIDATES)
                .into_iter()
                .filter_map(|c| extract_collection(&Renderer::classify(c), thumbnail_size))
                .filter(is_discography)
            {
                if seen.insert(collection.id.clone()) {
                    page.collections.push(collection);
                }
            }
        }
    }

    for track in &mut page.top_tracks {
        if track.artist.is_empty() {
            track.artist = page.name.clone();
        }
    }
    for collection in &mut page.collections {
        if collection.artist.is_empty() {
            collection.artist = page.name.clone();
        }
    }

    Some(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tile(id: &str, title: &str, subtitle: &str) -> Value {
        json!({ "musicTwoRowItemRenderer": {
            "title": { "runs": [{ "text": title }] },
            "subtitle": { "runs": [{ "text": subtitle }] },
            "navigationEndpoint": { "browseEndpoint": { "browseId": id } }
        } })
    }

    fn song(id: &str, title: &str) -> Value {
        json!({ "musicResponsiveListItemRenderer": {
            "flexColumns": [
                { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [{ "text": title }] } } }
            ],
            "playlistItemData": { "videoId": id }
        } })
    }

    fn artist_page(sections: Vec<Value>) -> Value {
        json!({
            "header": { "musicImmersiveHeaderRenderer": {
                "title": { "runs": [{ "text": "ABBA" }] },
                "thumbnail": { "musicThumbnailRenderer": { "thumbnail": { "thumbnails": [
                    { "url": "https://lh3.googleusercontent.com/a=w540-h225-p-l90-rj" }
                ] } } }
            } },
            "contents": { "singleColumnBrowseResultsRenderer": { "tabs": [{ "tabRenderer": { "content": {
                "sectionListRenderer": { "contents": sections }
            } } }] } }
        })
    }

    #[test]
    fn test_artist_page() {
        let data = artist_page(vec![
            json!({ "musicShelfRenderer": {
                "title": { "runs": [{ "text": "Top songs" }] },
                "contents": [song("s1", "Dancing Queen"), song("s2", "Mamma Mia")]
            } }),
            json!({ "musicCarouselShelfRenderer": { "contents": [
                tile("MPREb_arrival", "Arrival", "Album • 1976"),
                tile("MPREb_voyage", "Voyage", "Album • 2021"),
                tile("UCother", "Other Artist", "1M subscribers")
            ] } }),
            json!({ "musicCarouselShelfRenderer": { "contents": [
                tile("MPREb_arrival", "Arrival", "Album • 1976")
            ] } })
        ]);

        let page = parse_artist_response(&data, "UCabba", 512).unwrap();
        assert_eq!(page.name, "ABBA");
        assert_eq!(
            page.image.as_deref(),
            Some("https://lh3.googleusercontent.com/a=w512-h512-p-l90-rj")
        );
        assert_eq!(page.top_tracks.len(), 2);
        assert_eq!(page.top_tracks[0].artist, "ABBA");
        let ids: Vec<_> = page.collections.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["MPREb_arrival", "MPREb_voyage"]);
        assert_eq!(page.collections[0].year, "1976");
        assert_eq!(page.collections[0].artist, "ABBA");
    }

    #[test]
    fn test_localized_shelf_title_is_missed() {
        let data = artist_page(vec![json!({ "musicShelfRenderer": {
            "title": { "runs": [{ "text": "Titres" }] },
            "contents": [song("s1", "Waterloo")]
        } })]);
        let page = parse_artist_response(&data, "UCabba", 512).unwrap();
        assert!(page.top_tracks.is_empty());
    }

    #[test]
    fn test_full_scan_fallback() {
        let data = json!({ "contents": { "gridRenderer": { "items": [
            tile("MPREb_x", "X", "Single • 2020")
        ] } } });
        let page = parse_artist_response(&data, "UCabba", 512).unwrap();
        assert_eq!(page.collections.len(), 1);
        assert_eq!(page.name, "");
    }
}
