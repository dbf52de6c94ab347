//! Album and playlist page parsing
//!
//! Header metadata is gathered from several sources, highest priority first;
//! a field set by one source is never overwritten by a later one:
//!
//! 1. a structured header renderer (detail, responsive, immersive, visual);
//! 2. the page background thumbnail;
//! 3. the microformat title `"<name> - <Kind> by <artist>"` and description;
//! 4. `musicAlbumRelease` entity mutations.
//!
//! Tracks come from the first track shelf only, so "related" carousels are
//! left out.

use super::section_list;
use crate::extract::fields::{self, contributors_from_runs, run_link, RunLink};
use crate::extract::text::{is_year, join_runs, non_empty, run_text, runs, BULLET_SEPARATOR};
use crate::extract::{extract_track, Renderer};
use crate::models::{AlbumType, BrowseHeader, BrowseResult, ALBUM_PREFIX, ARTIST_PREFIX};
use crate::walker::{collect_candidates, collect_first_shelf, MAX_CANDIDATES};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static MICROFORMAT_TITLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s*-\s*(Album|Single|EP|Playlist)\s+by\s+(.+)$").ok());

/// Browse ids whose pages are always playlists
const PLAYLIST_PAGE_PREFIXES: &[&str] = &["VL", "PL", "RDCLAK5uy_"];

const HEADER_PATHS: &[&str] = &[
    "/header",
    "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/header",
    "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/header",
];

/// Header being assembled; setters only fill empty fields
#[derive(Debug, Default)]
struct HeaderDraft {
    name: String,
    artists: String,
    artist_id: Option<String>,
    cover: Option<String>,
    release_date: String,
    album_type: Option<AlbumType>,
}

impl HeaderDraft {
    fn name(&mut self, value: Option<String>) {
        if self.name.is_empty() {
            if let Some(v) = value.as_deref().and_then(non_empty) {
                self.name = v;
            }
        }
    }

    fn artists(&mut self, value: Option<String>) {
        if self.artists.is_empty() {
            if let Some(v) = value.as_deref().and_then(non_empty) {
                self.artists = v;
            }
        }
    }

    fn artist_id(&mut self, value: Option<String>) {
        if self.artist_id.is_none() {
            self.artist_id = value;
        }
    }

    fn cover(&mut self, value: Option<String>) {
        if self.cover.is_none() {
            self.cover = value;
        }
    }

    fn release_date(&mut self, value: Option<String>) {
        if self.release_date.is_empty() {
            if let Some(v) = value {
                self.release_date = v;
            }
        }
    }

    fn album_type(&mut self, value: Option<AlbumType>) {
        if self.album_type.is_none() {
            self.album_type = value;
        }
    }

    /// Type label and year found in a subtitle run sequence
    fn subtitle(&mut self, subtitle: Option<&Value>) {
        let texts: Vec<&str> = runs(subtitle)
            .iter()
            .filter_map(run_text)
            .flat_map(|text| text.split(BULLET_SEPARATOR))
            .map(str::trim)
            .collect();
        self.album_type(texts.iter().find_map(|t| AlbumType::from_label(t)));
        self.release_date(texts.iter().find(|t| is_year(t)).map(|t| t.to_string()));
    }

    fn contributors(&mut self, field: Option<&Value>) {
        let names = contributors_from_runs(runs(field));
        if !names.is_empty() {
            self.artists(Some(names.join(", ")));
        }
        self.artist_id(runs(field).iter().find_map(|run| match run_link(run) {
            RunLink::Channel(id) => Some(id.to_string()),
            _ => None,
        }));
    }
}

fn structured_header(data: &Value) -> Option<&Value> {
    HEADER_PATHS.iter().find_map(|path| data.pointer(path))
}

/// `musicResponsiveHeaderRenderer` sits in the first section of the tab
fn responsive_header(data: &Value) -> Option<&Value> {
    structured_header(data)
        .and_then(|h| h.get("musicResponsiveHeaderRenderer"))
        .or_else(|| {
            section_list(data)?
                .get("contents")?
                .as_array()?
                .iter()
                .find_map(|section| section.get("musicResponsiveHeaderRenderer"))
        })
}

fn apply_structured_header(draft: &mut HeaderDraft, data: &Value, size: u32) {
    if let Some(h) = responsive_header(data) {
        debug!("musicResponsiveHeaderRenderer header");
        draft.name(non_empty(&join_runs(h.get("title"), "")));
        draft.contributors(h.get("straplineTextOne"));
        draft.subtitle(h.get("subtitle"));
        draft.cover(fields::thumbnail_at(
            h,
            "/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
            size,
        ));
    }

    let Some(header) = structured_header(data) else {
        return;
    };

    if let Some(h) = header.get("musicDetailHeaderRenderer") {
        debug!("musicDetailHeaderRenderer header");
        draft.name(non_empty(&join_runs(h.get("title"), "")));
        draft.contributors(h.get("subtitle"));
        draft.subtitle(h.get("subtitle"));
        draft.cover(
            fields::thumbnail_at(h, "/thumbnail/croppedSquareThumbnailRenderer/thumbnail/thumbnails", size)
                .or_else(|| fields::thumbnail_at(h, "/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails", size)),
        );
    }
    if let Some(h) = header.get("musicImmersiveHeaderRenderer") {
        debug!("musicImmersiveHeaderRenderer header");
        draft.name(non_empty(&join_runs(h.get("title"), "")));
        draft.artists(non_empty(&join_runs(h.get("description"), "")));
        draft.cover(fields::thumbnail_at(
            h,
            "/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
            size,
        ));
        draft.album_type(Some(AlbumType::Playlist));
    }
    if let Some(h) = header.get("musicVisualHeaderRenderer") {
        debug!("musicVisualHeaderRenderer header");
        draft.name(non_empty(&join_runs(h.get("title"), "")));
        draft.cover(fields::thumbnail_at(
            h,
            "/foregroundThumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
            size,
        ));
    }
}

fn apply_microformat(draft: &mut HeaderDraft, data: &Value) {
    let Some(mf) = data.pointer("/microformat/microformatDataRenderer") else {
        return;
    };

    if let Some(title) = mf.get("title").and_then(Value::as_str) {
        let captures = MICROFORMAT_TITLE.as_ref().and_then(|re| re.captures(title));
        match captures {
            Some(caps) => {
                draft.name(caps.get(1).map(|m| m.as_str().to_string()));
                draft.artists(caps.get(3).map(|m| m.as_str().to_string()));
                draft.album_type(caps.get(2).and_then(|m| AlbumType::from_label(m.as_str())));
            }
            None => draft.name(Some(title.to_string())),
        }
    }

    if let Some(description) = mf.get("description").and_then(Value::as_str) {
        let parts: Vec<&str> = description.split(BULLET_SEPARATOR).map(str::trim).collect();
        if parts.len() >= 2 {
            let artist = if AlbumType::from_label(parts[0]).is_some() {
                parts[1]
            } else {
                parts[0]
            };
            draft.artists(Some(artist.to_string()));
        }
    }
}

fn apply_mutations(draft: &mut HeaderDraft, data: &Value) {
    let Some(mutations) = data
        .pointer("/frameworkUpdates/entityBatchUpdate/mutations")
        .and_then(Value::as_array)
    else {
        return;
    };

    for release in mutations
        .iter()
        .filter_map(|m| m.pointer("/payload/musicAlbumRelease"))
    {
        draft.name(release.get("title").and_then(Value::as_str).map(str::to_string));
        draft.artists(
            release
                .get("artistDisplayName")
                .and_then(Value::as_str)
                .map(str::to_string),
        );
    }
}

fn parse_header(data: &Value, size: u32) -> HeaderDraft {
    let mut draft = HeaderDraft::default();
    apply_structured_header(&mut draft, data, size);
    draft.cover(fields::thumbnail_at(
        data,
        "/background/musicThumbnailRenderer/thumbnail/thumbnails",
        size,
    ));
    apply_microformat(&mut draft, data);
    apply_mutations(&mut draft, data);
    draft
}

/// Parse a browse response for an album or playlist
///
/// Returns `None` only when the response is not a JSON object.
pub fn parse_browse_response(data: &Value, browse_id: &str, thumbnail_size: u32) -> Option<BrowseResult> {
    if !data.is_object() {
        return None;
    }

    let draft = parse_header(data, thumbnail_size);
    let contents = data.get("contents");

    let mut candidates = contents.map(collect_first_shelf).unwrap_or_default();
    if candidates.is_empty() {
        debug!("no track shelf in {}, scanning contents", browse_id);
        candidates = contents
            .map(|c| collect_candidates(c, MAX_CANDIDATES))
            .unwrap_or_default();
    }

    let tracks: Vec<_> = candidates
        .into_iter()
        .filter_map(|candidate| extract_track(&Renderer::classify(candidate), thumbnail_size))
        .map(|mut track| {
            if track.album.is_empty() {
                track.album = draft.name.clone();
            }
            if track.artist.is_empty() {
                track.artist = draft.artists.clone();
            }
            track
        })
        .collect();

    let cover = draft
        .cover
        .or_else(|| tracks.first().and_then(|t| t.thumbnail.clone()));

    let album_type = if PLAYLIST_PAGE_PREFIXES.iter().any(|p| browse_id.starts_with(p)) {
        AlbumType::Playlist
    } else if browse_id.starts_with(ALBUM_PREFIX) {
        draft
            .album_type
            .filter(|t| *t != AlbumType::Playlist)
            .unwrap_or(AlbumType::Album)
    } else {
        draft.album_type.unwrap_or(AlbumType::Album)
    };

    let artist_id = draft.artist_id.filter(|id| id.starts_with(ARTIST_PREFIX));

    debug!(
        "browse {}: {:?} by {:?}, {} tracks",
        browse_id,
        draft.name,
        draft.artists,
        tracks.len()
    );

    Some(BrowseResult {
        id: browse_id.to_string(),
        header: BrowseHeader {
            name: draft.name,
            artists: draft.artists,
            artist_id,
            cover,
            release_date: draft.release_date,
            album_type,
        },
        tracks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn album_row(id: &str, title: &str) -> Value {
        json!({ "musicResponsiveListItemRenderer": {
            "flexColumns": [
                { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [{ "text": title }] } } },
                { "musicResponsiveListItemFlexColumnRenderer": { "text": {} } }
            ],
            "fixedColumns": [
                { "musicResponsiveListItemFixedColumnRenderer": { "text": { "runs": [{ "text": "3:20" }] } } }
            ],
            "playlistItemData": { "videoId": id }
        } })
    }

    fn two_column(shelf_items: Vec<Value>, related: Vec<Value>) -> Value {
        json!({ "twoColumnBrowseResultsRenderer": { "secondaryContents": { "sectionListRenderer": { "contents": [
            { "musicShelfRenderer": { "contents": shelf_items } },
            { "musicCarouselShelfRenderer": { "contents": related } }
        ] } } } })
    }

    #[test]
    fn test_microformat_only_header() {
        let data = json!({
            "contents": two_column(vec![album_row("t1", "Lavender Haze"), album_row("t2", "Maroon")], vec![]),
            "microformat": { "microformatDataRenderer": {
                "title": "Midnights - Album by Taylor Swift",
                "description": "Album • Taylor Swift • 2022"
            } }
        });
        let result = parse_browse_response(&data, "MPREb_mid", 512).unwrap();
        assert_eq!(result.header.name, "Midnights");
        assert_eq!(result.header.artists, "Taylor Swift");
        assert_eq!(result.header.album_type, AlbumType::Album);
        assert_eq!(result.tracks.len(), 2);
        assert_eq!(result.tracks[0].album, "Midnights");
        assert_eq!(result.tracks[0].artist, "Taylor Swift");
        assert_eq!(result.tracks[0].duration, 200);
    }

    #[test]
    fn test_related_shelf_excluded() {
        let related = json!({ "musicTwoRowItemRenderer": {
            "title": { "runs": [{ "text": "Other album" }] },
            "navigationEndpoint": { "browseEndpoint": { "browseId": "MPREb_other" } }
        } });
        let data = json!({ "contents": two_column(vec![album_row("t1", "One")], vec![related]) });
        let result = parse_browse_response(&data, "MPREb_x", 512).unwrap();
        assert_eq!(result.total_tracks(), 1);
    }

    #[test]
    fn test_detail_header_wins_over_microformat() {
        let data = json!({
            "header": { "musicDetailHeaderRenderer": {
                "title": { "runs": [{ "text": "Real Name" }] },
                "subtitle": { "runs": [
                    { "text": "EP" }, { "text": " • " },
                    { "text": "Band", "navigationEndpoint": { "browseEndpoint": { "browseId": "UCband" } } },
                    { "text": " • " }, { "text": "2019" }
                ] },
                "thumbnail": { "croppedSquareThumbnailRenderer": { "thumbnail": { "thumbnails": [
                    { "url": "https://lh3.googleusercontent.com/c=w60-h60" }
                ] } } }
            } },
            "microformat": { "microformatDataRenderer": { "title": "Other - Album by Someone" } }
        });
        let result = parse_browse_response(&data, "MPREb_ep", 512).unwrap();
        assert_eq!(result.header.name, "Real Name");
        assert_eq!(result.header.artists, "Band");
        assert_eq!(result.header.artist_id.as_deref(), Some("UCband"));
        assert_eq!(result.header.album_type, AlbumType::Ep);
        assert_eq!(result.header.release_date, "2019");
        assert_eq!(
            result.header.cover.as_deref(),
            Some("https://lh3.googleusercontent.com/c=w512-h512")
        );
    }

    #[test]
    fn test_mutation_artist_and_first_track_cover() {
        let mut row = album_row("t1", "Song");
        row["musicResponsiveListItemRenderer"]["thumbnail"] = json!({ "musicThumbnailRenderer": {
            "thumbnail": { "thumbnails": [{ "url": "https://i.ytimg.com/vi/t1/hq.jpg" }] }
        } });
        let data = json!({
            "contents": two_column(vec![row], vec![]),
            "frameworkUpdates": { "entityBatchUpdate": { "mutations": [
                { "payload": { "musicAlbumRelease": { "title": "Record", "artistDisplayName": "Solo" } } }
            ] } }
        });
        let result = parse_browse_response(&data, "MPREb_r", 512).unwrap();
        assert_eq!(result.header.name, "Record");
        assert_eq!(result.header.artists, "Solo");
        assert_eq!(result.header.cover.as_deref(), Some("https://i.ytimg.com/vi/t1/hq.jpg"));
    }

    #[test]
    fn test_playlist_prefix_forces_type() {
        let data = json!({
            "microformat": { "microformatDataRenderer": { "title": "Hits - Album by X" } }
        });
        let result = parse_browse_response(&data, "VLPLhits", 512).unwrap();
        assert!(result.is_playlist());
        assert!(result.tracks.is_empty());
    }

    #[test]
    fn test_not_an_object() {
        assert!(parse_browse_response(&json!("oops"), "MPREb_x", 512).is_none());
    }
}
