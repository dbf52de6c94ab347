//! Per-field fallback chains
//!
//! Each extractor tries the known locations of a field in a fixed order and
//! keeps the first usable value. Missing or oddly typed data yields `None`,
//! an empty string or zero, never an error.

use super::text::{field_text, is_duration, is_noise, join_runs, non_empty, run_text, runs};
use crate::media::make_square_thumb;
use crate::models::{ALBUM_PREFIX, ARTIST_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static DURATION_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:)?\d{1,2}:\d{2}").ok());

/// Known locations of a thumbnail array, smallest variant first in each
const THUMBNAIL_PATHS: &[&str] = &[
    "/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails",
    "/thumbnail/thumbnails",
    "/video/thumbnail/thumbnails",
    "/thumbnail/thumbnail/thumbnails",
    "/thumbnailRenderer/musicThumbnailRenderer/thumbnail/thumbnails",
    "/thumbnail/croppedSquareThumbnailRenderer/thumbnail/thumbnails",
];

const FLEX_TEXT: &str = "/musicResponsiveListItemFlexColumnRenderer/text";
const FIXED_TEXT: &str = "/musicResponsiveListItemFixedColumnRenderer/text";
const FIXED_THUMBNAILS: &str = "/musicResponsiveListItemFixedColumnRenderer/thumbnail/thumbnails";
const PLAY_BUTTON_ENDPOINT: &str =
    "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint";

/// Seconds of the first `H:MM:SS` / `M:SS` group in `text`, 0 when absent
pub fn parse_duration_text(text: &str) -> u32 {
    let Some(found) = DURATION_PATTERN.as_ref().and_then(|re| re.find(text)) else {
        return 0;
    };
    found
        .as_str()
        .split(':')
        .try_fold(0u32, |acc, part| part.parse::<u32>().ok().map(|n| acc * 60 + n))
        .unwrap_or(0)
}

fn str_at(node: &Value, pointer: &str) -> Option<String> {
    node.pointer(pointer).and_then(Value::as_str).and_then(non_empty)
}

fn array<'a>(node: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    node.get(key).and_then(Value::as_array).into_iter().flatten()
}

/// Text field of flex column `index`
pub fn flex_column(node: &Value, index: usize) -> Option<&Value> {
    node.get("flexColumns")?.get(index)?.pointer(FLEX_TEXT)
}

/// Runs of every flex column after the first, then of the subtitle
fn secondary_runs(node: &Value) -> impl Iterator<Item = &Value> {
    array(node, "flexColumns")
        .skip(1)
        .flat_map(|column| runs(column.pointer(FLEX_TEXT)).iter())
        .chain(runs(node.get("subtitle")).iter())
}

/// Title of an item node
pub fn title(node: &Value) -> Option<String> {
    array(node, "flexColumns")
        .filter_map(|column| column.pointer(FLEX_TEXT)?.pointer("/runs/0/text")?.as_str())
        .find_map(non_empty)
        .or_else(|| str_at(node, "/title/runs/0/text"))
        .or_else(|| str_at(node, "/title/simpleText"))
        .or_else(|| str_at(node, "/titleText/runs/0/text"))
        .or_else(|| str_at(node, "/name/simpleText"))
        .or_else(|| str_at(node, "/video/title"))
        .or_else(|| non_empty(&join_runs(node.pointer("/header/title"), " ")))
}

/// Where a text run points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLink<'a> {
    /// Artist channel (`UC...`)
    Channel(&'a str),
    /// Album page (`MPREb_...`)
    Album(&'a str),
    /// Any other browse page
    Browse(&'a str),
    /// Non-browse endpoint (watch, search...)
    Other,
    Unlinked,
}

pub fn run_link(run: &Value) -> RunLink<'_> {
    let Some(endpoint) = run.get("navigationEndpoint") else {
        return RunLink::Unlinked;
    };
    match endpoint.pointer("/browseEndpoint/browseId").and_then(Value::as_str) {
        Some(id) if id.starts_with(ARTIST_PREFIX) => RunLink::Channel(id),
        Some(id) if id.starts_with(ALBUM_PREFIX) => RunLink::Album(id),
        Some(id) => RunLink::Browse(id),
        None => RunLink::Other,
    }
}

/// Contributor names of a run sequence
///
/// Runs linked to a channel or a non-album page win; without any, unlinked
/// names longer than one character are used. Noise tokens never count.
pub fn contributors_from_runs(runs: &[Value]) -> Vec<String> {
    let mut linked = Vec::new();
    let mut plain = Vec::new();

    for run in runs {
        let Some(text) = run_text(run).map(str::trim) else {
            continue;
        };
        if is_noise(text) {
            continue;
        }
        match run_link(run) {
            RunLink::Channel(_) | RunLink::Browse(_) => linked.push(text.to_string()),
            RunLink::Unlinked if text.chars().count() > 1 => plain.push(text.to_string()),
            _ => {}
        }
    }

    if linked.is_empty() {
        plain
    } else {
        linked
    }
}

/// Contributor display string, names joined with ", "
pub fn artists(node: &Value) -> String {
    let sources = [
        flex_column(node, 1),
        node.get("subtitle"),
        node.get("longBylineText"),
        node.get("ownerText"),
        node.get("shortBylineText"),
    ];
    sources
        .into_iter()
        .map(|field| contributors_from_runs(runs(field)))
        .find(|names| !names.is_empty())
        .map(|names| names.join(", "))
        .unwrap_or_default()
}

/// First artist channel referenced by the contributor runs
pub fn artist_id(node: &Value) -> Option<String> {
    secondary_runs(node)
        .chain(runs(node.get("longBylineText")).iter())
        .chain(runs(node.get("straplineTextOne")).iter())
        .find_map(|run| match run_link(run) {
            RunLink::Channel(id) => Some(id.to_string()),
            _ => None,
        })
}

/// Album name, only from a run linked to an album page
pub fn album(node: &Value) -> Option<String> {
    secondary_runs(node)
        .chain(runs(node.get("longBylineText")).iter())
        .find(|run| matches!(run_link(run), RunLink::Album(_)))
        .and_then(run_text)
        .and_then(non_empty)
}

/// Identifier carried by a navigation endpoint
pub fn endpoint_id(endpoint: &Value) -> Option<String> {
    if let Some(id) = str_at(endpoint, "/watchEndpoint/videoId") {
        return Some(id);
    }
    if let Some(url) = endpoint
        .pointer("/commandMetadata/webCommandMetadata/url")
        .and_then(Value::as_str)
    {
        if let Some(id) = query_video_id(url) {
            return Some(id);
        }
    }
    str_at(endpoint, "/browseEndpoint/browseId")
}

fn query_video_id(url: &str) -> Option<String> {
    let start = url.find("v=")? + 2;
    url[start..].split('&').next().and_then(non_empty)
}

/// Track identifier of an item node
pub fn track_id(node: &Value) -> Option<String> {
    str_at(node, "/playlistItemData/videoId")
        .or_else(|| str_at(node, "/videoId"))
        .or_else(|| node.pointer(PLAY_BUTTON_ENDPOINT).and_then(endpoint_id))
        .or_else(|| node.get("navigationEndpoint").and_then(endpoint_id))
        .or_else(|| {
            node.pointer("/thumbnail/musicThumbnailRenderer/navigationEndpoint")
                .and_then(endpoint_id)
        })
        .or_else(|| str_at(node, "/video/videoId"))
}

/// Browse identifier a collection node navigates to
pub fn browse_target(node: &Value) -> Option<String> {
    str_at(node, "/navigationEndpoint/browseEndpoint/browseId").or_else(|| {
        node.pointer(PLAY_BUTTON_ENDPOINT)
            .and_then(|endpoint| str_at(endpoint, "/browseEndpoint/browseId"))
    })
}

/// Duration in seconds, 0 when unknown
pub fn duration(node: &Value) -> u32 {
    let explicit = ["/lengthText", "/thumbnailOverlays/0/thumbnailOverlayTimeStatusRenderer/text"]
        .into_iter()
        .filter_map(|pointer| field_text(node.pointer(pointer)));
    let badges = array(node, "badges").filter_map(|badge| {
        badge
            .pointer("/metadataBadgeRenderer/label")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let fixed = array(node, "fixedColumns").filter_map(|column| field_text(column.pointer(FIXED_TEXT)));
    let flex = array(node, "flexColumns")
        .skip(1)
        .flat_map(|column| runs(column.pointer(FLEX_TEXT)).iter())
        .filter_map(run_text)
        .map(str::trim)
        .filter(|text| is_duration(text))
        .map(str::to_string);

    explicit
        .chain(badges)
        .chain(fixed)
        .chain(flex)
        .map(|text| parse_duration_text(&text))
        .find(|seconds| *seconds > 0)
        .unwrap_or(0)
}

/// URL of the last (largest) entry of a thumbnail array
pub fn last_thumbnail_url(thumbnails: Option<&Value>) -> Option<&str> {
    thumbnails?
        .as_array()?
        .last()?
        .get("url")?
        .as_str()
        .filter(|url| !url.trim().is_empty())
}

/// Square thumbnail of the array at `pointer`
pub fn thumbnail_at(node: &Value, pointer: &str, size: u32) -> Option<String> {
    make_square_thumb(last_thumbnail_url(node.pointer(pointer))?, size)
}

/// Square thumbnail of an item node
pub fn thumbnail(node: &Value, size: u32) -> Option<String> {
    let raw = THUMBNAIL_PATHS
        .iter()
        .find_map(|pointer| last_thumbnail_url(node.pointer(pointer)))
        .or_else(|| {
            array(node, "fixedColumns")
                .find_map(|column| last_thumbnail_url(column.pointer(FIXED_THUMBNAILS)))
        })?;
    make_square_thumb(raw, size)
}
