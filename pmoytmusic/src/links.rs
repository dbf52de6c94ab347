//! Identifiers carried by YouTube / YouTube Music URLs
//!
//! ```
//! use pmoytmusic::links::{extract_browse_id, extract_playlist_id, extract_video_id};
//!
//! assert_eq!(
//!     extract_video_id("https://music.youtube.com/watch?v=xFrGuyw1V8s").as_deref(),
//!     Some("xFrGuyw1V8s")
//! );
//! assert_eq!(
//!     extract_playlist_id("https://music.youtube.com/playlist?list=PLabc").as_deref(),
//!     Some("PLabc")
//! );
//! assert_eq!(
//!     extract_browse_id("https://music.youtube.com/browse/MPREb_abc").as_deref(),
//!     Some("MPREb_abc")
//! );
//! ```

use crate::models::ALBUM_PLAYLIST_PREFIX;
use url::Url;

const BROWSE_PATH: &str = "/browse/";

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn browse_path_id(url: &Url) -> Option<String> {
    url.path()
        .strip_prefix(BROWSE_PATH)
        .map(str::to_string)
        .filter(|id| !id.is_empty())
}

/// Video id from `watch?v=<id>` or `youtu.be/<id>`
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    if let Some(v) = query_param(&url, "v") {
        return Some(v);
    }
    if url.host_str() == Some("youtu.be") {
        return url
            .path_segments()?
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
    }
    None
}

/// Playlist id from `list=<id>` or a `/browse/VL…` / `/browse/PL…` page
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    if let Some(list) = query_param(&url, "list") {
        return Some(list);
    }
    browse_path_id(&url).filter(|id| id.starts_with("VL") || id.starts_with("PL"))
}

/// Browse id from a `/browse/<id>` page or an album exposed as `list=OLAK5uy_…`
pub fn extract_browse_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    if let Some(id) = browse_path_id(&url) {
        return Some(id);
    }
    query_param(&url, "list").filter(|list| list.starts_with(ALBUM_PLAYLIST_PREFIX))
}

/// Browse id of a playlist: `VL` is prepended unless already present
///
/// Auto-generated radios (`RDCLAK5uy_…`) are browsed as is.
pub fn playlist_browse_id(playlist_id: &str) -> String {
    if playlist_id.starts_with("VL") || playlist_id.starts_with("RDCLAK5uy_") {
        playlist_id.to_string()
    } else {
        format!("VL{playlist_id}")
    }
}

/// Canonical watch URL of a video
pub fn watch_url(video_id: &str) -> String {
    format!("https://music.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123&list=PLx").as_deref(),
            Some("abc123")
        );
        assert_eq!(extract_video_id("https://youtu.be/xyz?t=10").as_deref(), Some("xyz"));
        assert_eq!(extract_video_id("https://youtu.be/"), None);
        assert_eq!(extract_video_id("https://music.youtube.com/browse/MPREb_x"), None);
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn test_playlist_id() {
        assert_eq!(
            extract_playlist_id("https://music.youtube.com/browse/VLPLabc").as_deref(),
            Some("VLPLabc")
        );
        assert_eq!(extract_playlist_id("https://music.youtube.com/browse/MPREb_x"), None);
        assert_eq!(
            extract_playlist_id("https://music.youtube.com/watch?v=a&list=RDCLAK5uy_r").as_deref(),
            Some("RDCLAK5uy_r")
        );
    }

    #[test]
    fn test_browse_id() {
        assert_eq!(
            extract_browse_id("https://music.youtube.com/playlist?list=OLAK5uy_album").as_deref(),
            Some("OLAK5uy_album")
        );
        assert_eq!(extract_browse_id("https://music.youtube.com/playlist?list=PLabc"), None);
        assert_eq!(extract_browse_id("https://music.youtube.com/watch?v=a"), None);
    }

    #[test]
    fn test_playlist_browse_id() {
        assert_eq!(playlist_browse_id("PLabc"), "VLPLabc");
        assert_eq!(playlist_browse_id("VLPLabc"), "VLPLabc");
        assert_eq!(playlist_browse_id("RDCLAK5uy_r"), "RDCLAK5uy_r");
    }
}
