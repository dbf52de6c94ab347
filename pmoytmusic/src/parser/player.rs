//! Player response parsing
//!
//! `videoDetails` is flat, each field is read on its own so that one
//! unexpected value only blanks that field.

use crate::extract::text::non_empty;
use crate::media::make_square_thumb;
use crate::models::{Track, SOURCE_TAG};
use serde_json::Value;

/// `lengthSeconds` is usually a string, sometimes a number
fn length_seconds(details: &Value) -> u32 {
    match details.get("lengthSeconds") {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        _ => 0,
    }
}

/// Largest thumbnail carrying a URL
fn largest_thumbnail(details: &Value) -> Option<&str> {
    details
        .pointer("/thumbnail/thumbnails")?
        .as_array()?
        .iter()
        .rev()
        .find_map(|thumb| thumb.get("url").and_then(Value::as_str).filter(|u| !u.trim().is_empty()))
}

/// Track metadata of a `player` response, `None` without `videoDetails`
pub fn parse_player_response(data: &Value, video_id: &str, thumbnail_size: u32) -> Option<Track> {
    let details = data.get("videoDetails").filter(|d| d.is_object())?;
    let text = |key: &str| details.get(key).and_then(Value::as_str).and_then(non_empty);

    Some(Track {
        id: video_id.to_string(),
        title: text("title").unwrap_or_else(|| "Unknown".to_string()),
        artist: text("author").unwrap_or_default(),
        album: String::new(),
        duration: length_seconds(details),
        thumbnail: largest_thumbnail(details).and_then(|url| make_square_thumb(url, thumbnail_size)),
        source: SOURCE_TAG.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_details() {
        let data = json!({ "videoDetails": {
            "videoId": "xFrGuyw1V8s",
            "title": "Dancing Queen",
            "author": "ABBA",
            "lengthSeconds": "231",
            "thumbnail": { "thumbnails": [
                { "url": "https://i.ytimg.com/vi/xFrGuyw1V8s/default.jpg" },
                { "url": "https://lh3.googleusercontent.com/q=w544-h544-l90-rj" }
            ] }
        } });
        let track = parse_player_response(&data, "xFrGuyw1V8s", 512).unwrap();
        assert_eq!(track.title, "Dancing Queen");
        assert_eq!(track.artist, "ABBA");
        assert_eq!(track.duration, 231);
        assert_eq!(
            track.thumbnail.as_deref(),
            Some("https://lh3.googleusercontent.com/q=w512-h512-l90-rj")
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let data = json!({ "videoDetails": { "lengthSeconds": "n/a" } });
        let track = parse_player_response(&data, "v", 512).unwrap();
        assert_eq!(track.title, "Unknown");
        assert_eq!(track.duration, 0);
        assert_eq!(track.thumbnail, None);
    }

    #[test]
    fn test_numeric_length_seconds() {
        let data = json!({ "videoDetails": { "title": "X", "author": "A", "lengthSeconds": 231 } });
        let track = parse_player_response(&data, "v", 512).unwrap();
        assert_eq!(track.title, "X");
        assert_eq!(track.artist, "A");
        assert_eq!(track.duration, 231);
    }

    #[test]
    fn test_thumbnail_entries_without_url_are_skipped() {
        let data = json!({ "videoDetails": {
            "title": "X",
            "lengthSeconds": "10",
            "thumbnail": { "thumbnails": [
                { "url": "https://lh3.googleusercontent.com/q=w60-h60" },
                { "width": 10 }
            ] }
        } });
        let track = parse_player_response(&data, "v", 512).unwrap();
        assert_eq!(track.duration, 10);
        assert_eq!(
            track.thumbnail.as_deref(),
            Some("https://lh3.googleusercontent.com/q=w512-h512")
        );

        let bare = json!({ "videoDetails": { "title": "X", "thumbnail": { "thumbnails": [{ "width": 10 }] } } });
        let track = parse_player_response(&bare, "v", 512).unwrap();
        assert_eq!(track.title, "X");
        assert_eq!(track.thumbnail, None);
    }

    #[test]
    fn test_mistyped_fields_only_blank_themselves() {
        let data = json!({ "videoDetails": { "title": 42, "author": ["A"], "lengthSeconds": "200" } });
        let track = parse_player_response(&data, "v", 512).unwrap();
        assert_eq!(track.title, "Unknown");
        assert_eq!(track.artist, "");
        assert_eq!(track.duration, 200);
    }

    #[test]
    fn test_no_video_details() {
        assert!(parse_player_response(&json!({ "playabilityStatus": {} }), "v", 512).is_none());
    }
}
