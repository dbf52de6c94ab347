//! Home feed parsing (`FEmusic_home`)

use super::sections;
use crate::extract::extract_search_item;
use crate::extract::text::{join_runs, non_empty};
use crate::models::HomeFeedSection;
use serde_json::Value;
use tracing::debug;

/// Browse id of the home feed
pub const HOME_BROWSE_ID: &str = "FEmusic_home";

fn section_title(shelf: &Value) -> Option<String> {
    let from_header = join_runs(
        shelf.pointer("/header/musicCarouselShelfBasicHeaderRenderer/title"),
        "",
    );
    non_empty(&from_header).or_else(|| non_empty(&join_runs(shelf.get("title"), "")))
}

/// Named sections of the home feed, empty sections left out
pub fn parse_home_response(data: &Value, thumbnail_size: u32) -> Vec<HomeFeedSection> {
    let mut feed = Vec::new();

    for section in sections(data) {
        let Some(shelf) = section
            .get("musicCarouselShelfRenderer")
            .or_else(|| section.get("musicShelfRenderer"))
        else {
            continue;
        };

        let items: Vec<_> = shelf
            .get("contents")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|item| extract_search_item(item, thumbnail_size))
            .filter(|item| !item.id().trim().is_empty())
            .collect();

        if items.is_empty() {
            continue;
        }
        let title = section_title(shelf).unwrap_or_default();
        debug!("home section {:?}: {} items", title, items.len());
        feed.push(HomeFeedSection { title, items });
    }

    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemType, SearchItem};
    use serde_json::json;

    #[test]
    fn test_home_sections() {
        let data = json!({ "contents": { "singleColumnBrowseResultsRenderer": { "tabs": [{ "tabRenderer": {
            "content": { "sectionListRenderer": { "contents": [
                { "musicCarouselShelfRenderer": {
                    "header": { "musicCarouselShelfBasicHeaderRenderer": {
                        "title": { "runs": [{ "text": "Quick picks" }] }
                    } },
                    "contents": [
                        { "musicResponsiveListItemRenderer": {
                            "flexColumns": [{ "musicResponsiveListItemFlexColumnRenderer": {
                                "text": { "runs": [{ "text": "Song" }] }
                            } }],
                            "playlistItemData": { "videoId": "v1" }
                        } },
                        { "musicTwoRowItemRenderer": {
                            "title": { "runs": [{ "text": "Mix" }] },
                            "navigationEndpoint": { "browseEndpoint": { "browseId": "VLRDCLAK5uy_mix" } }
                        } },
                        { "musicTwoRowItemRenderer": { "subtitle": { "runs": [{ "text": "nothing" }] } } }
                    ]
                } },
                { "musicCarouselShelfRenderer": {
                    "header": { "musicCarouselShelfBasicHeaderRenderer": {
                        "title": { "runs": [{ "text": "Empty" }] }
                    } },
                    "contents": []
                } }
            ] } }
        } }] } } });

        let feed = parse_home_response(&data, 512);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "Quick picks");
        let types: Vec<_> = feed[0].items.iter().map(SearchItem::item_type).collect();
        assert_eq!(types, vec![ItemType::Track, ItemType::Playlist]);
    }

    #[test]
    fn test_unexpected_shape() {
        assert!(parse_home_response(&json!({ "contents": 42 }), 512).is_empty());
    }
}
