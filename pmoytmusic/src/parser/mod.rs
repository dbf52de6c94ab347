//! Per-endpoint response parsers
//!
//! Parsers are pure functions of the raw JSON: they locate the relevant
//! sub-trees, run the walker and the extractors, and return internal records.

pub mod artist;
pub mod browse;
pub mod home;
pub mod player;
pub mod search;

pub use artist::parse_artist_response;
pub use browse::parse_browse_response;
pub use home::parse_home_response;
pub use player::parse_player_response;
pub use search::parse_search_response;

use serde_json::Value;

/// Layouts wrapping the main section list of a browse page
const SECTION_LIST_PATHS: &[&str] = &[
    "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer",
    "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer",
    "/contents/twoColumnBrowseResultsRenderer/secondaryContents/sectionListRenderer",
    "/contents/sectionListRenderer",
];

/// First section list of a browse page
pub(crate) fn section_list(data: &Value) -> Option<&Value> {
    SECTION_LIST_PATHS.iter().find_map(|path| data.pointer(path))
}

/// Sections of every known section list, in layout order
pub(crate) fn sections(data: &Value) -> Vec<&Value> {
    SECTION_LIST_PATHS
        .iter()
        .filter_map(|path| data.pointer(path)?.get("contents")?.as_array())
        .flatten()
        .collect()
}
