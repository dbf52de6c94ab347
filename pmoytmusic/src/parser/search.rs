//! Search response parsing

use crate::extract::extract_search_item;
use crate::models::SearchItem;
use crate::walker::{collect_into, MAX_CANDIDATES};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Candidate nodes of a search response
///
/// Known result containers are scanned first; generic `contents`/`results`
/// fields only when they yield nothing, and the whole tree as a last resort.
fn search_candidates(data: &Value) -> Vec<&Value> {
    let mut out = Vec::new();

    if let Some(tabs) = data
        .pointer("/contents/tabbedSearchResultsRenderer/tabs")
        .and_then(Value::as_array)
    {
        for content in tabs.iter().filter_map(|tab| tab.pointer("/tabRenderer/content")) {
            collect_into(content, MAX_CANDIDATES, &mut out);
        }
    }
    if let Some(section_list) = data.pointer("/contents/sectionListRenderer") {
        collect_into(section_list, MAX_CANDIDATES, &mut out);
    }
    if let Some(commands) = data.get("onResponseReceivedCommands").and_then(Value::as_array) {
        for items in commands
            .iter()
            .filter_map(|cmd| cmd.pointer("/appendContinuationItemsAction/continuationItems"))
        {
            collect_into(items, MAX_CANDIDATES, &mut out);
        }
    }
    if let Some(actions) = data.get("onResponseReceivedActions") {
        collect_into(actions, MAX_CANDIDATES, &mut out);
    }

    if out.is_empty() {
        for key in ["contents", "results"] {
            if let Some(node) = data.get(key) {
                collect_into(node, MAX_CANDIDATES, &mut out);
            }
        }
    }
    if out.is_empty() {
        debug!("no known search container, scanning the whole response");
        collect_into(data, MAX_CANDIDATES, &mut out);
    }
    out
}

/// Extract, deduplicate by id (first occurrence wins) and cap search results
pub fn parse_search_response(data: &Value, max_results: usize, thumbnail_size: u32) -> Vec<SearchItem> {
    if !data.is_object() {
        return Vec::new();
    }

    let candidates = search_candidates(data);
    debug!("search response: {} candidates", candidates.len());

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|candidate| extract_search_item(candidate, thumbnail_size))
        .filter(|item| !item.id().trim().is_empty())
        .filter(|item| seen.insert(item.id().to_string()))
        .take(max_results)
        .collect()
}
