//! Bounded scans over InnerTube renderer trees
//!
//! Responses are arbitrarily nested; items can appear at any depth under
//! layout wrappers that change between surfaces and experiments. Both walkers
//! here are one-shot depth-first scans in key insertion order (the crate
//! enables `serde_json/preserve_order`), bounded in depth and output size.

use serde_json::{Map, Value};
use tracing::debug;

/// Nodes deeper than this are ignored
pub const MAX_DEPTH: usize = 20;

/// Upper bound on collected candidates
pub const MAX_CANDIDATES: usize = 100;

/// Depth bound of the first-shelf search
pub const MAX_SHELF_DEPTH: usize = 15;

/// Keys that mark a node as an item container
pub const CANDIDATE_KEYS: &[&str] = &[
    "videoRenderer",
    "musicResponsiveListItemRenderer",
    "musicTwoRowItemRenderer",
    "musicCardRenderer",
    "playlistPanelVideoRenderer",
    "musicCardShelfRenderer",
];

/// Whether an object carries one of the item-container keys
pub fn is_candidate(map: &Map<String, Value>) -> bool {
    CANDIDATE_KEYS.iter().any(|key| map.contains_key(*key))
        || map
            .get("richItemRenderer")
            .and_then(|rich| rich.get("content"))
            .is_some_and(|content| !content.is_null())
}

/// Collect at most `max` item-like nodes under `node`
///
/// A candidate is kept and its children are still scanned: shelf-level cards
/// may wrap further items.
pub fn collect_candidates(node: &Value, max: usize) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_into(node, max, &mut out);
    out
}

/// Append candidates under `node` to `out` until it holds `max` nodes
pub fn collect_into<'a>(node: &'a Value, max: usize, out: &mut Vec<&'a Value>) {
    walk(node, 0, max, out);
}

fn walk<'a>(node: &'a Value, depth: usize, max: usize, out: &mut Vec<&'a Value>) {
    if depth > MAX_DEPTH || out.len() >= max {
        return;
    }

    match node {
        Value::Array(items) => walk_items(items, depth, max, out),
        Value::Object(map) => {
            if is_candidate(map) {
                out.push(node);
            }
            for value in map.values() {
                if out.len() >= max {
                    break;
                }
                match value {
                    Value::Array(items) => walk_items(items, depth, max, out),
                    Value::Object(_) => walk(value, depth + 1, max, out),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn walk_items<'a>(items: &'a [Value], depth: usize, max: usize, out: &mut Vec<&'a Value>) {
    for item in items {
        if out.len() >= max {
            break;
        }
        walk(item, depth + 1, max, out);
    }
}

/// Items of the first track-list shelf found under `node`
///
/// Only the first `musicShelfRenderer` (keeping its list items) or
/// `playlistPanelRenderer` (keeping its panel videos) counts; sibling shelves
/// such as "related" carousels are never reached. An empty vector means no
/// shelf was found or the shelf had no track items.
pub fn collect_first_shelf(node: &Value) -> Vec<&Value> {
    let items = find_shelf(node, 0).unwrap_or_default();
    debug!("first shelf holds {} items", items.len());
    items
}

fn shelf_items<'a>(map: &'a Map<String, Value>, shelf: &str, item_key: &str) -> Option<Vec<&'a Value>> {
    let contents = map.get(shelf)?.get("contents")?.as_array()?;
    Some(
        contents
            .iter()
            .filter(|item| item.get(item_key).is_some())
            .collect(),
    )
}

fn find_shelf(node: &Value, depth: usize) -> Option<Vec<&Value>> {
    if depth > MAX_SHELF_DEPTH {
        return None;
    }

    match node {
        Value::Array(items) => items.iter().find_map(|item| find_shelf(item, depth + 1)),
        Value::Object(map) => {
            if let Some(items) = shelf_items(map, "musicShelfRenderer", "musicResponsiveListItemRenderer") {
                return Some(items);
            }
            if let Some(items) = shelf_items(map, "playlistPanelRenderer", "playlistPanelVideoRenderer") {
                return Some(items);
            }
            map.values()
                .filter(|value| value.is_object() || value.is_array())
                .find_map(|value| find_shelf(value, depth + 1))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str) -> Value {
        json!({ "musicResponsiveListItemRenderer": { "playlistItemData": { "videoId": id } } })
    }

    fn nested(levels: usize, leaf: Value) -> Value {
        (0..levels).fold(leaf, |inner, _| json!({ "wrapper": inner }))
    }

    fn id_of(node: &Value) -> &str {
        node["musicResponsiveListItemRenderer"]["playlistItemData"]["videoId"]
            .as_str()
            .unwrap_or_default()
    }

    #[test]
    fn test_collect_in_document_order() {
        let tree = json!({
            "contents": {
                "first": [track("a"), track("b")],
                "second": { "items": [track("c")] }
            }
        });
        let found = collect_candidates(&tree, MAX_CANDIDATES);
        let ids: Vec<_> = found.iter().map(|n| id_of(n)).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collect_bounded_count() {
        let items: Vec<Value> = (0..150).map(|i| track(&format!("v{i}"))).collect();
        let tree = json!({ "contents": items });
        assert_eq!(collect_candidates(&tree, MAX_CANDIDATES).len(), 100);
        assert_eq!(collect_candidates(&tree, 3).len(), 3);
    }

    #[test]
    fn test_collect_bounded_depth() {
        let shallow = nested(5, track("ok"));
        assert_eq!(collect_candidates(&shallow, MAX_CANDIDATES).len(), 1);

        let deep = nested(MAX_DEPTH + 5, track("too-deep"));
        assert!(collect_candidates(&deep, MAX_CANDIDATES).is_empty());
    }

    #[test]
    fn test_rich_item_requires_content() {
        let tree = json!([
            { "richItemRenderer": {} },
            { "richItemRenderer": { "content": { "videoRenderer": {} } } }
        ]);
        // the wrapper and the inner video renderer
        assert_eq!(collect_candidates(&tree, MAX_CANDIDATES).len(), 2);
    }

    #[test]
    fn test_first_shelf_ignores_related() {
        let tree = json!({
            "tabs": [{
                "sectionListRenderer": { "contents": [
                    { "musicShelfRenderer": { "contents": [
                        track("t1"),
                        { "continuationItemRenderer": {} },
                        track("t2")
                    ]}},
                    { "musicCarouselShelfRenderer": { "contents": [track("related")] } },
                    { "musicShelfRenderer": { "contents": [track("other")] } }
                ]}
            }]
        });
        let items = collect_first_shelf(&tree);
        let ids: Vec<_> = items.iter().map(|n| id_of(n)).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_first_shelf_playlist_panel() {
        let tree = json!({
            "playlistPanelRenderer": { "contents": [
                { "playlistPanelVideoRenderer": { "videoId": "p1" } },
                { "automixPreviewVideoRenderer": {} }
            ]}
        });
        assert_eq!(collect_first_shelf(&tree).len(), 1);
    }

    #[test]
    fn test_first_shelf_missing() {
        let tree = json!({ "contents": [ { "gridRenderer": {} } ] });
        assert!(collect_first_shelf(&tree).is_empty());
    }
}
