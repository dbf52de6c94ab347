//! Renderer classification
//!
//! A candidate returned by the walker is a wrapper object whose single
//! meaningful key names the renderer. It is inspected once here; extractors
//! then work on the inner node.

use serde_json::Value;

/// Concrete renderer behind a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// `musicResponsiveListItemRenderer`: row with flex/fixed columns
    ResponsiveListItem,
    /// `musicTwoRowItemRenderer`: tile with title and subtitle
    TwoRowItem,
    /// `musicCardRenderer`
    Card,
    /// `videoRenderer`: plain YouTube video
    Video,
    /// `playlistPanelVideoRenderer`: queue entry
    PlaylistPanelVideo,
    /// `musicCardShelfRenderer`: featured top result card
    CardShelf,
    /// No known wrapper key, the node is used as is
    Bare,
}

const WRAPPERS: &[(&str, RendererKind)] = &[
    ("musicResponsiveListItemRenderer", RendererKind::ResponsiveListItem),
    ("musicTwoRowItemRenderer", RendererKind::TwoRowItem),
    ("musicCardRenderer", RendererKind::Card),
    ("videoRenderer", RendererKind::Video),
    ("playlistPanelVideoRenderer", RendererKind::PlaylistPanelVideo),
    ("musicCardShelfRenderer", RendererKind::CardShelf),
];

/// A classified candidate
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    pub kind: RendererKind,
    pub node: &'a Value,
}

impl<'a> Renderer<'a> {
    /// Unwrap `candidate`, following one `richItemRenderer.content` indirection
    pub fn classify(candidate: &'a Value) -> Self {
        Self::classify_at(candidate, true)
    }

    fn classify_at(candidate: &'a Value, follow_rich: bool) -> Self {
        for (key, kind) in WRAPPERS {
            if let Some(inner) = candidate.get(*key) {
                return Self { kind: *kind, node: inner };
            }
        }

        if follow_rich {
            if let Some(content) = candidate.pointer("/richItemRenderer/content") {
                return Self::classify_at(content, false);
            }
        }

        Self {
            kind: RendererKind::Bare,
            node: candidate,
        }
    }

    pub fn is_card_shelf(&self) -> bool {
        self.kind == RendererKind::CardShelf
    }
}
