//! Heuristic extraction of catalog records from renderer nodes
//!
//! - [`renderer`] unwraps a candidate node into its concrete renderer once;
//! - [`text`] holds the run helpers and the noise-token table;
//! - [`fields`] implements the per-field fallback chains;
//! - [`items`] assembles tracks, collections and artist cards and dispatches
//!   a generic candidate between them.

pub mod fields;
pub mod items;
pub mod renderer;
pub mod text;

pub use fields::parse_duration_text;
pub use items::{extract_artist_card, extract_collection, extract_search_item, extract_track};
pub use renderer::{Renderer, RendererKind};
pub use text::{classify_token, is_noise, NoiseToken};
