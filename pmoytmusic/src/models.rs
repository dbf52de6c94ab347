//! Structures de données du catalogue YouTube Music
//!
//! Deux familles de types :
//!
//! - les enregistrements internes produits par les extracteurs ([`Track`],
//!   [`Collection`], [`BrowseResult`], ...) ;
//! - le contrat de sortie exposé à l'hôte ([`TrackMetadata`],
//!   [`AlbumMetadata`], [`ResolvedUrl`], ...), construit uniquement par
//!   [`crate::sanitize`].

use serde::{Deserialize, Serialize};

/// Tag `source` des pistes extraites
pub const SOURCE_TAG: &str = "youtube";

/// Identifiant du fournisseur dans les enregistrements de sortie et les URI
pub const PROVIDER_ID: &str = "ytmusic";

/// Titre des pistes provisoires renvoyées pendant le chargement
pub const PLACEHOLDER_TITLE: &str = "Loading...";

/// Préfixe des identifiants d'album
pub const ALBUM_PREFIX: &str = "MPREb_";

/// Préfixe des albums exposés comme playlists (`list=OLAK5uy_...`)
pub const ALBUM_PLAYLIST_PREFIX: &str = "OLAK5uy_";

/// Préfixes des identifiants de playlist (radios automatiques comprises)
pub const PLAYLIST_PREFIXES: &[&str] = &["VLRDCLAK5uy_", "RDCLAK5uy_", "VL", "PL"];

/// Préfixe des chaînes d'artiste
pub const ARTIST_PREFIX: &str = "UC";

// ============================================================================
// Enregistrements internes
// ============================================================================

/// Piste extraite d'un nœud renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Identifiant vidéo (jamais vide)
    pub id: String,
    pub title: String,
    /// Contributeurs séparés par ", " (peut être vide)
    pub artist: String,
    /// Nom de l'album (peut être vide)
    pub album: String,
    /// Durée en secondes, 0 si inconnue
    pub duration: u32,
    /// URL absolue de la vignette
    pub thumbnail: Option<String>,
    pub source: String,
}

impl Track {
    /// Piste provisoire renvoyée avant que les métadonnées ne soient en cache
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: PLACEHOLDER_TITLE.to_string(),
            artist: String::new(),
            album: String::new(),
            duration: 0,
            thumbnail: None,
            source: SOURCE_TAG.to_string(),
        }
    }
}

/// Nature d'une collection, déduite du préfixe de son identifiant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Album,
    Playlist,
    Artist,
}

impl CollectionKind {
    /// Classe un identifiant de navigation, `None` si le préfixe est inconnu
    pub fn from_browse_id(browse_id: &str) -> Option<Self> {
        if browse_id.starts_with(ALBUM_PREFIX) || browse_id.starts_with(ALBUM_PLAYLIST_PREFIX) {
            Some(Self::Album)
        } else if PLAYLIST_PREFIXES.iter().any(|p| browse_id.starts_with(p)) {
            Some(Self::Playlist)
        } else if browse_id.starts_with(ARTIST_PREFIX) {
            Some(Self::Artist)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Artist => "artist",
        }
    }
}

/// Type éditorial d'une collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumType {
    #[default]
    Album,
    Single,
    Ep,
    Playlist,
    Artist,
}

impl AlbumType {
    /// Interprète un libellé de sous-titre ("Album", "Single", "EP", "Playlist")
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "album" => Some(Self::Album),
            "single" => Some(Self::Single),
            "ep" => Some(Self::Ep),
            "playlist" => Some(Self::Playlist),
            _ => None,
        }
    }

    /// Type par défaut d'une nature de collection
    pub fn for_kind(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Album => Self::Album,
            CollectionKind::Playlist => Self::Playlist,
            CollectionKind::Artist => Self::Artist,
        }
    }
}

/// Album, playlist ou artiste extrait d'un résultat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Identifiant de navigation (jamais vide)
    pub id: String,
    pub title: String,
    /// Artiste ou propriétaire, vide pour les artistes eux-mêmes
    pub artist: String,
    pub kind: CollectionKind,
    pub album_type: AlbumType,
    /// Année sur 4 chiffres ou chaîne vide
    pub year: String,
    pub thumbnail: Option<String>,
}

/// Résultat de recherche avant nettoyage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchItem {
    Track(Track),
    Collection(Collection),
}

impl SearchItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Track(track) => &track.id,
            Self::Collection(collection) => &collection.id,
        }
    }

    /// Type exposé : "track" ou la nature de la collection
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Track(_) => ItemType::Track,
            Self::Collection(collection) => collection.kind.into(),
        }
    }
}

/// Métadonnées d'en-tête d'une page album/playlist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseHeader {
    pub name: String,
    pub artists: String,
    /// Chaîne de l'artiste principal si l'en-tête la référence
    pub artist_id: Option<String>,
    pub cover: Option<String>,
    pub release_date: String,
    pub album_type: AlbumType,
}

/// Page album/playlist analysée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseResult {
    pub id: String,
    pub header: BrowseHeader,
    pub tracks: Vec<Track>,
}

impl BrowseResult {
    pub fn total_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_playlist(&self) -> bool {
        self.header.album_type == AlbumType::Playlist
    }
}

/// Page artiste analysée
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistPage {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub top_tracks: Vec<Track>,
    pub collections: Vec<Collection>,
}

/// Section de la page d'accueil
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeFeedSection {
    pub title: String,
    pub items: Vec<SearchItem>,
}

// ============================================================================
// Contrat de sortie
// ============================================================================

/// Type d'un enregistrement de sortie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Track,
    Album,
    Playlist,
    Artist,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Artist => "artist",
        }
    }
}

impl From<CollectionKind> for ItemType {
    fn from(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Album => Self::Album,
            CollectionKind::Playlist => Self::Playlist,
            CollectionKind::Artist => Self::Artist,
        }
    }
}

/// Piste telle qu'exposée à l'hôte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub album_name: String,
    pub duration_ms: u64,
    pub cover_url: Option<String>,
    pub provider_id: String,
    pub item_type: ItemType,
}

/// Album, playlist ou artiste tel qu'exposé à l'hôte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub id: String,
    pub name: String,
    pub artists: String,
    /// Identique à `name`
    pub album_name: String,
    pub album_type: AlbumType,
    pub release_date: String,
    pub cover_url: Option<String>,
    pub provider_id: String,
    pub item_type: ItemType,
}

/// Résultat de recherche nettoyé
///
/// La variante collection est essayée en premier à la désérialisation : elle
/// seule porte `album_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResult {
    Collection(CollectionMetadata),
    Track(TrackMetadata),
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            Self::Collection(c) => &c.id,
            Self::Track(t) => &t.id,
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Collection(c) => c.item_type,
            Self::Track(t) => t.item_type,
        }
    }
}

/// Album complet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub artist_id: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: String,
    pub total_tracks: usize,
    pub album_type: AlbumType,
    pub tracks: Vec<TrackMetadata>,
    pub provider_id: String,
}

/// Playlist complète
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub cover_url: Option<String>,
    pub total_tracks: usize,
    pub tracks: Vec<TrackMetadata>,
    pub provider_id: String,
}

/// Artiste avec ses titres populaires et sa discographie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistMetadata {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub top_tracks: Vec<TrackMetadata>,
    pub albums: Vec<CollectionMetadata>,
    pub provider_id: String,
}

/// En-tête d'une collection résolue depuis une URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHeader {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub artist_id: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: String,
    pub total_tracks: usize,
    pub album_type: AlbumType,
}

/// Résultat de la résolution d'une URL YouTube Music
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolvedUrl {
    /// Piste unique ; `pending` indique une piste provisoire
    Track { track: TrackMetadata, pending: bool },
    Album {
        album: CollectionHeader,
        tracks: Vec<TrackMetadata>,
    },
    Playlist {
        playlist: CollectionHeader,
        tracks: Vec<TrackMetadata>,
    },
}

/// Élément de la page d'accueil
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeFeedItemMetadata {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub cover_url: Option<String>,
    pub item_type: ItemType,
    /// `ytmusic:<type>:<id>`
    pub uri: String,
}

/// Section nommée de la page d'accueil
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeFeedSectionMetadata {
    pub title: String,
    pub items: Vec<HomeFeedItemMetadata>,
}

// ============================================================================
// Enrichissement
// ============================================================================

/// Liens vers les autres plateformes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deezer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tidal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qobuz: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple: Option<String>,
}

impl ExternalLinks {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nombre de plateformes renseignées
    pub fn len(&self) -> usize {
        [
            &self.deezer,
            &self.tidal,
            &self.qobuz,
            &self.spotify,
            &self.amazon,
            &self.apple,
        ]
        .iter()
        .filter(|link| link.is_some())
        .count()
    }
}

/// Faits récupérés auprès du résolveur de liens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_artist: Option<String>,
    #[serde(default, skip_serializing_if = "ExternalLinks::is_empty")]
    pub external_links: ExternalLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deezer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tidal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qobuz_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,
}

impl Enrichment {
    /// Vrai si au moins un ISRC ou un lien a été trouvé
    pub fn has_facts(&self) -> bool {
        self.isrc.as_deref().is_some_and(|isrc| !isrc.is_empty()) || !self.external_links.is_empty()
    }
}

/// Piste accompagnée de son enrichissement (vide en cas d'échec)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedTrack {
    #[serde(flatten)]
    pub track: TrackMetadata,
    #[serde(flatten)]
    pub enrichment: Enrichment,
}

impl EnrichedTrack {
    pub fn unenriched(track: TrackMetadata) -> Self {
        Self {
            track,
            enrichment: Enrichment::default(),
        }
    }
}

/// Issue du contrôle préalable à un appel natif
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn accepted() -> Self {
        Self { ok: true, reason: None }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}
