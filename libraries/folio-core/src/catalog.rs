//! Catalog model
//!
//! The catalog is loaded once at startup and is read-only afterwards.
//! Albums are shared behind `Arc` so playable tracks can point back at
//! the album they came from without owning it.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Track entry as stored in the catalog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub title: String,

    /// Audio source URI
    pub src: String,
}

/// Album entry as stored in the catalog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Unique album identifier (used in share links)
    pub id: String,

    /// Album title
    pub title: String,

    /// Cover art URI
    pub cover: String,

    /// Ordered track list
    #[serde(default)]
    pub tracks: Vec<Track>,

    /// Highlighted on the landing page
    #[serde(default)]
    pub is_recommended: bool,
}

impl Album {
    /// Flatten this album into playable tracks, in album order
    pub fn playable_tracks(self: &Arc<Self>) -> Vec<PlayableTrack> {
        self.tracks
            .iter()
            .map(|track| PlayableTrack::new(track, self))
            .collect()
    }

    /// Grid card for this album
    pub fn card(&self) -> AlbumCard {
        AlbumCard {
            id: self.id.clone(),
            title: self.title.clone(),
            cover: self.cover.clone(),
            track_count: self.tracks.len(),
        }
    }
}

/// A track enriched with its album and cover at flatten time
///
/// The album is a shared back-reference; the cover is denormalized from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayableTrack {
    pub title: String,
    pub src: String,
    pub album: Arc<Album>,
    pub cover: String,
}

impl PlayableTrack {
    fn new(track: &Track, album: &Arc<Album>) -> Self {
        Self {
            title: track.title.clone(),
            src: track.src.clone(),
            album: Arc::clone(album),
            cover: album.cover.clone(),
        }
    }

    pub fn album_title(&self) -> &str {
        &self.album.title
    }

    pub fn album_id(&self) -> &str {
        &self.album.id
    }
}

/// Summary shown in the album grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumCard {
    pub id: String,
    pub title: String,
    pub cover: String,
    pub track_count: usize,
}

impl AlbumCard {
    /// "N tracks" label under the card
    pub fn track_count_label(&self) -> String {
        match self.track_count {
            1 => "1 track".to_string(),
            n => format!("{} tracks", n),
        }
    }
}

/// Accepted catalog document shapes
///
/// Older deployments serve a bare array of albums without the total.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Full {
        albums: Vec<Album>,
        #[serde(rename = "totalSongs", default)]
        total_songs: Option<usize>,
    },
    Bare(Vec<Album>),
}

/// In-memory album catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    albums: Vec<Arc<Album>>,
    total_songs: usize,
}

impl Catalog {
    /// Build a catalog from albums, rejecting duplicate ids
    pub fn new(albums: Vec<Album>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(albums.len());
        for album in &albums {
            if !seen.insert(album.id.as_str()) {
                return Err(CatalogError::DuplicateAlbum(album.id.clone()));
            }
        }

        let total_songs = albums.iter().map(|album| album.tracks.len()).sum();
        let albums = albums.into_iter().map(Arc::new).collect();

        Ok(Self {
            albums,
            total_songs,
        })
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Parse a catalog document from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let (albums, declared) = match serde_json::from_slice(bytes)? {
            CatalogDocument::Full {
                albums,
                total_songs,
            } => (albums, total_songs),
            CatalogDocument::Bare(albums) => (albums, None),
        };

        let catalog = Self::new(albums)?;

        if let Some(declared) = declared {
            if declared != catalog.total_songs {
                warn!(
                    declared,
                    counted = catalog.total_songs,
                    "Catalog totalSongs does not match track count, using counted value"
                );
            }
        }

        debug!(
            albums = catalog.albums.len(),
            tracks = catalog.total_songs,
            "Catalog parsed"
        );

        Ok(catalog)
    }

    /// Read and parse a catalog document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    /// Albums in document order
    pub fn albums(&self) -> &[Arc<Album>] {
        &self.albums
    }

    /// Look up an album by id
    pub fn album(&self, id: &str) -> Option<&Arc<Album>> {
        self.albums.iter().find(|album| album.id == id)
    }

    /// Albums flagged as recommended
    pub fn recommended(&self) -> impl Iterator<Item = &Arc<Album>> {
        self.albums.iter().filter(|album| album.is_recommended)
    }

    /// Grid cards in document order
    pub fn cards(&self) -> Vec<AlbumCard> {
        self.albums.iter().map(|album| album.card()).collect()
    }

    /// Total number of tracks across all albums
    pub fn total_songs(&self) -> usize {
        self.total_songs
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Flatten one album into playable tracks
    pub fn album_tracks(&self, id: &str) -> Result<Vec<PlayableTrack>> {
        self.album(id)
            .map(|album| album.playable_tracks())
            .ok_or_else(|| CatalogError::AlbumNotFound(id.to_string()))
    }

    /// Flatten the whole catalog into playable tracks, album by album
    pub fn all_tracks(&self) -> Vec<PlayableTrack> {
        self.albums
            .iter()
            .flat_map(|album| album.playable_tracks())
            .collect()
    }
}
