//! Folio Core
//!
//! Platform-agnostic catalog types, share-link routing and error handling for Folio.
//!
//! The core crate defines:
//! - **Catalog**: albums and tracks loaded once from a static document
//! - **Playable tracks**: tracks enriched with their album and cover at flatten time
//! - **Routing**: the `album`/`track` query parameters used by share links
//! - **Error Handling**: `CatalogError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use folio_core::Catalog;
//!
//! let catalog = Catalog::from_json(r#"{
//!     "albums": [{
//!         "id": "night-drive",
//!         "title": "Night Drive",
//!         "cover": "covers/night-drive.jpg",
//!         "tracks": [{ "title": "Tunnel", "src": "audio/tunnel.mp3" }],
//!         "isRecommended": true
//!     }],
//!     "totalSongs": 1
//! }"#).unwrap();
//!
//! assert_eq!(catalog.total_songs(), 1);
//! let tracks = catalog.all_tracks();
//! assert_eq!(tracks[0].album_title(), "Night Drive");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod format;
pub mod route;

pub use catalog::{Album, AlbumCard, Catalog, PlayableTrack, Track};
pub use error::{CatalogError, Result};
pub use format::{format_clock, format_duration};
pub use route::ViewState;
