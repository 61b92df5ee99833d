//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The medium refused to start (autoplay policy, unplayable source)
    #[error("Playback failed to start: {0}")]
    PlaybackStart(String),

    /// Playlist is empty
    #[error("Playlist is empty")]
    PlaylistEmpty,

    /// Start index outside the playlist
    #[error("Index out of bounds: {index} (playlist length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// No source loaded into the channel
    #[error("No source loaded")]
    NoSource,

    /// Source never reported its metadata
    #[error("Metadata unavailable for {0}")]
    MetadataUnavailable(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
