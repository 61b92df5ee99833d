//! Playback Events
//!
//! Event-based communication for view synchronization. The engines never
//! render anything themselves; a view layer subscribes and projects these
//! onto the page (or terminal):
//! - Transport state changes (play/pause)
//! - Track changes and metadata readiness
//! - Position updates (every channel progress tick)
//! - Banner now-playing and visibility changes

use crate::types::{BannerDisplay, BannerState, NowPlaying};
use serde::Serialize;

/// Events emitted by the foreground player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayerEvent {
    /// Transport state changed
    ///
    /// `playing: true` is the transport "play" event; the banner stops on it.
    StateChanged { playing: bool },

    /// A new track was loaded into the channel
    TrackChanged(NowPlaying),

    /// Duration of the current track became known
    DurationKnown { duration_ms: u64 },

    /// Playback position update
    PositionUpdate {
        position_ms: u64,
        duration_ms: Option<u64>,
    },

    /// Volume changed (0.0-1.0)
    VolumeChanged { volume: f32 },

    /// Playlist was replaced
    PlaylistChanged { length: usize, shuffled: bool },

    /// A playback call failed and was recovered from
    Error { message: String },
}

impl PlayerEvent {
    /// Whether this is the transport "play" event
    pub fn is_play(&self) -> bool {
        matches!(self, PlayerEvent::StateChanged { playing: true })
    }
}

/// Events emitted by the mashup banner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BannerEvent {
    /// Engine state changed
    StateChanged { state: BannerState },

    /// Caption or cover changed ("Loading..." on start, then one per clip)
    NowPlaying(BannerDisplay),

    /// Banner shown or hidden
    VisibilityChanged { visible: bool },

    /// A clip failed and the cycle carried on
    Error { message: String },
}
