//! Platform-agnostic audio channel trait
//!
//! Abstracts a single playable media source (an `<audio>` element in the
//! browser, a decoder + output stream on desktop) so the player and banner
//! engines can run against any backend.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;

/// Notifications emitted by a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Metadata became available for the loaded source (once per load)
    MetadataLoaded { duration: Duration },

    /// Periodic progress while playing
    TimeUpdate { position: Duration },

    /// Playback started or resumed
    Playing,

    /// Playback paused
    Paused,

    /// Playback reached the end of the source (once per playthrough)
    Ended,
}

/// A single playable audio source with volume and time control
///
/// Methods take `&self`: implementors keep their own interior state so a
/// channel can be shared between an engine and its background tasks.
#[async_trait]
pub trait AudioChannel: Send + Sync + 'static {
    /// Replace the source
    ///
    /// Pauses, rewinds and forgets the previous duration. Metadata for the new
    /// source is announced later with [`ChannelEvent::MetadataLoaded`].
    fn load(&self, uri: &str);

    /// Currently loaded source URI
    fn source(&self) -> Option<String>;

    /// Start or resume playback
    ///
    /// Fails with [`PlaybackError::PlaybackStart`](crate::PlaybackError::PlaybackStart)
    /// when the medium refuses to start.
    async fn play(&self) -> Result<()>;

    /// Pause playback
    fn pause(&self);

    /// Move the playhead
    fn seek(&self, position: Duration);

    /// Current volume (0.0-1.0)
    fn volume(&self) -> f32;

    /// Set volume, clamped to 0.0-1.0
    fn set_volume(&self, volume: f32);

    /// Source duration, `None` until metadata has loaded
    fn duration(&self) -> Option<Duration>;

    /// Current playhead position
    fn position(&self) -> Duration;

    /// Whether the channel is paused
    fn is_paused(&self) -> bool;

    /// Subscribe to channel notifications
    fn subscribe(&self) -> broadcast::Receiver<ChannelEvent>;
}

/// Wait for the next metadata notification
///
/// Returns `None` if the channel's event stream closes first.
pub async fn wait_for_metadata(events: &mut broadcast::Receiver<ChannelEvent>) -> Option<Duration> {
    loop {
        match events.recv().await {
            Ok(ChannelEvent::MetadataLoaded { duration }) => return Some(duration),
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
