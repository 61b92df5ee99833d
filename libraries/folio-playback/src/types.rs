//! Core types for playback management

use crate::fade::FadeSettings;
use folio_core::{format_duration, PlayableTrack};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Now-playing information projected onto the transport bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    /// Position in the playlist
    pub index: usize,

    /// Track title
    pub title: String,

    /// Album title
    pub album: String,

    /// Cover art URI
    pub cover: String,
}

impl NowPlaying {
    pub(crate) fn from_track(index: usize, track: &PlayableTrack) -> Self {
        Self {
            index,
            title: track.title.clone(),
            album: track.album_title().to_string(),
            cover: track.cover.clone(),
        }
    }
}

/// Elapsed time and (once metadata has loaded) duration of the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub position: Duration,
    pub duration: Option<Duration>,
}

impl Progress {
    /// Position normalized to 0.0..=1.0 (0.0 while duration is unknown)
    pub fn fraction(&self) -> f64 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// `m:ss / m:ss` readout
    pub fn readout(&self) -> String {
        let total = self
            .duration
            .map(format_duration)
            .unwrap_or_else(|| "0:00".to_string());
        format!("{} / {}", format_duration(self.position), total)
    }
}

/// Banner engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerState {
    /// Never started
    Idle,

    /// Started at least once, no audio now
    Stopped,

    /// Clip cycle running
    Playing,
}

/// What the banner shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerDisplay {
    /// Caption text ("Click to Play Mashup", "Loading...", "title - album")
    pub caption: String,

    /// Cover art URI
    pub cover: String,

    /// Banner is visible on the current view
    pub visible: bool,

    /// Banner is styled as active (playing)
    pub active: bool,

    /// Bumped on every now-playing update so the view can restart its fade-in cue
    pub cue: u64,
}

/// Configuration for the foreground player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Elapsed time after which "previous" restarts the current track (default: 3s)
    pub prev_restart_threshold: Duration,

    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Seed for the shuffle RNG (None = entropy)
    pub seed: Option<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            prev_restart_threshold: Duration::from_secs(3),
            volume: 1.0,
            seed: None,
        }
    }
}

/// Configuration for the mashup banner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Length of one clip including its crossfades (default: 20s)
    pub clip: Duration,

    /// Crossfade between consecutive clips (default: 2s, 20 linear steps)
    pub crossfade: FadeSettings,

    /// Material kept after a clip's random start offset (default: 15s)
    pub min_tail: Duration,

    /// How long to wait for a source's metadata before picking another track (default: 10s)
    pub metadata_timeout: Duration,

    /// Cover shown before the first clip
    pub placeholder_cover: String,

    /// Seed for track and offset picks (None = entropy)
    pub seed: Option<u64>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            clip: Duration::from_millis(20_000),
            crossfade: FadeSettings::default(),
            min_tail: Duration::from_secs(15),
            metadata_timeout: Duration::from_secs(10),
            placeholder_cover: "cover-placeholder.jpg".to_string(),
            seed: None,
        }
    }
}

impl BannerConfig {
    /// Time a clip plays alone before the next one starts fading in
    pub fn hold(&self) -> Duration {
        self.clip.saturating_sub(self.crossfade.duration)
    }
}

/// Behaviour of the simulated media backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Delay between `load` and metadata readiness (default: 150ms)
    pub metadata_delay: Duration,

    /// Interval between time-progress notifications (default: 250ms)
    pub tick: Duration,

    /// Duration reported for every source (default: 3 minutes)
    pub track_duration: Duration,

    /// Reject every `play()` like a browser autoplay policy (default: false)
    pub autoplay_denied: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            metadata_delay: Duration::from_millis(150),
            tick: Duration::from_millis(250),
            track_duration: Duration::from_secs(180),
            autoplay_denied: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configs() {
        let player = PlayerConfig::default();
        assert_eq!(player.prev_restart_threshold, Duration::from_secs(3));
        assert_eq!(player.volume, 1.0);

        let banner = BannerConfig::default();
        assert_eq!(banner.clip, Duration::from_millis(20_000));
        assert_eq!(banner.crossfade.duration, Duration::from_millis(2000));
        assert_eq!(banner.crossfade.steps, 20);
        assert_eq!(banner.hold(), Duration::from_millis(18_000));
        assert_eq!(banner.min_tail, Duration::from_secs(15));
    }

    #[test]
    fn progress_fraction_and_readout() {
        let unknown = Progress {
            position: Duration::from_secs(10),
            duration: None,
        };
        assert_eq!(unknown.fraction(), 0.0);
        assert_eq!(unknown.readout(), "0:10 / 0:00");

        let known = Progress {
            position: Duration::from_secs(30),
            duration: Some(Duration::from_secs(120)),
        };
        assert!((known.fraction() - 0.25).abs() < 1e-9);
        assert_eq!(known.readout(), "0:30 / 2:00");
    }
}
