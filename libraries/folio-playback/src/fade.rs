//! Stepped volume fades for channel crossfades
//!
//! A fade moves a channel's volume between two levels in a fixed number of
//! equal timer steps. Volume changes linearly with each step.

use crate::channel::AudioChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::trace;

/// Fade timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FadeSettings {
    /// Total fade duration (default: 2000ms)
    pub duration: Duration,

    /// Number of volume steps (default: 20)
    pub steps: u32,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(2000),
            steps: 20,
        }
    }
}

impl FadeSettings {
    /// Time between two volume steps
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps.max(1)
    }

    /// Volume after `step` of the fade from `from` to `to`
    ///
    /// The last step lands exactly on `to`.
    pub fn volume_at(&self, step: u32, from: f32, to: f32) -> f32 {
        let steps = self.steps.max(1);
        if step >= steps {
            return to.clamp(0.0, 1.0);
        }
        let position = step as f32 / steps as f32;
        (from + (to - from) * position).clamp(0.0, 1.0)
    }
}

/// Fade a channel's volume from `from` to `to`
///
/// The first step lands one step interval after the call. A fade that ends at
/// silence pauses the channel.
pub async fn fade<C: AudioChannel + ?Sized>(channel: &C, from: f32, to: f32, settings: FadeSettings) {
    let steps = settings.steps.max(1);
    let step = settings.step_interval();
    let mut ticker = interval_at(Instant::now() + step, step);

    for count in 1..=steps {
        ticker.tick().await;
        let volume = settings.volume_at(count, from, to);
        channel.set_volume(volume);
        trace!(step = count, volume, "Fade step");
    }

    if to <= 0.0 {
        channel.pause();
    }
}

/// Run a fade on its own task
pub fn spawn_fade<C: AudioChannel>(
    channel: Arc<C>,
    from: f32,
    to: f32,
    settings: FadeSettings,
) -> JoinHandle<()> {
    tokio::spawn(async move { fade(channel.as_ref(), from, to, settings).await })
}
