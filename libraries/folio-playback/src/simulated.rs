//! Clock-driven audio channel
//!
//! `SimulatedChannel` behaves like a media element without producing sound:
//! metadata arrives after a short delay, the playhead advances with the tokio
//! clock, progress is reported on a fixed tick and the end of the source is
//! announced once per playthrough. It backs the terminal front-end and makes
//! engine tests deterministic under a paused tokio clock.

use crate::channel::{AudioChannel, ChannelEvent};
use crate::error::{PlaybackError, Result};
use crate::types::SimulationSettings;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Maps a source URI to its duration; `None` means metadata never arrives
pub type DurationResolver = Arc<dyn Fn(&str) -> Option<Duration> + Send + Sync>;

const EVENT_CAPACITY: usize = 64;

struct SimState {
    source: Option<String>,
    duration: Option<Duration>,
    volume: f32,
    /// Playhead when the clock last (re)started
    offset: Duration,
    /// Set while playing
    started_at: Option<Instant>,
    autoplay_denied: bool,
    metadata_task: Option<JoinHandle<()>>,
    clock_task: Option<JoinHandle<()>>,
}

impl SimState {
    fn position(&self, now: Instant) -> Duration {
        let raw = match self.started_at {
            Some(start) => self.offset + now.saturating_duration_since(start),
            None => self.offset,
        };

        match self.duration {
            Some(duration) => raw.min(duration),
            None => raw,
        }
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    fn abort_tasks(&mut self) {
        if let Some(task) = self.metadata_task.take() {
            task.abort();
        }
        if let Some(task) = self.clock_task.take() {
            task.abort();
        }
    }
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Audio channel simulated on the tokio clock
pub struct SimulatedChannel {
    name: String,
    state: Arc<Mutex<SimState>>,
    events: broadcast::Sender<ChannelEvent>,
    resolver: DurationResolver,
    settings: SimulationSettings,
}

impl SimulatedChannel {
    /// Create a channel where every source lasts `settings.track_duration`
    pub fn new(name: impl Into<String>, settings: SimulationSettings) -> Self {
        let duration = settings.track_duration;
        Self::with_resolver(name, settings, Arc::new(move |_: &str| Some(duration)))
    }

    /// Create a channel with per-source durations
    pub fn with_resolver(
        name: impl Into<String>,
        settings: SimulationSettings,
        resolver: DurationResolver,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(SimState {
                source: None,
                duration: None,
                volume: 1.0,
                offset: Duration::ZERO,
                started_at: None,
                autoplay_denied: settings.autoplay_denied,
                metadata_task: None,
                clock_task: None,
            })),
            events,
            resolver,
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make every subsequent `play()` fail, like a browser autoplay policy
    pub fn set_autoplay_denied(&self, denied: bool) {
        lock(&self.state).autoplay_denied = denied;
    }

    fn emit(&self, event: ChannelEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn spawn_metadata(&self, uri: &str) -> JoinHandle<()> {
        let resolved = (self.resolver)(uri);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let delay = self.settings.metadata_delay;
        let name = self.name.clone();
        let uri = uri.to_string();

        tokio::spawn(async move {
            let Some(duration) = resolved else {
                debug!(channel = %name, uri = %uri, "Source has no metadata");
                return;
            };

            sleep(delay).await;

            {
                let mut state = lock(&state);
                if state.source.as_deref() != Some(uri.as_str()) {
                    return;
                }
                state.duration = Some(duration);
            }

            debug!(channel = %name, uri = %uri, ?duration, "Metadata loaded");
            let _ = events.send(ChannelEvent::MetadataLoaded { duration });
        })
    }

    fn spawn_clock(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let tick = self.settings.tick;

        tokio::spawn(async move {
            loop {
                let wait = {
                    let state = lock(&state);
                    match state.duration {
                        Some(duration) => duration
                            .saturating_sub(state.position(Instant::now()))
                            .min(tick),
                        None => tick,
                    }
                };

                sleep(wait).await;

                let (position, ended) = {
                    let mut state = lock(&state);
                    if !state.is_playing() {
                        return;
                    }

                    let position = state.position(Instant::now());
                    let ended = state.duration.is_some_and(|duration| position >= duration);
                    if ended {
                        state.offset = position;
                        state.started_at = None;
                        state.clock_task = None;
                    }
                    (position, ended)
                };

                let _ = events.send(ChannelEvent::TimeUpdate { position });

                if ended {
                    let _ = events.send(ChannelEvent::Paused);
                    let _ = events.send(ChannelEvent::Ended);
                    return;
                }
            }
        })
    }
}

#[async_trait]
impl AudioChannel for SimulatedChannel {
    fn load(&self, uri: &str) {
        let was_playing = {
            let mut state = lock(&self.state);
            let was_playing = state.is_playing();
            state.abort_tasks();
            state.source = Some(uri.to_string());
            state.duration = None;
            state.offset = Duration::ZERO;
            state.started_at = None;
            state.metadata_task = Some(self.spawn_metadata(uri));
            was_playing
        };

        if was_playing {
            self.emit(ChannelEvent::Paused);
        }
    }

    fn source(&self) -> Option<String> {
        lock(&self.state).source.clone()
    }

    async fn play(&self) -> Result<()> {
        {
            let mut state = lock(&self.state);

            if state.autoplay_denied {
                return Err(PlaybackError::PlaybackStart(
                    "play() request was denied by the autoplay policy".to_string(),
                ));
            }
            if state.source.is_none() {
                return Err(PlaybackError::NoSource);
            }
            if state.is_playing() {
                return Ok(());
            }

            // Playing a finished source starts it over
            if state.duration.is_some_and(|duration| state.offset >= duration) {
                state.offset = Duration::ZERO;
            }

            state.started_at = Some(Instant::now());
            state.clock_task = Some(self.spawn_clock());
        }

        self.emit(ChannelEvent::Playing);
        Ok(())
    }

    fn pause(&self) {
        let was_playing = {
            let mut state = lock(&self.state);
            if state.is_playing() {
                state.offset = state.position(Instant::now());
                state.started_at = None;
                if let Some(task) = state.clock_task.take() {
                    task.abort();
                }
                true
            } else {
                false
            }
        };

        if was_playing {
            self.emit(ChannelEvent::Paused);
        }
    }

    fn seek(&self, position: Duration) {
        let target = {
            let mut state = lock(&self.state);
            let target = match state.duration {
                Some(duration) => position.min(duration),
                None => position,
            };
            state.offset = target;
            if state.is_playing() {
                state.started_at = Some(Instant::now());
            }
            target
        };

        self.emit(ChannelEvent::TimeUpdate { position: target });
    }

    fn volume(&self) -> f32 {
        lock(&self.state).volume
    }

    fn set_volume(&self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        lock(&self.state).volume = volume;
    }

    fn duration(&self) -> Option<Duration> {
        lock(&self.state).duration
    }

    fn position(&self) -> Duration {
        lock(&self.state).position(Instant::now())
    }

    fn is_paused(&self) -> bool {
        !lock(&self.state).is_playing()
    }

    fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }
}

impl Drop for SimulatedChannel {
    fn drop(&mut self) {
        lock(&self.state).abort_tasks();
    }
}
