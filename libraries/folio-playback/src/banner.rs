//! Mashup banner - random clips crossfading between two channels
//!
//! While playing, the banner repeatedly picks a random track from the pool,
//! starts it at a random offset on the channel whose turn it is and fades it
//! in. After `clip - crossfade` the next clip starts on the other channel while
//! the current one fades out and pauses, so at most two channels are audible
//! and only during a crossfade.
//!
//! # State machine
//!
//! ```text
//! Idle --start--> Playing --stop--> Stopped --start--> Playing ...
//! ```
//!
//! Every `start()` opens a new session. The clip cycle runs on one task per
//! session and checks the session before each step, so a quick stop/start
//! never lets an old cycle touch the channels.

use crate::{
    channel::{wait_for_metadata, AudioChannel},
    error::PlaybackError,
    events::{BannerEvent, PlayerEvent},
    fade::spawn_fade,
    player::Player,
    shuffle::random_start_offset,
    types::{BannerConfig, BannerDisplay, BannerState},
};
use folio_core::{Catalog, PlayableTrack};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Caption shown before the banner is first started
pub const IDLE_CAPTION: &str = "Click to Play Mashup";

/// Caption shown while the first clip loads
pub const LOADING_CAPTION: &str = "Loading...";

struct BannerInner {
    state: BannerState,
    session: u64,
    /// Channel slot whose turn it is
    active: usize,
    display: BannerDisplay,
    cycle: Option<JoinHandle<()>>,
    /// In-flight fade per channel slot
    fades: [Option<JoinHandle<()>>; 2],
    watchers: Vec<JoinHandle<()>>,
}

impl BannerInner {
    fn abort_playback(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            cycle.abort();
        }
        for fade in self.fades.iter_mut().filter_map(Option::take) {
            fade.abort();
        }
    }
}

struct BannerShared<C: AudioChannel> {
    channels: [Arc<C>; 2],
    pool: Vec<PlayableTrack>,
    config: BannerConfig,
    inner: Mutex<BannerInner>,
    events: broadcast::Sender<BannerEvent>,
    rng: Mutex<StdRng>,
}

impl<C: AudioChannel> Drop for BannerShared<C> {
    fn drop(&mut self) {
        let mut inner = lock(&self.inner);
        inner.abort_playback();
        for watcher in inner.watchers.drain(..) {
            watcher.abort();
        }
        drop(inner);

        for channel in &self.channels {
            channel.pause();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Background mashup engine
///
/// Cheap to clone; clones control the same banner. `start()` and
/// `stop_on_playback()` spawn tasks and must be called inside a tokio runtime.
pub struct Banner<C: AudioChannel> {
    shared: Arc<BannerShared<C>>,
}

impl<C: AudioChannel> Clone for Banner<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: AudioChannel> Banner<C> {
    /// Create a banner whose pool is every track in the catalog
    pub fn new(catalog: &Catalog, channels: [C; 2], config: BannerConfig) -> Self {
        Self::with_pool(catalog.all_tracks(), channels.map(Arc::new), config)
    }

    /// Create a banner over an explicit track pool
    pub fn with_pool(pool: Vec<PlayableTrack>, channels: [Arc<C>; 2], config: BannerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let display = BannerDisplay {
            caption: IDLE_CAPTION.to_string(),
            cover: config.placeholder_cover.clone(),
            visible: false,
            active: false,
            cue: 0,
        };

        debug!(pool = pool.len(), "Banner created");

        Self {
            shared: Arc::new(BannerShared {
                channels,
                pool,
                config,
                inner: Mutex::new(BannerInner {
                    state: BannerState::Idle,
                    session: 0,
                    active: 0,
                    display,
                    cycle: None,
                    fades: [None, None],
                    watchers: Vec::new(),
                }),
                events,
                rng: Mutex::new(rng),
            }),
        }
    }

    // ===== Lifecycle =====

    /// Start the clip cycle
    ///
    /// Does nothing when already playing or when there is nothing to play.
    pub fn start(&self) {
        if self.shared.pool.is_empty() {
            warn!("Mashup pool is empty, banner not started");
            return;
        }

        let (session, display) = {
            let mut inner = self.inner();
            if inner.state == BannerState::Playing {
                return;
            }

            inner.state = BannerState::Playing;
            inner.session += 1;
            inner.active = 0;
            inner.display.active = true;
            inner.display.caption = LOADING_CAPTION.to_string();
            (inner.session, inner.display.clone())
        };

        info!(session, "Banner started");
        self.emit(BannerEvent::StateChanged {
            state: BannerState::Playing,
        });
        self.emit(BannerEvent::NowPlaying(display));

        let cycle = tokio::spawn(run_session(Arc::downgrade(&self.shared), session));

        let mut inner = self.inner();
        if inner.session == session && inner.state == BannerState::Playing {
            inner.cycle = Some(cycle);
        } else {
            // Stopped before the handle could be stored
            cycle.abort();
        }
    }

    /// Stop all banner audio
    ///
    /// Cancels the pending clip cycle and in-flight fades and pauses both
    /// channels. Safe to call in any state.
    pub fn stop(&self) {
        let previous = {
            let mut inner = self.inner();
            let previous = inner.state;
            inner.state = BannerState::Stopped;
            inner.display.active = false;
            inner.abort_playback();
            previous
        };

        for channel in &self.shared.channels {
            channel.pause();
        }

        if previous != BannerState::Stopped {
            info!("Banner stopped");
            self.emit(BannerEvent::StateChanged {
                state: BannerState::Stopped,
            });
        }
    }

    /// Stop when playing, start otherwise
    pub fn toggle(&self) {
        if self.state() == BannerState::Playing {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Make the banner visible; never starts playback
    pub fn show(&self) {
        self.set_visible(true);
    }

    /// Hide the banner and stop its audio
    pub fn hide(&self) {
        self.set_visible(false);
        self.stop();
    }

    /// Stop the banner whenever the foreground player starts playing
    pub fn stop_on_playback(&self, mut player_events: broadcast::Receiver<PlayerEvent>) {
        let banner = Arc::downgrade(&self.shared);

        let watcher = tokio::spawn(async move {
            loop {
                match player_events.recv().await {
                    Ok(event) if event.is_play() => {
                        let Some(shared) = banner.upgrade() else {
                            return;
                        };
                        debug!("Foreground playback started, stopping banner");
                        Banner { shared }.stop();
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Banner fell behind player events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });

        let mut inner = self.inner();
        inner.watchers.retain(|watcher| !watcher.is_finished());
        inner.watchers.push(watcher);
    }

    /// Stop the banner whenever `player` starts playing
    pub fn follow<P: AudioChannel>(&self, player: &Player<P>) {
        self.stop_on_playback(player.subscribe());
    }

    // ===== Queries =====

    pub fn state(&self) -> BannerState {
        self.inner().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == BannerState::Playing
    }

    /// Caption, cover and styling to render
    pub fn display(&self) -> BannerDisplay {
        self.inner().display.clone()
    }

    pub fn pool_size(&self) -> usize {
        self.shared.pool.len()
    }

    pub fn channels(&self) -> &[Arc<C>; 2] {
        &self.shared.channels
    }

    /// Subscribe to banner events
    pub fn subscribe(&self) -> broadcast::Receiver<BannerEvent> {
        self.shared.events.subscribe()
    }

    // ===== Internals =====

    fn inner(&self) -> MutexGuard<'_, BannerInner> {
        lock(&self.shared.inner)
    }

    fn emit(&self, event: BannerEvent) {
        // No subscribers is fine
        let _ = self.shared.events.send(event);
    }

    fn set_visible(&self, visible: bool) {
        let changed = {
            let mut inner = self.inner();
            std::mem::replace(&mut inner.display.visible, visible) != visible
        };
        if changed {
            self.emit(BannerEvent::VisibilityChanged { visible });
        }
    }

    fn is_current(&self, session: u64) -> bool {
        let inner = self.inner();
        inner.session == session && inner.state == BannerState::Playing
    }

    fn pick_track(&self) -> Option<PlayableTrack> {
        self.shared.pool.choose(&mut *lock(&self.shared.rng)).cloned()
    }

    fn start_offset(&self, duration: Duration) -> Duration {
        random_start_offset(
            duration,
            self.shared.config.min_tail,
            &mut *lock(&self.shared.rng),
        )
    }

    /// Keep a fade handle so `stop()` can cancel it
    ///
    /// A slot runs one fade at a time; a new fade replaces the previous one.
    fn track_fade(&self, session: u64, slot: usize, fade: JoinHandle<()>) {
        let mut inner = self.inner();
        if inner.session != session || inner.state != BannerState::Playing {
            fade.abort();
            return;
        }
        if let Some(previous) = inner.fades[slot].replace(fade) {
            previous.abort();
        }
    }

    /// Cancel whatever fade is still running on `slot`
    fn cancel_fade(&self, slot: usize) {
        if let Some(fade) = self.inner().fades[slot].take() {
            fade.abort();
        }
    }

    fn report_failure(&self, error: &PlaybackError) {
        self.emit(BannerEvent::Error {
            message: error.to_string(),
        });
    }

    /// Show the clip that just started
    fn announce(&self, session: u64, track: &PlayableTrack) {
        let display = {
            let mut inner = self.inner();
            if inner.session != session {
                return;
            }
            inner.display.caption = format!("{} - {}", track.title, track.album_title());
            inner.display.cover = track.cover.clone();
            inner.display.cue += 1;
            inner.display.clone()
        };

        info!(title = %track.title, album = %track.album_title(), "Mashup clip");
        self.emit(BannerEvent::NowPlaying(display));
    }

    /// Hand the turn to the other channel
    fn swap_active(&self) -> usize {
        let mut inner = self.inner();
        inner.active = 1 - inner.active;
        inner.active
    }

    fn active_slot(&self) -> usize {
        self.inner().active
    }
}

/// Upgrade to a banner still running `session`
fn current<C: AudioChannel>(shared: &Weak<BannerShared<C>>, session: u64) -> Option<Banner<C>> {
    let banner = Banner {
        shared: shared.upgrade()?,
    };
    banner.is_current(session).then_some(banner)
}

/// Clip cycle for one session
///
/// Holds the banner only weakly between steps so dropping the banner ends it.
async fn run_session<C: AudioChannel>(shared: Weak<BannerShared<C>>, session: u64) {
    loop {
        let Some(banner) = current(&shared, session) else {
            return;
        };
        let Some(track) = banner.pick_track() else {
            return;
        };
        let slot = banner.active_slot();
        let channel = Arc::clone(&banner.shared.channels[slot]);
        let config = banner.shared.config.clone();
        // An unfinished fade-out would pause the new clip
        banner.cancel_fade(slot);
        drop(banner);

        // Subscribe before loading so the readiness notification can't be missed
        let mut events = channel.subscribe();
        channel.load(&track.src);
        debug!(slot, src = %track.src, "Loading mashup clip");

        let duration = match timeout(config.metadata_timeout, wait_for_metadata(&mut events)).await {
            Ok(Some(duration)) => duration,
            Ok(None) => return,
            Err(_) => {
                let error = PlaybackError::MetadataUnavailable(track.src.clone());
                warn!(slot, error = %error, "Skipping clip");
                if let Some(banner) = current(&shared, session) {
                    banner.report_failure(&error);
                }
                continue;
            }
        };

        let Some(banner) = current(&shared, session) else {
            return;
        };

        let offset = banner.start_offset(duration);
        channel.seek(offset);
        channel.set_volume(0.0);
        debug!(slot, ?offset, ?duration, "Starting mashup clip");

        if let Err(e) = channel.play().await {
            error!(slot, error = %e, "Banner play failed");
            banner.report_failure(&e);
        }

        if !banner.is_current(session) {
            channel.pause();
            return;
        }

        banner.track_fade(
            session,
            slot,
            spawn_fade(Arc::clone(&channel), 0.0, 1.0, config.crossfade),
        );
        banner.announce(session, &track);
        drop(banner);

        sleep(config.hold()).await;

        let Some(banner) = current(&shared, session) else {
            return;
        };

        // Fade out this clip while the next one starts on the other channel
        let from = channel.volume();
        banner.track_fade(session, slot, spawn_fade(channel, from, 0.0, config.crossfade));
        let next = banner.swap_active();
        debug!(next, "Crossfading to next clip");
    }
}
