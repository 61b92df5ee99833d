//! Foreground player - sequential playlist playback on one channel
//!
//! Owns the playlist and cursor, drives a single [`AudioChannel`] and turns
//! channel notifications into [`PlayerEvent`]s. Reaching the end of a track
//! advances to the next one; the playlist loops indefinitely.

use crate::{
    channel::{AudioChannel, ChannelEvent},
    error::{PlaybackError, Result},
    events::PlayerEvent,
    shuffle::fisher_yates,
    types::{NowPlaying, PlayerConfig, Progress},
};
use folio_core::PlayableTrack;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 256;

#[derive(Default)]
struct PlayerInner {
    playlist: Vec<PlayableTrack>,
    cursor: usize,
    is_playing: bool,
    shuffled: bool,
    progress: Progress,
}

struct PlayerShared<C: AudioChannel> {
    channel: Arc<C>,
    config: PlayerConfig,
    inner: Mutex<PlayerInner>,
    events: broadcast::Sender<PlayerEvent>,
    rng: Mutex<StdRng>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<C: AudioChannel> Drop for PlayerShared<C> {
    fn drop(&mut self) {
        if let Some(listener) = lock(&self.listener).take() {
            listener.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Foreground playback engine
///
/// Cheap to clone; clones share the same playlist and channel. Must be created
/// inside a tokio runtime (a background task follows the channel's events).
pub struct Player<C: AudioChannel> {
    shared: Arc<PlayerShared<C>>,
}

impl<C: AudioChannel> Clone for Player<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: AudioChannel> Player<C> {
    /// Create a player that owns `channel`
    pub fn new(channel: C, config: PlayerConfig) -> Self {
        Self::with_channel(Arc::new(channel), config)
    }

    /// Create a player on a shared channel
    pub fn with_channel(channel: Arc<C>, config: PlayerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        channel.set_volume(config.volume);
        let channel_events = channel.subscribe();

        let shared = Arc::new(PlayerShared {
            channel,
            config,
            inner: Mutex::new(PlayerInner::default()),
            events,
            rng: Mutex::new(rng),
            listener: Mutex::new(None),
        });

        let listener = tokio::spawn(follow_channel(Arc::downgrade(&shared), channel_events));
        *lock(&shared.listener) = Some(listener);

        Self { shared }
    }

    // ===== Playlist =====

    /// Replace the playlist and start playing it
    ///
    /// With `shuffle` the copy is shuffled and playback starts at its first
    /// entry; otherwise playback starts at `start_index`. A playback start
    /// failure is logged and leaves the player paused; only an empty list or
    /// an out-of-range start index are returned as errors.
    pub async fn play_playlist(
        &self,
        tracks: Vec<PlayableTrack>,
        shuffle: bool,
        start_index: usize,
    ) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::PlaylistEmpty);
        }

        let mut playlist = tracks;
        let cursor = if shuffle {
            fisher_yates(&mut playlist, &mut *lock(&self.shared.rng));
            0
        } else if start_index >= playlist.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index: start_index,
                len: playlist.len(),
            });
        } else {
            start_index
        };

        let length = playlist.len();
        {
            let mut inner = self.inner();
            inner.playlist = playlist;
            inner.cursor = cursor;
            inner.shuffled = shuffle;
        }

        info!(length, shuffled = shuffle, cursor, "Playlist replaced");
        self.emit(PlayerEvent::PlaylistChanged {
            length,
            shuffled: shuffle,
        });

        self.load_current();
        self.play().await;
        Ok(())
    }

    // ===== Transport =====

    /// Start or resume the current track
    ///
    /// A refused start is logged and the player stays paused; there is no retry.
    pub async fn play(&self) {
        match self.shared.channel.play().await {
            Ok(()) => {
                self.inner().is_playing = true;
                debug!("Playback started");
                self.emit(PlayerEvent::StateChanged { playing: true });
            }
            Err(e) => {
                let was_playing = std::mem::replace(&mut self.inner().is_playing, false);
                error!(error = %e, "Playback failed to start");
                self.emit(PlayerEvent::Error {
                    message: e.to_string(),
                });
                if was_playing {
                    self.emit(PlayerEvent::StateChanged { playing: false });
                }
            }
        }
    }

    /// Pause playback
    pub fn pause(&self) {
        self.shared.channel.pause();
        let was_playing = std::mem::replace(&mut self.inner().is_playing, false);
        if was_playing {
            debug!("Playback paused");
            self.emit(PlayerEvent::StateChanged { playing: false });
        }
    }

    /// Pause when playing, play otherwise
    pub async fn toggle_play(&self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play().await;
        }
    }

    /// Advance to the next track, wrapping to the first after the last
    ///
    /// Does nothing while the playlist is empty.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&self) {
        let cursor = {
            let mut inner = self.inner();
            if inner.playlist.is_empty() {
                return;
            }
            inner.cursor = (inner.cursor + 1) % inner.playlist.len();
            inner.cursor
        };

        debug!(cursor, "Next track");
        self.load_current();
        self.play().await;
    }

    /// Go back
    ///
    /// Past the restart threshold (3s by default) this rewinds the current
    /// track. Otherwise it moves to the previous track; on the first track it
    /// does nothing.
    pub async fn prev(&self) {
        let position = self.shared.channel.position();
        if position > self.shared.config.prev_restart_threshold {
            debug!(?position, "Restarting current track");
            self.seek_to(Duration::ZERO);
            return;
        }

        let cursor = {
            let mut inner = self.inner();
            if inner.playlist.is_empty() || inner.cursor == 0 {
                return;
            }
            inner.cursor -= 1;
            inner.cursor
        };

        debug!(cursor, "Previous track");
        self.load_current();
        self.play().await;
    }

    /// Move the playhead of the current track
    pub fn seek_to(&self, position: Duration) {
        self.shared.channel.seek(position);
        self.inner().progress.position = self.shared.channel.position();
    }

    /// Set volume (clamped to 0.0-1.0)
    pub fn set_volume(&self, volume: f32) {
        self.shared.channel.set_volume(volume);
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.shared.channel.volume(),
        });
    }

    pub fn volume(&self) -> f32 {
        self.shared.channel.volume()
    }

    // ===== Queries =====

    /// Title, album and cover of the track at the cursor
    pub fn now_playing(&self) -> Option<NowPlaying> {
        let inner = self.inner();
        inner
            .playlist
            .get(inner.cursor)
            .map(|track| NowPlaying::from_track(inner.cursor, track))
    }

    pub fn progress(&self) -> Progress {
        self.inner().progress
    }

    pub fn is_playing(&self) -> bool {
        self.inner().is_playing
    }

    pub fn is_shuffled(&self) -> bool {
        self.inner().shuffled
    }

    pub fn cursor(&self) -> usize {
        self.inner().cursor
    }

    /// Copy of the current playlist, in play order
    pub fn playlist(&self) -> Vec<PlayableTrack> {
        self.inner().playlist.clone()
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.shared.events.subscribe()
    }

    /// The channel this player drives
    pub fn channel(&self) -> &Arc<C> {
        &self.shared.channel
    }

    // ===== Internals =====

    fn inner(&self) -> MutexGuard<'_, PlayerInner> {
        lock(&self.shared.inner)
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine
        let _ = self.shared.events.send(event);
    }

    /// Load the track at the cursor into the channel
    fn load_current(&self) {
        let loaded = {
            let mut inner = self.inner();
            inner.progress = Progress::default();
            inner
                .playlist
                .get(inner.cursor)
                .map(|track| (track.src.clone(), NowPlaying::from_track(inner.cursor, track)))
        };

        let Some((src, now_playing)) = loaded else {
            return;
        };

        debug!(src = %src, title = %now_playing.title, "Loading track");
        self.shared.channel.load(&src);
        self.emit(PlayerEvent::TrackChanged(now_playing));
    }

    fn handle_channel_event(&self, event: ChannelEvent) -> bool {
        match event {
            ChannelEvent::TimeUpdate { position } => {
                let duration = {
                    let mut inner = self.inner();
                    inner.progress.position = position;
                    inner.progress.duration
                };
                self.emit(PlayerEvent::PositionUpdate {
                    position_ms: millis(position),
                    duration_ms: duration.map(millis),
                });
                false
            }
            ChannelEvent::MetadataLoaded { duration } => {
                self.inner().progress.duration = Some(duration);
                self.emit(PlayerEvent::DurationKnown {
                    duration_ms: millis(duration),
                });
                false
            }
            ChannelEvent::Ended => true,
            ChannelEvent::Playing | ChannelEvent::Paused => false,
        }
    }
}

/// Follow channel notifications for as long as the player lives
async fn follow_channel<C: AudioChannel>(
    shared: Weak<PlayerShared<C>>,
    mut events: broadcast::Receiver<ChannelEvent>,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Player fell behind channel events");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };

        let Some(shared) = shared.upgrade() else {
            return;
        };
        let player = Player { shared };

        if player.handle_channel_event(event) {
            debug!("Track ended, advancing");
            player.next().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedChannel;
    use crate::types::SimulationSettings;
    use folio_core::Catalog;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"albums":[{"id":"a","title":"A","cover":"a.jpg","tracks":[
                {"title":"One","src":"a1.mp3"},
                {"title":"Two","src":"a2.mp3"},
                {"title":"Three","src":"a3.mp3"}]}],"totalSongs":3}"#,
        )
        .unwrap()
    }

    fn player() -> Player<SimulatedChannel> {
        let settings = SimulationSettings {
            track_duration: Duration::from_secs(10),
            ..SimulationSettings::default()
        };
        Player::new(
            SimulatedChannel::new("main", settings),
            PlayerConfig {
                seed: Some(1),
                ..PlayerConfig::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_playlist_starts_at_index() {
        let player = player();
        let tracks = catalog().album_tracks("a").unwrap();

        player.play_playlist(tracks, false, 1).await.unwrap();

        assert_eq!(player.cursor(), 1);
        assert!(player.is_playing());
        assert_eq!(player.now_playing().unwrap().title, "Two");
        assert_eq!(player.channel().source().as_deref(), Some("a2.mp3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_playlist_rejected() {
        let player = player();
        assert_eq!(
            player.play_playlist(vec![], false, 0).await,
            Err(PlaybackError::PlaylistEmpty)
        );
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_start_rejected() {
        let player = player();
        let tracks = catalog().album_tracks("a").unwrap();
        assert_eq!(
            player.play_playlist(tracks, false, 3).await,
            Err(PlaybackError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert!(player.playlist().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shuffle_resets_cursor() {
        let player = player();
        let tracks = catalog().album_tracks("a").unwrap();

        // Start index is ignored when shuffling
        player.play_playlist(tracks, true, 2).await.unwrap();

        assert_eq!(player.cursor(), 0);
        assert!(player.is_shuffled());
        assert_eq!(player.playlist().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_play() {
        let player = player();
        player
            .play_playlist(catalog().album_tracks("a").unwrap(), false, 0)
            .await
            .unwrap();

        player.toggle_play().await;
        assert!(!player.is_playing());
        assert!(player.channel().is_paused());

        player.toggle_play().await;
        assert!(player.is_playing());
        assert!(!player.channel().is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_on_empty_playlist_is_noop() {
        let player = player();
        player.next().await;
        player.prev().await;
        assert_eq!(player.cursor(), 0);
        assert!(player.now_playing().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_volume_is_clamped_and_announced() {
        let player = player();
        let mut events = player.subscribe();

        player.set_volume(1.5);
        assert_eq!(player.volume(), 1.0);
        assert_eq!(
            events.recv().await.unwrap(),
            PlayerEvent::VolumeChanged { volume: 1.0 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_tracks_channel() {
        let player = player();
        player
            .play_playlist(catalog().album_tracks("a").unwrap(), false, 0)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let progress = player.progress();
        assert_eq!(progress.duration, Some(Duration::from_secs(10)));
        assert!(progress.position >= Duration::from_millis(750));
        assert!(progress.fraction() > 0.0);
    }
}
