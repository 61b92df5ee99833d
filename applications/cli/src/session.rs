//! Engine wiring for the terminal front-end
//!
//! Builds the player and banner on simulated channels, runs them for a
//! wall-clock span and prints what a page would show.

use crate::config::{CatalogSettings, FolioConfig};
use crate::error::CliError;
use crate::view;
use anyhow::{bail, Context};
use folio_catalog_client::CatalogClient;
use folio_core::{Catalog, PlayableTrack, ViewState};
use folio_playback::{
    AudioChannel, Banner, BannerEvent, BannerState, Player, PlayerEvent, SimulatedChannel,
};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};
use url::Url;

/// Interval between progress lines while playing
const PROGRESS_EVERY: Duration = Duration::from_secs(5);

/// Fetch or read the catalog named by the config
pub async fn load_catalog(settings: &CatalogSettings) -> anyhow::Result<Catalog> {
    if let Some(url) = &settings.url {
        let client = CatalogClient::new(url)?;
        return client
            .fetch()
            .await
            .with_context(|| format!("Failed to fetch catalog from {}", url));
    }

    if let Some(path) = &settings.path {
        return Catalog::load(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()));
    }

    bail!("No catalog source configured")
}

/// A loaded catalog plus the settings to build engines with
pub struct Session {
    config: FolioConfig,
    catalog: Catalog,
}

impl Session {
    pub fn new(config: FolioConfig, catalog: Catalog) -> Self {
        info!(
            albums = catalog.albums().len(),
            songs = catalog.total_songs(),
            "Session ready"
        );
        Self { config, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn channel(&self, name: &str) -> SimulatedChannel {
        SimulatedChannel::new(name, self.config.simulation_settings())
    }

    /// Foreground player on its own channel
    pub fn player(&self) -> Player<SimulatedChannel> {
        Player::new(self.channel("player"), self.config.player_config())
    }

    /// Banner over the whole catalog on two channels
    pub fn banner(&self) -> Banner<SimulatedChannel> {
        Banner::new(
            &self.catalog,
            [self.channel("banner-a"), self.channel("banner-b")],
            self.config.banner_config(),
        )
    }

    /// Play an album from `track` (0-based), or shuffled
    pub async fn play_album(
        &self,
        id: &str,
        track: Option<usize>,
        shuffle: bool,
        span: Duration,
    ) -> anyhow::Result<()> {
        let tracks = self.catalog.album_tracks(id).map_err(CliError::from)?;
        run_player(&self.player(), tracks, shuffle, track.unwrap_or(0), span)
            .await
            .with_context(|| format!("Cannot play album {}", id))
    }

    /// Shuffle every track in the catalog
    pub async fn shuffle_all(&self, span: Duration) -> anyhow::Result<()> {
        run_player(&self.player(), self.catalog.all_tracks(), true, 0, span)
            .await
            .context("Catalog has no tracks")
    }

    /// Run the mashup banner, then optionally start an album on the player
    ///
    /// The banner follows the player like it does on the page, so starting
    /// the album stops the mashup. Returns the banner state just before it
    /// is hidden.
    pub async fn mashup(
        &self,
        span: Duration,
        then_play: Option<&str>,
    ) -> anyhow::Result<BannerState> {
        let handover = then_play
            .map(|id| self.catalog.album_tracks(id).map(|tracks| (id, tracks)))
            .transpose()
            .map_err(CliError::from)?;

        let player = self.player();
        let banner = self.banner();
        banner.follow(&player);

        println!("{}", view::banner(&banner.display()));
        banner.show();
        banner.start();
        if !banner.is_playing() {
            bail!("Nothing to play in the mashup");
        }

        print_banner(banner.subscribe(), span).await;

        if let Some((id, tracks)) = handover {
            info!(album = id, "Handing over from the mashup to the player");
            let watch = tokio::spawn(print_banner(banner.subscribe(), span));
            run_player(&player, tracks, false, 0, span)
                .await
                .with_context(|| format!("Cannot play album {}", id))?;
            watch.await?;

            if banner.is_playing() {
                warn!("Banner kept playing after the player started");
            }
        }

        let state = banner.state();
        banner.hide();
        Ok(state)
    }

    /// Build a share link for a view
    pub fn share_link(&self, album: Option<String>, track: Option<usize>) -> anyhow::Result<Url> {
        let base = self.config.share_base()?;
        let state = match album {
            Some(id) => {
                if self.catalog.album(&id).is_none() {
                    return Err(CliError::from(folio_core::CatalogError::AlbumNotFound(id)).into());
                }
                ViewState::Album { id, track }
            }
            None => ViewState::Grid,
        };

        Ok(state.resolve(&self.catalog).share_url(&base))
    }

    /// Open a share link: show the view it names and play its track, if any
    pub async fn open(&self, link: &str, span: Duration) -> anyhow::Result<ViewState> {
        let state = ViewState::parse_link(link)
            .map_err(CliError::from)?
            .resolve(&self.catalog);
        debug!(?state, "Opened share link");

        match &state {
            ViewState::Grid => print!("{}", view::grid(&self.catalog)),
            ViewState::Album { id, track } => {
                if let Some(album) = self.catalog.album(id) {
                    print!("{}", view::album_detail(album, *track));
                }
                if track.is_some() {
                    self.play_album(id, *track, false, span).await?;
                }
            }
        }

        Ok(state)
    }
}

/// Start `tracks` on `player` and print its activity for `span`
async fn run_player<C: AudioChannel>(
    player: &Player<C>,
    tracks: Vec<PlayableTrack>,
    shuffle: bool,
    start: usize,
    span: Duration,
) -> anyhow::Result<()> {
    let watch = tokio::spawn(print_player(player.clone(), player.subscribe(), span));

    if let Err(e) = player.play_playlist(tracks, shuffle, start).await {
        watch.abort();
        return Err(CliError::from(e).into());
    }

    watch.await?;
    player.pause();
    Ok(())
}

/// Print banner events until `span` elapses
async fn print_banner(mut events: broadcast::Receiver<BannerEvent>, span: Duration) {
    let deadline = sleep(span);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = view::banner_event(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }
}

/// Print player events and a periodic progress line until `span` elapses
async fn print_player<C: AudioChannel>(
    player: Player<C>,
    mut events: broadcast::Receiver<PlayerEvent>,
    span: Duration,
) {
    let deadline = sleep(span);
    tokio::pin!(deadline);

    let mut progress = interval(PROGRESS_EVERY);
    progress.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    progress.tick().await;

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = progress.tick() => {
                if player.is_playing() {
                    if let Some(now) = player.now_playing() {
                        println!("  {}", view::now_playing(&now, &player.progress()));
                    }
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = view::player_event(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let catalog = Catalog::from_json(
            r#"[{"id":"dawn","title":"Dawn","cover":"dawn.jpg","tracks":[
                {"title":"First Light","src":"1.mp3"},
                {"title":"Noon","src":"2.mp3"}]}]"#,
        )
        .unwrap();
        Session::new(FolioConfig::default(), catalog)
    }

    #[test]
    fn test_share_link_for_album_and_track() {
        let url = session().share_link(Some("dawn".to_string()), Some(1)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/?album=dawn&track=1");
    }

    #[test]
    fn test_share_link_drops_out_of_range_track() {
        let url = session().share_link(Some("dawn".to_string()), Some(7)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/?album=dawn");
    }

    #[test]
    fn test_share_link_for_grid_and_unknown_album() {
        let session = session();
        assert_eq!(
            session.share_link(None, None).unwrap().as_str(),
            "http://localhost:8000/"
        );
        assert!(session.share_link(Some("nope".to_string()), None).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_link_plays_named_track() {
        let state = session()
            .open("http://localhost:8000/?album=dawn&track=1", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(
            state,
            ViewState::Album {
                id: "dawn".to_string(),
                track: Some(1)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_link_with_unknown_album_shows_grid() {
        let state = session()
            .open("http://localhost:8000/?album=nope&track=0", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(state, ViewState::Grid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_unknown_album_fails() {
        let result = session()
            .play_album("nope", None, false, Duration::from_secs(1))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_out_of_range_track_fails() {
        let result = session()
            .play_album("dawn", Some(5), false, Duration::from_secs(1))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mashup_runs_for_span() {
        let state = session().mashup(Duration::from_secs(25), None).await.unwrap();
        assert_eq!(state, BannerState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mashup_stops_when_album_starts() {
        let state = session()
            .mashup(Duration::from_secs(5), Some("dawn"))
            .await
            .unwrap();
        assert_eq!(state, BannerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mashup_handover_to_unknown_album_fails_early() {
        let result = session().mashup(Duration::from_secs(5), Some("nope")).await;
        assert!(result.is_err());
    }
}
