//! Folio - Playback Engines
//!
//! Platform-agnostic playback for the Folio music portfolio.
//!
//! This crate provides:
//! - `Player`: sequential or shuffled playlist playback with wrap-around,
//!   restart-or-previous and automatic advance at track end
//! - `Banner`: a background mashup of random 20s clips crossfading between
//!   two channels
//! - Stepped volume fades (linear by default)
//! - Event streams for view synchronization
//!
//! # Architecture
//!
//! The engines drive audio through the [`AudioChannel`] trait and never
//! render anything. A browser or desktop backend implements the trait;
//! [`SimulatedChannel`] runs on the tokio clock for the terminal front-end
//! and for tests.
//!
//! # Example: Playing an album
//!
//! ```rust,no_run
//! use folio_core::Catalog;
//! use folio_playback::{Player, PlayerConfig, SimulatedChannel, SimulationSettings};
//!
//! # async fn demo(catalog: Catalog) -> folio_playback::Result<()> {
//! let channel = SimulatedChannel::new("main", SimulationSettings::default());
//! let player = Player::new(channel, PlayerConfig::default());
//!
//! let tracks = catalog.album_tracks("debut").unwrap_or_default();
//! player.play_playlist(tracks, false, 0).await?;
//! player.next().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Mashup banner that yields to the player
//!
//! ```rust,no_run
//! use folio_core::Catalog;
//! use folio_playback::{Banner, BannerConfig, Player, SimulatedChannel, SimulationSettings};
//!
//! # fn demo(catalog: Catalog, player: Player<SimulatedChannel>) {
//! let settings = SimulationSettings::default();
//! let banner = Banner::new(
//!     &catalog,
//!     [
//!         SimulatedChannel::new("banner-a", settings.clone()),
//!         SimulatedChannel::new("banner-b", settings),
//!     ],
//!     BannerConfig::default(),
//! );
//!
//! banner.follow(&player);
//! banner.show();
//! banner.start();
//! # }
//! ```

pub mod banner;
pub mod channel;
mod error;
pub mod events;
pub mod fade;
mod player;
pub mod shuffle;
mod simulated;
pub mod types;

// Public exports
pub use banner::Banner;
pub use channel::{AudioChannel, ChannelEvent};
pub use error::{PlaybackError, Result};
pub use events::{BannerEvent, PlayerEvent};
pub use fade::FadeSettings;
pub use player::Player;
pub use simulated::{DurationResolver, SimulatedChannel};
pub use types::{
    BannerConfig, BannerDisplay, BannerState, NowPlaying, PlayerConfig, Progress,
    SimulationSettings,
};
