/// Front-end configuration
use crate::error::{CliError, Result};
use folio_playback::{BannerConfig, FadeSettings, PlayerConfig, SimulationSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    #[serde(default = "default_banner")]
    pub banner: BannerSettings,

    #[serde(default = "default_share")]
    pub share: ShareSettings,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSection,
}

/// Where the catalog document comes from; `url` wins over `path`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_catalog_path")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_prev_restart_threshold_ms")]
    pub prev_restart_threshold_ms: u64,

    #[serde(default = "default_volume")]
    pub volume: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BannerSettings {
    #[serde(default = "default_clip_ms")]
    pub clip_ms: u64,

    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: u64,

    #[serde(default = "default_fade_steps")]
    pub fade_steps: u32,

    #[serde(default = "default_min_tail_secs")]
    pub min_tail_secs: u64,

    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    #[serde(default = "default_placeholder_cover")]
    pub placeholder_cover: String,

    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShareSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Simulated media backend used by the terminal front-end
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSection {
    #[serde(default = "default_metadata_delay_ms")]
    pub metadata_delay_ms: u64,

    #[serde(default = "default_track_secs")]
    pub track_secs: u64,

    #[serde(default)]
    pub autoplay_denied: bool,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            player: default_player(),
            banner: default_banner(),
            share: default_share(),
            simulation: default_simulation(),
        }
    }
}

impl FolioConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` when given (it must exist), otherwise `folio.toml` if
    /// present, then applies `FOLIO_<SECTION>__<KEY>` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. FOLIO_BANNER__CLIP_MS
        settings = settings.add_source(
            config::Environment::with_prefix("FOLIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.url.is_none() && self.catalog.path.is_none() {
            return Err(CliError::Config(
                "No catalog source (set catalog.url or catalog.path)".to_string(),
            ));
        }

        // A channel's fade-out must finish before its next clip loads
        let clip_ms = self.banner.clip_ms;
        if clip_ms == 0 || clip_ms < self.banner.crossfade_ms.saturating_mul(2) {
            return Err(CliError::Config(format!(
                "Clip ({}ms) must be at least twice the crossfade ({}ms)",
                self.banner.clip_ms, self.banner.crossfade_ms
            )));
        }

        if self.banner.fade_steps == 0 {
            return Err(CliError::Config(
                "banner.fade_steps must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(CliError::Config(format!(
                "player.volume must be between 0 and 1, got {}",
                self.player.volume
            )));
        }

        self.share_base()?;

        Ok(())
    }

    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            prev_restart_threshold: Duration::from_millis(self.player.prev_restart_threshold_ms),
            volume: self.player.volume,
            seed: self.banner.seed,
        }
    }

    pub fn banner_config(&self) -> BannerConfig {
        BannerConfig {
            clip: Duration::from_millis(self.banner.clip_ms),
            crossfade: FadeSettings {
                duration: Duration::from_millis(self.banner.crossfade_ms),
                steps: self.banner.fade_steps,
            },
            min_tail: Duration::from_secs(self.banner.min_tail_secs),
            metadata_timeout: Duration::from_millis(self.banner.metadata_timeout_ms),
            placeholder_cover: self.banner.placeholder_cover.clone(),
            seed: self.banner.seed,
        }
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            metadata_delay: Duration::from_millis(self.simulation.metadata_delay_ms),
            track_duration: Duration::from_secs(self.simulation.track_secs),
            autoplay_denied: self.simulation.autoplay_denied,
            ..SimulationSettings::default()
        }
    }

    /// Base URL share links are built on
    pub fn share_base(&self) -> Result<Url> {
        Url::parse(&self.share.base_url).map_err(|e| {
            CliError::Config(format!("Invalid share.base_url {:?}: {}", self.share.base_url, e))
        })
    }
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        url: None,
        path: default_catalog_path(),
    }
}

fn default_catalog_path() -> Option<PathBuf> {
    Some(PathBuf::from("music_data.json"))
}

fn default_player() -> PlayerSettings {
    PlayerSettings {
        prev_restart_threshold_ms: default_prev_restart_threshold_ms(),
        volume: default_volume(),
    }
}

fn default_prev_restart_threshold_ms() -> u64 {
    3000
}

fn default_volume() -> f32 {
    1.0
}

fn default_banner() -> BannerSettings {
    BannerSettings {
        clip_ms: default_clip_ms(),
        crossfade_ms: default_crossfade_ms(),
        fade_steps: default_fade_steps(),
        min_tail_secs: default_min_tail_secs(),
        metadata_timeout_ms: default_metadata_timeout_ms(),
        placeholder_cover: default_placeholder_cover(),
        seed: None,
    }
}

fn default_clip_ms() -> u64 {
    20_000
}

fn default_crossfade_ms() -> u64 {
    2000
}

fn default_fade_steps() -> u32 {
    20
}

fn default_min_tail_secs() -> u64 {
    15
}

fn default_metadata_timeout_ms() -> u64 {
    10_000
}

fn default_placeholder_cover() -> String {
    "cover-placeholder.jpg".to_string()
}

fn default_share() -> ShareSettings {
    ShareSettings {
        base_url: default_base_url(),
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_simulation() -> SimulationSection {
    SimulationSection {
        metadata_delay_ms: default_metadata_delay_ms(),
        track_secs: default_track_secs(),
        autoplay_denied: false,
    }
}

fn default_metadata_delay_ms() -> u64 {
    150
}

fn default_track_secs() -> u64 {
    180
}
