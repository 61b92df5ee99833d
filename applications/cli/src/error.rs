/// Front-end error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] folio_core::CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] folio_playback::PlaybackError),
}
