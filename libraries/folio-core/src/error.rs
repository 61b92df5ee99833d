/// Core error types for Folio
use thiserror::Error;

/// Result type alias using `CatalogError`
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while loading or querying the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog document is not valid JSON or has the wrong shape
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Catalog file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Two albums share the same id
    #[error("Duplicate album id: {0}")]
    DuplicateAlbum(String),

    /// Album not found
    #[error("Album not found: {0}")]
    AlbumNotFound(String),

    /// Share link is not a valid URL
    #[error("Invalid share link: {0}")]
    InvalidLink(#[from] url::ParseError),
}
