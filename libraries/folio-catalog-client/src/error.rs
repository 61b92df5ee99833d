//! Error types for the catalog client.

use thiserror::Error;

/// Errors that can occur while fetching the catalog.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Response body is not a valid catalog
    #[error("Invalid catalog document: {0}")]
    Catalog(#[from] folio_core::CatalogError),
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, FetchError>;
