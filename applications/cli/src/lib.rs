//! Folio terminal front-end
//!
//! Browses the catalog, plays albums and runs the mashup banner on the
//! simulated media backend.
//!
//! This library exposes the front-end components for testing purposes.

pub mod config;
pub mod error;
pub mod session;
pub mod view;

// Re-export commonly used types for convenience
pub use config::FolioConfig;
pub use error::{CliError, Result};
pub use session::{load_catalog, Session};
