//! Folio Catalog Client
//!
//! Fetches the catalog document (albums, tracks and covers) over HTTP and
//! parses it into a [`folio_core::Catalog`].
//!
//! # Example
//!
//! ```ignore
//! use folio_catalog_client::CatalogClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new("https://example.com/albums.json")?;
//!     let catalog = client.fetch().await?;
//!
//!     for card in catalog.cards() {
//!         println!("{} ({})", card.title, card.track_count_label());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::CatalogClient;
pub use error::{FetchError, Result};
