//! Catalog fetch over HTTP.

use crate::error::{FetchError, Result};
use folio_core::Catalog;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fetches the static catalog document once at startup.
///
/// # Example
///
/// ```ignore
/// use folio_catalog_client::CatalogClient;
///
/// let client = CatalogClient::new("https://example.com/albums.json")?;
/// let catalog = client.fetch().await?;
/// println!("{} albums, {} songs", catalog.albums().len(), catalog.total_songs());
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    url: Url,
}

impl CatalogClient {
    /// Create a client for the catalog at `url`.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Folio/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, url })
    }

    /// Catalog document URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Download and parse the catalog.
    pub async fn fetch(&self) -> Result<Catalog> {
        debug!(url = %self.url, "Fetching catalog");

        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Catalog fetch failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let catalog = Catalog::from_slice(&body)?;

        info!(
            albums = catalog.albums().len(),
            songs = catalog.total_songs(),
            "Catalog fetched"
        );

        Ok(catalog)
    }
}
