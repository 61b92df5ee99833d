//! Tests for the catalog client.
//!
//! These tests use a mock server to verify client behavior without
//! requiring a real deployment.

use folio_catalog_client::{CatalogClient, FetchError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = r#"{
    "albums": [
        {
            "id": "debut",
            "title": "Debut",
            "cover": "covers/debut.jpg",
            "isRecommended": true,
            "tracks": [
                { "title": "Opening", "src": "audio/opening.mp3" },
                { "title": "Closing", "src": "audio/closing.mp3" }
            ]
        }
    ],
    "totalSongs": 2
}"#;

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_https_url() {
        let client = CatalogClient::new("https://example.com/albums.json").unwrap();
        assert_eq!(client.url().as_str(), "https://example.com/albums.json");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = CatalogClient::new("ftp://example.com/albums.json");
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_unparseable_url() {
        let result = CatalogClient::new("not a url");
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}

// =============================================================================
// Fetch Tests
// =============================================================================

mod fetch {
    use super::*;

    async fn client_for(server: &MockServer) -> CatalogClient {
        CatalogClient::new(&format!("{}/albums.json", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_full_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = client_for(&server).await.fetch().await.unwrap();

        assert_eq!(catalog.albums().len(), 1);
        assert_eq!(catalog.total_songs(), 2);
        let album = catalog.album("debut").unwrap();
        assert!(album.is_recommended);
        assert_eq!(album.tracks[1].title, "Closing");
    }

    #[tokio::test]
    async fn test_fetch_bare_array_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":"x","title":"X","cover":"x.jpg","tracks":[{"title":"T","src":"t.mp3"}]}]"#,
            ))
            .mount(&server)
            .await;

        let catalog = client_for(&server).await.fetch().await.unwrap();

        assert_eq!(catalog.total_songs(), 1);
        assert_eq!(catalog.all_tracks()[0].album_title(), "X");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let result = client_for(&server).await.fetch().await;

        match result {
            Err(FetchError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "missing");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"albums\": 3}"))
            .mount(&server)
            .await;

        let result = client_for(&server).await.fetch().await;

        assert!(matches!(result, Err(FetchError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_fetch_duplicate_album_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":"x","title":"X","cover":"x.jpg"},{"id":"x","title":"Y","cover":"y.jpg"}]"#,
            ))
            .mount(&server)
            .await;

        let result = client_for(&server).await.fetch().await;

        assert!(matches!(
            result,
            Err(FetchError::Catalog(folio_core::CatalogError::DuplicateAlbum(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_server() {
        // Nothing listens on port 9
        let client = CatalogClient::new("http://127.0.0.1:9/albums.json").unwrap();
        let result = client.fetch().await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
