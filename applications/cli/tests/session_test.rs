//! Integration tests for catalog loading and the playback session

use folio::config::CatalogSettings;
use folio::{load_catalog, FolioConfig, Session};
use folio_core::ViewState;
use std::io::Write;
use std::time::Duration;

const CATALOG: &str = r#"{
    "albums": [
        {
            "id": "dawn",
            "title": "Dawn",
            "cover": "covers/dawn.jpg",
            "tracks": [
                { "title": "First Light", "src": "audio/first-light.mp3" },
                { "title": "Noon", "src": "audio/noon.mp3" }
            ]
        },
        {
            "id": "dusk",
            "title": "Dusk",
            "cover": "covers/dusk.jpg",
            "tracks": [{ "title": "Evening", "src": "audio/evening.mp3" }]
        }
    ],
    "totalSongs": 3
}"#;

fn catalog_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_load_catalog_from_path() {
    let file = catalog_file();
    let settings = CatalogSettings {
        url: None,
        path: Some(file.path().to_path_buf()),
    };

    let catalog = load_catalog(&settings).await.unwrap();

    assert_eq!(catalog.albums().len(), 2);
    assert_eq!(catalog.total_songs(), 3);
}

#[tokio::test]
async fn test_load_catalog_missing_file_has_context() {
    let settings = CatalogSettings {
        url: None,
        path: Some("/nonexistent/music_data.json".into()),
    };

    let error = load_catalog(&settings).await.unwrap_err();

    assert!(error.to_string().contains("/nonexistent/music_data.json"));
}

#[tokio::test]
async fn test_load_catalog_without_source_fails() {
    let settings = CatalogSettings {
        url: None,
        path: None,
    };
    assert!(load_catalog(&settings).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_session_engines_share_config() {
    let file = catalog_file();
    let mut config = FolioConfig::default();
    config.catalog.path = Some(file.path().to_path_buf());
    config.banner.seed = Some(5);
    config.simulation.track_secs = 30;

    let catalog = load_catalog(&config.catalog).await.unwrap();
    let session = Session::new(config, catalog);

    let banner = session.banner();
    assert_eq!(banner.pool_size(), 3);
    assert_eq!(banner.display().caption, "Click to Play Mashup");

    session
        .play_album("dusk", None, false, Duration::from_secs(1))
        .await
        .unwrap();

    let state = session
        .open("http://localhost:8000/?album=dawn", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(
        state,
        ViewState::Album {
            id: "dawn".to_string(),
            track: None
        }
    );
}
