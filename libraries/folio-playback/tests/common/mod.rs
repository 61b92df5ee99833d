//! Shared fixtures for the engine integration tests

#![allow(dead_code)]

use folio_core::Catalog;
use folio_playback::{
    DurationResolver, PlayerConfig, Player, SimulatedChannel, SimulationSettings,
};
use std::sync::Arc;
use std::time::Duration;

/// Two albums: A with 3 tracks, B with 2 tracks
pub const TWO_ALBUMS: &str = r#"{
    "albums": [
        {
            "id": "album-a",
            "title": "Album A",
            "cover": "covers/a.jpg",
            "isRecommended": true,
            "tracks": [
                { "title": "A1", "src": "audio/a1.mp3" },
                { "title": "A2", "src": "audio/a2.mp3" },
                { "title": "A3", "src": "audio/a3.mp3" }
            ]
        },
        {
            "id": "album-b",
            "title": "Album B",
            "cover": "covers/b.jpg",
            "tracks": [
                { "title": "B1", "src": "audio/b1.mp3" },
                { "title": "B2", "src": "audio/b2.mp3" }
            ]
        }
    ],
    "totalSongs": 5
}"#;

/// One album with a single track
pub const SINGLE_TRACK: &str = r#"[
    {
        "id": "solo",
        "title": "Solo",
        "cover": "covers/solo.jpg",
        "tracks": [{ "title": "Only", "src": "audio/only.mp3" }]
    }
]"#;

pub fn two_albums() -> Catalog {
    Catalog::from_json(TWO_ALBUMS).unwrap()
}

pub fn single_track() -> Catalog {
    Catalog::from_json(SINGLE_TRACK).unwrap()
}

/// Simulation where every source lasts `track`
pub fn simulation(track: Duration) -> SimulationSettings {
    SimulationSettings {
        metadata_delay: Duration::from_millis(100),
        tick: Duration::from_millis(250),
        track_duration: track,
        autoplay_denied: false,
    }
}

/// Channel whose sources never report metadata when their URI contains "broken"
pub fn channel_with_broken_sources(name: &str, track: Duration) -> SimulatedChannel {
    let resolver: DurationResolver = Arc::new(move |uri: &str| {
        if uri.contains("broken") {
            None
        } else {
            Some(track)
        }
    });
    SimulatedChannel::with_resolver(name, simulation(track), resolver)
}

pub fn player(track: Duration) -> Player<SimulatedChannel> {
    Player::new(
        SimulatedChannel::new("player", simulation(track)),
        PlayerConfig {
            seed: Some(42),
            ..PlayerConfig::default()
        },
    )
}
