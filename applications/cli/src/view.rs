//! Terminal rendering of the catalog and engine state
//!
//! Pure functions from engine types to text; the session prints them.

use folio_core::{Album, Catalog};
use folio_playback::{BannerDisplay, BannerEvent, BannerState, NowPlaying, PlayerEvent, Progress};
use std::fmt::Write;

/// Album grid, one card per line
pub fn grid(catalog: &Catalog) -> String {
    let mut out = format!(
        "{} albums, {} songs\n",
        catalog.albums().len(),
        catalog.total_songs()
    );

    for album in catalog.albums() {
        let card = album.card();
        let marker = if album.is_recommended { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<20} {} ({})",
            marker,
            card.id,
            card.title,
            card.track_count_label()
        );
    }

    out
}

/// Album detail with a 1-based track list; `selected` is a 0-based index
pub fn album_detail(album: &Album, selected: Option<usize>) -> String {
    let mut out = format!("{}\n{} Songs\n", album.title, album.tracks.len());

    for (index, track) in album.tracks.iter().enumerate() {
        let marker = if selected == Some(index) { '>' } else { ' ' };
        let _ = writeln!(out, "{} {:>3}. {}", marker, index + 1, track.title);
    }

    out
}

/// Transport bar line
pub fn now_playing(now: &NowPlaying, progress: &Progress) -> String {
    format!(
        "{} - {}  [{}]",
        now.title,
        now.album,
        progress.readout()
    )
}

/// Banner caption line
pub fn banner(display: &BannerDisplay) -> String {
    format!("~ {} ({})", display.caption, display.cover)
}

/// One line per noteworthy player event
///
/// Position ticks are left to the periodic progress line.
pub fn player_event(event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::StateChanged { playing: true } => Some("> playing".to_string()),
        PlayerEvent::StateChanged { playing: false } => Some("|| paused".to_string()),
        PlayerEvent::TrackChanged(now) => Some(format!(
            "#{} {} - {}",
            now.index + 1,
            now.title,
            now.album
        )),
        PlayerEvent::PlaylistChanged { length, shuffled } => Some(format!(
            "Playlist: {} tracks{}",
            length,
            if *shuffled { ", shuffled" } else { "" }
        )),
        PlayerEvent::Error { message } => Some(format!("! {}", message)),
        PlayerEvent::DurationKnown { .. }
        | PlayerEvent::PositionUpdate { .. }
        | PlayerEvent::VolumeChanged { .. } => None,
    }
}

/// One line per noteworthy banner event
pub fn banner_event(event: &BannerEvent) -> Option<String> {
    match event {
        BannerEvent::StateChanged { state } => Some(match state {
            BannerState::Playing => "Mashup started".to_string(),
            BannerState::Stopped => "Mashup stopped".to_string(),
            BannerState::Idle => "Mashup idle".to_string(),
        }),
        BannerEvent::NowPlaying(display) => Some(banner(display)),
        BannerEvent::Error { message } => Some(format!("! {}", message)),
        BannerEvent::VisibilityChanged { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"albums":[
                {"id":"dawn","title":"Dawn","cover":"dawn.jpg","isRecommended":true,
                 "tracks":[{"title":"First Light","src":"1.mp3"},{"title":"Noon","src":"2.mp3"}]},
                {"id":"dusk","title":"Dusk","cover":"dusk.jpg",
                 "tracks":[{"title":"Evening","src":"3.mp3"}]}
            ],"totalSongs":3}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_grid_lists_cards() {
        let text = grid(&catalog());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "2 albums, 3 songs");
        assert!(lines[1].starts_with("* dawn"));
        assert!(lines[1].ends_with("Dawn (2 tracks)"));
        assert!(lines[2].ends_with("Dusk (1 track)"));
    }

    #[test]
    fn test_album_detail_numbers_from_one() {
        let catalog = catalog();
        let text = album_detail(catalog.album("dawn").unwrap(), Some(1));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Dawn");
        assert_eq!(lines[1], "2 Songs");
        assert_eq!(lines[2], "    1. First Light");
        assert_eq!(lines[3], ">   2. Noon");
    }

    #[test]
    fn test_now_playing_line() {
        let now = NowPlaying {
            index: 0,
            title: "Noon".to_string(),
            album: "Dawn".to_string(),
            cover: "dawn.jpg".to_string(),
        };
        let progress = Progress {
            position: Duration::from_secs(75),
            duration: Some(Duration::from_secs(200)),
        };

        assert_eq!(now_playing(&now, &progress), "Noon - Dawn  [1:15 / 3:20]");
    }

    #[test]
    fn test_quiet_events_are_skipped() {
        assert!(player_event(&PlayerEvent::PositionUpdate {
            position_ms: 1000,
            duration_ms: None
        })
        .is_none());
        assert_eq!(
            player_event(&PlayerEvent::PlaylistChanged {
                length: 5,
                shuffled: true
            })
            .as_deref(),
            Some("Playlist: 5 tracks, shuffled")
        );
        assert!(banner_event(&BannerEvent::VisibilityChanged { visible: true }).is_none());
    }
}
