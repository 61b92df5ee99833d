//! Share-link routing
//!
//! View state is carried in two query parameters: `album` (album id) and
//! `track` (zero-based index into that album's track list).

use crate::catalog::Catalog;
use crate::error::Result;
use tracing::debug;
use url::Url;

const ALBUM_PARAM: &str = "album";
const TRACK_PARAM: &str = "track";

/// Which view the page shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Album grid (landing page)
    #[default]
    Grid,

    /// Album detail, optionally with a track selected for playback
    Album { id: String, track: Option<usize> },
}

impl ViewState {
    /// Read view state from a URL's query string without validating it
    pub fn from_url(url: &Url) -> Self {
        let mut album = None;
        let mut track = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                ALBUM_PARAM if !value.is_empty() => album = Some(value.into_owned()),
                TRACK_PARAM => track = value.parse::<usize>().ok(),
                _ => {}
            }
        }

        match album {
            Some(id) => ViewState::Album { id, track },
            None => ViewState::Grid,
        }
    }

    /// Parse a share link
    pub fn parse_link(link: &str) -> Result<Self> {
        let url = Url::parse(link)?;
        Ok(Self::from_url(&url))
    }

    /// Validate against the catalog
    ///
    /// Unknown albums fall back to the grid; an out-of-range track is dropped.
    pub fn resolve(self, catalog: &Catalog) -> Self {
        match self {
            ViewState::Grid => ViewState::Grid,
            ViewState::Album { id, track } => match catalog.album(&id) {
                Some(album) => {
                    let track = track.filter(|&index| index < album.tracks.len());
                    ViewState::Album { id, track }
                }
                None => {
                    debug!(album = %id, "Share link names unknown album, showing grid");
                    ViewState::Grid
                }
            },
        }
    }

    /// Encode this state as a shareable URL on top of `base`
    pub fn share_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(None);

        if let ViewState::Album { id, track } = self {
            let mut query = url.query_pairs_mut();
            query.append_pair(ALBUM_PARAM, id);
            if let Some(index) = track {
                query.append_pair(TRACK_PARAM, &index.to_string());
            }
        }

        url
    }
}
