//! The playable track value.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Metadata and source URI describing one playable audio item.
///
/// Tracks have no identity beyond structural equality. Loading a new track
/// into the coordinator replaces the previous one entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
    /// URI of the cover image.
    pub cover_url: String,
    /// URI of the audio resource.
    pub src: String,
}

impl Track {
    /// Creates a new track.
    ///
    /// # Arguments
    ///
    /// * `title` - Track title.
    /// * `artist` - Performing artist.
    /// * `cover_url` - URI of the cover image.
    /// * `src` - URI of the audio resource.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        cover_url: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            cover_url: cover_url.into(),
            src: src.into(),
        }
    }
}

impl Display for Track {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.artist.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.title, self.artist)
        }
    }
}
