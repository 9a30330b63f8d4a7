//! Sample catalog of the home feed.
//!
//! The product has no backend: every track it offers comes from these
//! hardcoded sections. Sources are relative file names resolved against
//! the configured media root.

use crate::{audio::Track, error::LibraryError};

/// A titled group of tracks on the home feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSection {
    /// Section heading.
    pub title: String,
    /// Tracks in display order.
    pub tracks: Vec<Track>,
}

/// Ordered collection of catalog sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    sections: Vec<CatalogSection>,
}

const SAMPLE_SECTIONS: &[(&str, &[(&str, &str, &str)])] = &[
    (
        "Trending Now",
        &[
            ("Midnight City", "M83", "photo-1470225620780-dba8ba36b745"),
            ("Blinding Lights", "The Weeknd", "photo-1493225457124-a3eb161ffa5f"),
            ("Bad Guy", "Billie Eilish", "photo-1598387993281-cecf8b71a8f8"),
            ("Levitating", "Dua Lipa", "photo-1501386761578-eac5c94b800a"),
        ],
    ),
    (
        "New Releases",
        &[
            ("As It Was", "Harry Styles", "photo-1511671782779-c97d3d27a1d4"),
            ("About Damn Time", "Lizzo", "photo-1514525253161-7a46d19cd819"),
            ("First Class", "Jack Harlow", "photo-1496293455970-f8581aae0e3b"),
            ("Late Night Talking", "Harry Styles", "photo-1504509546545-e000b4a62425"),
        ],
    ),
    (
        "Electronic",
        &[
            ("Strobe", "Deadmau5", "photo-1516450360452-9312f5e86fc7"),
            ("Opus", "Eric Prydz", "photo-1571330735066-03aaa9429d89"),
            ("Scary Monsters", "Skrillex", "photo-1514320291840-2e0a9bf2a9ae"),
            ("Levels", "Avicii", "photo-1470229722913-7c0e2dbbafd3"),
        ],
    ),
];

impl Catalog {
    /// Creates a catalog from sections.
    #[must_use]
    pub fn new(sections: Vec<CatalogSection>) -> Self {
        Self { sections }
    }

    /// The built-in sample catalog.
    #[must_use]
    pub fn sample() -> Self {
        let sections = SAMPLE_SECTIONS
            .iter()
            .map(|(title, tracks)| CatalogSection {
                title: (*title).to_string(),
                tracks: tracks
                    .iter()
                    .map(|(title, artist, photo)| {
                        Track::new(
                            *title,
                            *artist,
                            format!("https://images.unsplash.com/{photo}?w=300"),
                            format!("tracks/{}.mp3", slug(title)),
                        )
                    })
                    .collect(),
            })
            .collect();
        Self::new(sections)
    }

    /// Sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[CatalogSection] {
        &self.sections
    }

    /// All tracks, section by section.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.sections.iter().flat_map(|section| section.tracks.iter())
    }

    /// Total number of tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.iter().map(|section| section.tracks.len()).sum()
    }

    /// Whether the catalog holds no tracks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a track by its 1-based position across all sections.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::OutOfRange` for `0` or a position past the end.
    pub fn get(&self, position: usize) -> Result<&Track, LibraryError> {
        position
            .checked_sub(1)
            .and_then(|index| self.tracks().nth(index))
            .ok_or(LibraryError::OutOfRange {
                position,
                len: self.len(),
            })
    }

    /// Finds a track by title, ignoring case.
    ///
    /// An exact title match wins over a partial one; among partial matches
    /// the first in catalog order is returned.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::TrackNotFound` if nothing matches.
    pub fn find(&self, query: &str) -> Result<&Track, LibraryError> {
        let needle = query.trim().to_lowercase();
        let not_found = || LibraryError::TrackNotFound {
            query: query.trim().to_string(),
        };
        if needle.is_empty() {
            return Err(not_found());
        }

        self.tracks()
            .find(|track| track.title.to_lowercase() == needle)
            .or_else(|| {
                self.tracks()
                    .find(|track| track.title.to_lowercase().contains(&needle))
            })
            .ok_or_else(not_found)
    }
}

/// Lowercase, dash-separated form of a title.
fn slug(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
