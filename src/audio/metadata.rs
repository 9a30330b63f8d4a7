//! Track metadata extraction using the `lofty` crate.
//!
//! Used when a track is loaded straight from a file instead of from the
//! catalog: the tags provide title and artist, the file name fills in
//! whatever the tags lack.

use std::path::Path;

use {
    lofty::{error::LoftyError, prelude::TaggedFileExt, probe::Probe, tag::Accessor},
    thiserror::Error,
};

use crate::audio::track::Track;

/// Artist shown for files without an artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Error type for metadata extraction operations.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Failed to read or parse the audio file.
    #[error("Failed to read audio file: {0}")]
    ReadError(#[from] LoftyError),
}

/// Reads tags from an audio file into a `Track`.
///
/// # Arguments
///
/// * `path` - Path to the audio file. Also becomes the track's `src`.
///
/// # Errors
///
/// Returns `MetadataError` if the file cannot be read or its format is
/// not recognized.
pub fn read_track<P: AsRef<Path>>(path: P) -> Result<Track, MetadataError> {
    let path = path.as_ref();
    let tagged_file = Probe::open(path)?.read()?;
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let title = tag
        .and_then(|tag| tag.title().map(|s| s.to_string()))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| title_from_path(path));
    let artist = tag
        .and_then(|tag| tag.artist().map(|s| s.to_string()))
        .filter(|artist| !artist.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Ok(Track::new(
        title,
        artist,
        String::new(),
        path.to_string_lossy(),
    ))
}

/// Derives a display title from a file name.
#[must_use]
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::tempdir;

    use crate::audio::{
        metadata::{UNKNOWN_ARTIST, read_track, title_from_path},
        test_support::write_silent_wav,
    };

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_path(Path::new("/music/midnight_city.mp3")),
            "midnight city"
        );
        assert_eq!(title_from_path(Path::new("as-it-was.flac")), "as it was");
    }

    #[test]
    fn test_read_untagged_file_falls_back_to_file_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("late_night.wav");
        write_silent_wav(&path, 8000, 800);

        let track = read_track(&path).unwrap();
        assert_eq!(track.title, "late night");
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.src, path.to_string_lossy());
        assert!(track.cover_url.is_empty());
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(read_track(dir.path().join("missing.flac")).is_err());
    }
}
