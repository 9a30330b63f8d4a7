//! Source resolution and probing using the `symphonia` crate.
//!
//! Track sources are opaque URIs. Only local files are playable: plain paths
//! and `file://` URIs resolve against an optional media root, every other
//! scheme is reported as unavailable.

use std::{
    fs::File,
    io::{Error as StdError, ErrorKind::UnexpectedEof},
    path::{Path, PathBuf},
};

use {
    symphonia::{
        core::{
            codecs::{CODEC_TYPE_NULL, DecoderOptions},
            errors::Error as SymphoniaError,
            formats::FormatOptions,
            io::{MediaSourceStream, MediaSourceStreamOptions},
            meta::MetadataOptions,
            probe::Hint,
        },
        default::{get_codecs, get_probe},
    },
    thiserror::Error,
};

use crate::audio::media::PlaybackError;

/// Error type for source probing.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The source URI is empty.
    #[error("Empty source")]
    EmptySource,
    /// The URI scheme cannot be played locally.
    #[error("Unsupported source scheme: {scheme}")]
    UnsupportedScheme { scheme: String },
    /// Failed to open or read the source.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Symphonia probing or codec error.
    #[error("Decoding error: {0}")]
    SymphoniaError(#[from] SymphoniaError),
    /// No audio track found in the source.
    #[error("No audio track found")]
    NoAudioTrack,
}

impl ProbeError {
    /// Classifies the error as a media-level playback failure.
    #[must_use]
    pub fn playback_error(&self) -> PlaybackError {
        match self {
            Self::EmptySource | Self::UnsupportedScheme { .. } | Self::IoError(_) => {
                PlaybackError::SourceUnavailable
            }
            // A truncated or garbage file runs out of bytes while probing.
            Self::SymphoniaError(SymphoniaError::IoError(e)) if e.kind() != UnexpectedEof => {
                PlaybackError::SourceUnavailable
            }
            Self::SymphoniaError(_) | Self::NoAudioTrack => PlaybackError::DecodeFailed,
        }
    }
}

/// What probing learned about a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedSource {
    /// Resolved local path.
    pub path: PathBuf,
    /// Duration in seconds, if the container reports it.
    pub duration_seconds: Option<f64>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Number of channels.
    pub channels: Option<usize>,
}

/// Resolves a source URI to a local path.
///
/// # Arguments
///
/// * `uri` - Source URI: a plain path or a `file://` URI.
/// * `media_root` - Base directory for relative paths.
///
/// # Errors
///
/// Returns `ProbeError` for an empty URI or a non-file scheme.
pub fn resolve_source(uri: &str, media_root: Option<&Path>) -> Result<PathBuf, ProbeError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(ProbeError::EmptySource);
    }

    let raw = match uri.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => {
            if !scheme.eq_ignore_ascii_case("file") {
                return Err(ProbeError::UnsupportedScheme {
                    scheme: scheme.to_ascii_lowercase(),
                });
            }
            rest
        }
        _ => uri,
    };

    let path = PathBuf::from(raw);
    match media_root {
        Some(root) if path.is_relative() => Ok(root.join(path)),
        _ => Ok(path),
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Opens a local file and checks that it holds a decodable audio track.
///
/// # Arguments
///
/// * `path` - Path to the audio file.
///
/// # Returns
///
/// A `ProbedSource` describing the first audio track.
///
/// # Errors
///
/// Returns `ProbeError` if:
/// - The file cannot be opened or read
/// - The container format is unsupported
/// - No audio track is found, or its codec has no decoder
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<ProbedSource, ProbeError> {
    let path = path.as_ref();

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(ProbeError::NoAudioTrack)?;
    let codec_params = &track.codec_params;

    // Fails for codecs without a registered decoder.
    get_codecs().make(codec_params, &DecoderOptions::default())?;

    let duration_seconds = match (codec_params.time_base, codec_params.n_frames) {
        (Some(time_base), Some(frames)) => {
            let time = time_base.calc_time(frames);
            Some(time.seconds as f64 + time.frac)
        }
        (None, Some(frames)) => codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .map(|rate| frames as f64 / f64::from(rate)),
        _ => None,
    };

    Ok(ProbedSource {
        path: path.to_path_buf(),
        duration_seconds,
        sample_rate: codec_params.sample_rate,
        channels: codec_params.channels.map(|channels| channels.count()),
    })
}

/// Resolves and probes a source URI in one step.
///
/// # Errors
///
/// Returns `ProbeError` if the URI cannot be resolved or the file probed.
pub fn probe_source(uri: &str, media_root: Option<&Path>) -> Result<ProbedSource, ProbeError> {
    let path = resolve_source(uri, media_root)?;
    probe_file(path)
}

#[cfg(test)]
mod tests {
    use std::{fs::write, io::ErrorKind::NotFound, path::Path};

    use tempfile::tempdir;

    use crate::audio::{
        media::PlaybackError,
        probe::{ProbeError, probe_file, probe_source, resolve_source},
        test_support::write_silent_wav,
    };

    #[test]
    fn test_resolve_plain_and_file_uris() {
        let root = Path::new("/music");
        assert_eq!(
            resolve_source("tracks/a.mp3", Some(root)).unwrap(),
            root.join("tracks/a.mp3")
        );
        assert_eq!(
            resolve_source("file:///tmp/a.flac", Some(root)).unwrap(),
            Path::new("/tmp/a.flac")
        );
        assert_eq!(
            resolve_source("a.mp3", None).unwrap(),
            Path::new("a.mp3")
        );
    }

    #[test]
    fn test_resolve_rejects_remote_and_empty_sources() {
        let error = resolve_source("https://cdn.example.com/a.mp3", None).unwrap_err();
        assert!(matches!(
            error,
            ProbeError::UnsupportedScheme { ref scheme } if scheme == "https"
        ));
        assert_eq!(error.playback_error(), PlaybackError::SourceUnavailable);

        let error = resolve_source("   ", None).unwrap_err();
        assert!(matches!(error, ProbeError::EmptySource));
    }

    #[test]
    fn test_probe_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let error = probe_file(dir.path().join("missing.wav")).unwrap_err();
        assert!(matches!(error, ProbeError::IoError(ref e) if e.kind() == NotFound));
        assert_eq!(error.playback_error(), PlaybackError::SourceUnavailable);
    }

    #[test]
    fn test_probe_garbage_fails_to_decode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        write(&path, b"definitely not a riff container").unwrap();

        let error = probe_file(&path).unwrap_err();
        assert_eq!(error.playback_error(), PlaybackError::DecodeFailed);
    }

    #[test]
    fn test_probe_wav_reports_duration() {
        let dir = tempdir().unwrap();
        write_silent_wav(&dir.path().join("tone.wav"), 8000, 12000);

        let probed = probe_source("tone.wav", Some(dir.path())).unwrap();
        let duration = probed.duration_seconds.unwrap();
        assert!((duration - 1.5).abs() < 1e-6, "duration was {duration}");
        assert_eq!(probed.sample_rate, Some(8000));
        assert_eq!(probed.channels, Some(1));
    }
}
