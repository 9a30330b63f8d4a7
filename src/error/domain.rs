//! Domain-specific error types using `thiserror`.
//!
//! This module defines the main error enums for the domains of the player:
//! audio sources, the sample catalog, and the runtime around them.

use std::{io::Error as IoError, result::Result as StdResult};

use {anyhow::Error, thiserror::Error};

use crate::{
    audio::{PlaybackError, metadata::MetadataError, probe::ProbeError},
    config::SettingsError,
    runtime::command::CommandError,
};

/// Audio-related errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Source could not be resolved or probed.
    #[error("Probe error: {0}")]
    ProbeError(#[from] ProbeError),
    /// Tags could not be read.
    #[error("Metadata error: {0}")]
    MetadataError(#[from] MetadataError),
    /// The media handle reported a failure.
    #[error("Playback error: {0}")]
    PlaybackError(#[from] PlaybackError),
}

/// Catalog-related errors.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// No track matches the query.
    #[error("No track matches \"{query}\"")]
    TrackNotFound { query: String },
    /// A 1-based position is past the end of the catalog.
    #[error("Track {position} is out of range (catalog has {len} tracks)")]
    OutOfRange { position: usize, len: usize },
}

/// Errors of the terminal runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Settings could not be loaded.
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
    /// A command line could not be parsed.
    #[error("Command error: {0}")]
    CommandError(#[from] CommandError),
    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    /// Logging could not be initialized.
    #[error("Logging initialization error: {0}")]
    LoggingError(String),
}

/// Operational error context propagation with `anyhow`.
///
/// This type is used for operational errors that need rich context
/// but don't require specific handling logic.
pub type Result<T> = StdResult<T, Error>;
