//! SoundWave - playback core of a music streaming player
//!
//! A single playback coordinator owns the media handle and the published
//! playback state: which track is loaded, whether it is playing, how far
//! along it is, the volume, and whether the player is closed, shown as a
//! mini bar or expanded to full screen. Display surfaces render snapshots
//! of that state; a terminal session drives it from command lines.

pub mod audio;
pub mod config;
pub mod error;
pub mod library;
pub mod runtime;
pub mod state;
pub mod ui;

// Re-export key types for convenience
pub use {
    audio::{HeadlessHandle, MediaEvent, MediaHandle, PlaybackError, Track},
    config::{SettingsManager, UserSettings},
    error::{AudioError, LibraryError, RuntimeError},
    library::Catalog,
    runtime::{Command, Session},
    state::{ControlOutcome, PlaybackCoordinator, PlaybackState, PlayerEvent, ViewMode},
};
