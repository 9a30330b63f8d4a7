//! Playback state and the coordinator that owns it.
//!
//! The coordinator is the single writer of `PlaybackState`; display
//! surfaces read it through `PlaybackStateReader` and react to the
//! `PlayerEvent`s it broadcasts.

pub mod coordinator;
pub mod playback;

pub use {
    coordinator::PlaybackCoordinator,
    playback::{
        ControlOutcome, DEFAULT_VOLUME, PlaybackState, PlaybackStateReader, PlayerEvent, ViewMode,
        clamp_seek, clamp_volume,
    },
};
