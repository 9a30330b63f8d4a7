//! Audio side of the player.
//!
//! Defines the playable `Track`, the `MediaHandle` capability the playback
//! coordinator consumes, and a headless handle implementation that probes
//! local sources with symphonia and reads tags with lofty.

pub mod headless;
pub mod media;
pub mod metadata;
pub mod probe;
pub mod track;

#[cfg(test)]
pub(crate) mod test_support;

pub use {
    headless::{HeadlessConfig, HeadlessHandle},
    media::{
        MediaEvent, MediaEventKind, MediaHandle, MediaListeners, MediaSubscription, PlaybackError,
        SourceId,
    },
    track::Track,
};
