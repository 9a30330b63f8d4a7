//! Published playback state.
//!
//! `PlaybackState` is written only by the playback coordinator. Display
//! surfaces read it through a `PlaybackStateReader`, either as a snapshot or
//! by subscribing to `PlayerEvent` notifications.

use std::sync::Arc;

use {
    parking_lot::RwLock,
    serde::{Deserialize, Serialize},
    tokio::sync::broadcast::{Receiver, Sender},
};

use crate::audio::{PlaybackError, Track};

/// Volume used before any settings are applied.
pub const DEFAULT_VOLUME: f64 = 0.8;

/// Which display surface the player is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// No track loaded, nothing shown.
    #[default]
    Closed,
    /// Compact bar.
    Minimized,
    /// Full-screen view.
    Expanded,
}

/// Snapshot of the player as seen by display surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Loaded track, if any.
    pub current_track: Option<Track>,
    /// Whether the media handle reports active playback.
    pub is_playing: bool,
    /// Current position in seconds.
    pub progress_seconds: f64,
    /// Total length in seconds, `0` while unknown.
    pub duration_seconds: f64,
    /// Output volume in `[0, 1]`.
    pub volume: f64,
    /// Active display surface.
    pub view_mode: ViewMode,
    /// Most recent media failure of the current source.
    pub last_error: Option<PlaybackError>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::with_volume(DEFAULT_VOLUME)
    }
}

impl PlaybackState {
    /// Creates the initial (closed) state with the given volume.
    #[must_use]
    pub fn with_volume(volume: f64) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            progress_seconds: 0.0,
            duration_seconds: 0.0,
            volume: clamp_volume(volume),
            view_mode: ViewMode::Closed,
            last_error: None,
        }
    }

    /// Whether a track is loaded.
    #[must_use]
    pub fn has_track(&self) -> bool {
        self.current_track.is_some()
    }

    /// Whether the total length is known.
    #[must_use]
    pub fn duration_known(&self) -> bool {
        self.duration_seconds > 0.0
    }
}

/// Notifications published by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The state changed; carries the new snapshot.
    StateChanged(PlaybackState),
    /// The current source failed.
    Error {
        /// Track whose source failed.
        track: Option<Track>,
        /// Failure kind.
        error: PlaybackError,
    },
    /// The current track played to its end.
    TrackEnded(Track),
}

/// Result of a control operation.
///
/// Control operations never fail; the outcome only tells whether they
/// did anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The request was forwarded or applied.
    Applied,
    /// Ignored because no track is loaded.
    NoTrackLoaded,
    /// Ignored because the state already matches the request.
    NoChange,
}

impl ControlOutcome {
    /// Whether the operation had an effect.
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Clamps a requested volume to `[0, 1]`. `NaN` maps to `0`.
#[must_use]
pub fn clamp_volume(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamps a requested seek target.
///
/// The target is clamped to `[0, duration]` when the duration is known and
/// only floored at `0` otherwise. `NaN` maps to `0`.
#[must_use]
pub fn clamp_seek(seconds: f64, duration_seconds: f64) -> f64 {
    if seconds.is_nan() {
        return 0.0;
    }
    if duration_seconds > 0.0 {
        seconds.clamp(0.0, duration_seconds)
    } else {
        seconds.max(0.0)
    }
}

/// Read-only projection of the coordinator's state.
///
/// Cheap to clone; hand one to every display surface.
#[derive(Debug, Clone)]
pub struct PlaybackStateReader {
    state: Arc<RwLock<PlaybackState>>,
    events_tx: Sender<PlayerEvent>,
}

impl PlaybackStateReader {
    pub(crate) fn new(state: Arc<RwLock<PlaybackState>>, events_tx: Sender<PlayerEvent>) -> Self {
        Self { state, events_tx }
    }

    /// Gets the current state.
    ///
    /// # Returns
    ///
    /// A clone of the current `PlaybackState`.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackState {
        self.state.read().clone()
    }

    /// Subscribes to player notifications.
    ///
    /// # Returns
    ///
    /// A broadcast receiver for `PlayerEvent`s published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.events_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{from_str, to_string};

    use crate::state::playback::{
        ControlOutcome, DEFAULT_VOLUME, PlaybackState, ViewMode, clamp_seek, clamp_volume,
    };

    #[test]
    fn test_initial_state_is_closed() {
        let state = PlaybackState::default();
        assert!(state.current_track.is_none());
        assert!(!state.is_playing);
        assert_eq!(state.progress_seconds, 0.0);
        assert_eq!(state.duration_seconds, 0.0);
        assert_eq!(state.volume, DEFAULT_VOLUME);
        assert_eq!(state.view_mode, ViewMode::Closed);
        assert!(state.last_error.is_none());
        assert!(!state.duration_known());
    }

    #[test]
    fn test_initial_volume_is_clamped() {
        assert_eq!(PlaybackState::with_volume(4.0).volume, 1.0);
        assert_eq!(PlaybackState::with_volume(-4.0).volume, 0.0);
    }

    #[test]
    fn test_clamp_volume() {
        for (requested, expected) in [
            (0.5, 0.5),
            (1.5, 1.0),
            (-0.2, 0.0),
            (f64::INFINITY, 1.0),
            (f64::NEG_INFINITY, 0.0),
            (f64::NAN, 0.0),
        ] {
            assert_eq!(clamp_volume(requested), expected, "requested {requested}");
        }
    }

    #[test]
    fn test_clamp_seek_with_known_duration() {
        assert_eq!(clamp_seek(30.0, 200.0), 30.0);
        assert_eq!(clamp_seek(500.0, 200.0), 200.0);
        assert_eq!(clamp_seek(-5.0, 200.0), 0.0);
    }

    #[test]
    fn test_clamp_seek_with_unknown_duration() {
        assert_eq!(clamp_seek(500.0, 0.0), 500.0);
        assert_eq!(clamp_seek(-5.0, 0.0), 0.0);
        assert_eq!(clamp_seek(f64::NAN, 0.0), 0.0);
    }

    #[test]
    fn test_control_outcome_is_applied() {
        assert!(ControlOutcome::Applied.is_applied());
        assert!(!ControlOutcome::NoTrackLoaded.is_applied());
        assert!(!ControlOutcome::NoChange.is_applied());
    }

    #[test]
    fn test_view_mode_serialization() {
        for mode in [ViewMode::Closed, ViewMode::Minimized, ViewMode::Expanded] {
            let serialized = to_string(&mode).unwrap();
            let deserialized: ViewMode = from_str(&serialized).unwrap();
            assert_eq!(mode, deserialized);
        }
    }
}
