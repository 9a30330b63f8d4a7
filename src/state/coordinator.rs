//! The playback coordinator.
//!
//! `PlaybackCoordinator` is the sole owner of the media handle and the only
//! writer of `PlaybackState`. Callers drive it through the control API;
//! the handle reports back through media events, which the owner of the
//! coordinator feeds into `apply_media_event` from the same event loop.

use std::sync::Arc;

use {
    parking_lot::RwLock,
    tokio::sync::broadcast::{Receiver, Sender, channel},
    tracing::{debug, warn},
};

use crate::{
    audio::{
        MediaEvent,
        MediaEventKind::{DurationKnown, Ended, Failed, Paused, PositionChanged, Started},
        MediaHandle, MediaSubscription, SourceId, Track,
    },
    state::playback::{
        ControlOutcome, PlaybackState, PlaybackStateReader, PlayerEvent, ViewMode, clamp_seek,
        clamp_volume,
    },
};

/// Capacity of the player notification channel.
const EVENT_CAPACITY: usize = 64;

/// Owns one media handle and keeps `PlaybackState` in sync with it.
///
/// `is_playing` is only ever written in response to the handle's own
/// started/paused/ended/failed events, never by `play` or `pause`.
pub struct PlaybackCoordinator<H: MediaHandle> {
    /// The one media handle, reused across tracks.
    handle: H,
    /// Listener registration on `handle`, released on drop.
    subscription: MediaSubscription,
    /// Source id of the current track; events for other ids are stale.
    source: Option<SourceId>,
    /// A start was requested and the handle has not answered it yet.
    start_pending: bool,
    /// Published state.
    state: Arc<RwLock<PlaybackState>>,
    /// Broadcast channel for player notifications.
    events_tx: Sender<PlayerEvent>,
}

impl<H: MediaHandle> PlaybackCoordinator<H> {
    /// Creates a coordinator owning `handle`.
    ///
    /// # Arguments
    ///
    /// * `handle` - The media handle to drive.
    /// * `volume` - Initial volume, clamped to `[0, 1]`.
    pub fn new(mut handle: H, volume: f64) -> Self {
        let subscription = handle.subscribe();
        let state = PlaybackState::with_volume(volume);
        handle.set_volume(state.volume);
        let (events_tx, _) = channel(EVENT_CAPACITY);

        Self {
            handle,
            subscription,
            source: None,
            start_pending: false,
            state: Arc::new(RwLock::new(state)),
            events_tx,
        }
    }

    /// Returns a read-only projection for display surfaces.
    #[must_use]
    pub fn reader(&self) -> PlaybackStateReader {
        PlaybackStateReader::new(Arc::clone(&self.state), self.events_tx.clone())
    }

    /// Gets the current state.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackState {
        self.state.read().clone()
    }

    /// Subscribes to player notifications.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.events_tx.subscribe()
    }

    /// The media handle being driven.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Replaces the current track and starts playing it.
    ///
    /// The new track, zeroed progress and duration, and the minimized view
    /// are published as a single snapshot. Whether playback actually starts
    /// is only known once the handle reports it.
    pub fn load_and_play(&mut self, track: Track) -> ControlOutcome {
        let source = self.handle.set_source(&track.src);
        self.handle.set_position(0.0);
        self.source = Some(source);
        debug!(%source, track = %track, "Loading track");

        self.update(|state| {
            state.current_track = Some(track);
            state.is_playing = false;
            state.progress_seconds = 0.0;
            state.duration_seconds = 0.0;
            state.last_error = None;
            state.view_mode = ViewMode::Minimized;
        });
        self.handle.start();
        self.start_pending = true;

        ControlOutcome::Applied
    }

    /// Requests playback to resume.
    pub fn play(&mut self) -> ControlOutcome {
        if !self.has_track() {
            return ControlOutcome::NoTrackLoaded;
        }
        self.handle.start();
        self.start_pending = true;
        ControlOutcome::Applied
    }

    /// Requests playback to pause.
    ///
    /// Always forwarded while a track is loaded, so a start the handle has
    /// not confirmed yet is cancelled as well.
    pub fn pause(&mut self) -> ControlOutcome {
        if !self.has_track() {
            return ControlOutcome::NoTrackLoaded;
        }
        self.handle.stop();
        self.start_pending = false;
        ControlOutcome::Applied
    }

    /// Pauses when playing or about to play, resumes otherwise.
    pub fn toggle_play(&mut self) -> ControlOutcome {
        if self.start_pending || self.state.read().is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Relocates the playback position.
    ///
    /// The target is clamped to `[0, duration]`, or only floored at `0`
    /// while the duration is unknown. Playing or paused status is kept.
    pub fn seek(&mut self, seconds: f64) -> ControlOutcome {
        let (has_track, duration) = {
            let state = self.state.read();
            (state.has_track(), state.duration_seconds)
        };
        if !has_track {
            return ControlOutcome::NoTrackLoaded;
        }
        let target = clamp_seek(seconds, duration);
        debug!(requested = seconds, target, "Seeking");
        self.handle.set_position(target);
        ControlOutcome::Applied
    }

    /// Sets the volume, clamped to `[0, 1]`. Kept across track changes.
    pub fn set_volume(&mut self, value: f64) -> ControlOutcome {
        let volume = clamp_volume(value);
        if self.state.read().volume == volume {
            return ControlOutcome::NoChange;
        }
        self.handle.set_volume(volume);
        self.update(|state| state.volume = volume);
        ControlOutcome::Applied
    }

    /// Switches to the full-screen view.
    pub fn expand(&mut self) -> ControlOutcome {
        self.switch_view(ViewMode::Expanded)
    }

    /// Switches to the compact bar.
    pub fn minimize(&mut self) -> ControlOutcome {
        self.switch_view(ViewMode::Minimized)
    }

    /// Stops playback and unloads the current track.
    ///
    /// Resets everything except the volume to the initial state.
    pub fn close(&mut self) -> ControlOutcome {
        self.handle.stop();
        self.handle.set_position(0.0);
        self.source = None;
        self.start_pending = false;
        debug!("Closing player");
        self.update(|state| *state = PlaybackState::with_volume(state.volume));
        ControlOutcome::Applied
    }

    /// Waits for the next event from the media handle.
    ///
    /// # Returns
    ///
    /// The event, or `None` once the handle stopped emitting.
    pub async fn next_media_event(&self) -> Option<MediaEvent> {
        self.subscription.recv().await
    }

    /// Applies every media event that is already queued.
    ///
    /// # Returns
    ///
    /// The number of events that changed or confirmed the state.
    pub fn drain_media_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.try_recv() {
            if self.apply_media_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Applies one media event to the published state.
    ///
    /// # Returns
    ///
    /// `false` if the event belongs to a superseded or closed source and
    /// was discarded.
    pub fn apply_media_event(&mut self, event: MediaEvent) -> bool {
        if self.source != Some(event.source) {
            debug!(source = %event.source, kind = ?event.kind, "Ignoring stale media event");
            return false;
        }

        if matches!(event.kind, Started | Paused | Ended | Failed(_)) {
            self.start_pending = false;
        }

        match event.kind {
            PositionChanged(seconds) => {
                let progress = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
                self.update(|state| state.progress_seconds = progress);
            }
            DurationKnown(seconds) => {
                let duration = if seconds.is_finite() && seconds > 0.0 {
                    seconds
                } else {
                    0.0
                };
                self.update(|state| state.duration_seconds = duration);
            }
            Started => self.update(|state| state.is_playing = true),
            Paused => self.update(|state| state.is_playing = false),
            Ended => {
                self.update(|state| state.is_playing = false);
                if let Some(track) = self.state.read().current_track.clone() {
                    debug!(track = %track, "Track ended");
                    let _ = self.events_tx.send(PlayerEvent::TrackEnded(track));
                }
            }
            Failed(error) => {
                self.update(|state| {
                    state.is_playing = false;
                    state.last_error = Some(error);
                });
                let track = self.state.read().current_track.clone();
                warn!(error = %error, track = ?track.as_ref().map(|t| t.title.as_str()), "Playback failed");
                let _ = self.events_tx.send(PlayerEvent::Error { track, error });
            }
        }
        true
    }

    fn has_track(&self) -> bool {
        self.state.read().has_track()
    }

    fn switch_view(&mut self, mode: ViewMode) -> ControlOutcome {
        let current = {
            let state = self.state.read();
            if !state.has_track() {
                return ControlOutcome::NoTrackLoaded;
            }
            state.view_mode
        };
        if current == mode {
            return ControlOutcome::NoChange;
        }
        debug!(from = ?current, to = ?mode, "Switching view");
        self.update(|state| state.view_mode = mode);
        ControlOutcome::Applied
    }

    /// Mutates the state and publishes the result if anything changed.
    fn update(&self, mutate: impl FnOnce(&mut PlaybackState)) {
        let snapshot = {
            let mut state = self.state.write();
            let before = state.clone();
            mutate(&mut state);
            if *state == before {
                return;
            }
            state.clone()
        };
        // No receivers is fine: nobody is displaying the player.
        let _ = self.events_tx.send(PlayerEvent::StateChanged(snapshot));
    }
}
