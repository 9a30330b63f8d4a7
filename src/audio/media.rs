//! The media-handle capability consumed by the playback coordinator.
//!
//! A media handle decodes and outputs one source at a time. The coordinator
//! drives it through the `MediaHandle` trait and learns about its actual
//! status only through the events it emits.

use std::fmt::{Display, Formatter, Result as FmtResult};

use {
    async_channel::{Receiver, Sender, TryRecvError, unbounded},
    parking_lot::Mutex,
    serde::{Deserialize, Serialize},
    thiserror::Error,
    tracing::debug,
};

/// Generation number assigned by a handle on every `set_source` call.
///
/// Events are tagged with the source they belong to so that late events
/// from a superseded source can be told apart from current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceId(pub u64);

impl SourceId {
    /// Returns the id following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "source#{}", self.0)
    }
}

/// Media-level playback failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackError {
    /// The source could not be located or fetched.
    #[error("Source unavailable")]
    SourceUnavailable,
    /// The source was found but could not be decoded.
    #[error("Decode failed")]
    DecodeFailed,
    /// Playback was requested but could not proceed.
    #[error("Playback aborted")]
    Aborted,
}

/// Status notification kinds emitted by a media handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MediaEventKind {
    /// Playback position moved, in seconds.
    PositionChanged(f64),
    /// Total duration became known, in seconds.
    DurationKnown(f64),
    /// Playback actually started.
    Started,
    /// Playback was suspended.
    Paused,
    /// Playback reached the end of the source.
    Ended,
    /// The source failed to load or play.
    Failed(PlaybackError),
}

/// A status notification tagged with the source it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaEvent {
    /// Source the event refers to.
    pub source: SourceId,
    /// What happened.
    pub kind: MediaEventKind,
}

impl MediaEvent {
    /// Creates a new event for `source`.
    pub fn new(source: SourceId, kind: MediaEventKind) -> Self {
        Self { source, kind }
    }
}

/// Capability that actually decodes and outputs audio.
///
/// Every method is fire-and-forget: outcomes are reported asynchronously
/// through the events delivered to `subscribe`rs.
pub trait MediaHandle {
    /// Replaces the current source and returns its generation id.
    ///
    /// Implementations stop any current playback and reset position to 0.
    fn set_source(&mut self, uri: &str) -> SourceId;

    /// Relocates the playback position, in seconds.
    fn set_position(&mut self, seconds: f64);

    /// Current playback position, in seconds.
    fn position(&self) -> f64;

    /// Total duration in seconds, or `None` while unknown.
    fn duration(&self) -> Option<f64>;

    /// Sets the output volume as a fraction in `[0, 1]`.
    fn set_volume(&mut self, fraction: f64);

    /// Requests playback to start or resume.
    fn start(&mut self);

    /// Requests playback to stop.
    fn stop(&mut self);

    /// Registers a listener for status events.
    ///
    /// The listener stays registered until the returned subscription is dropped.
    fn subscribe(&mut self) -> MediaSubscription;
}

/// Registered listener for media events.
///
/// Dropping the subscription closes its channel, which deregisters it from
/// the emitting handle on the next emission.
#[derive(Debug)]
pub struct MediaSubscription {
    rx: Receiver<MediaEvent>,
}

impl MediaSubscription {
    /// Waits for the next event.
    ///
    /// # Returns
    ///
    /// The next event, or `None` once the emitting handle is gone.
    pub async fn recv(&self) -> Option<MediaEvent> {
        self.rx.recv().await.ok()
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&self) -> Option<MediaEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Drop for MediaSubscription {
    fn drop(&mut self) {
        self.rx.close();
    }
}

/// Listener registry shared by media handle implementations.
#[derive(Debug, Default)]
pub struct MediaListeners {
    senders: Mutex<Vec<Sender<MediaEvent>>>,
}

impl MediaListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new listener.
    pub fn subscribe(&self) -> MediaSubscription {
        let (tx, rx) = unbounded();
        self.senders.lock().push(tx);
        MediaSubscription { rx }
    }

    /// Delivers `event` to every live listener and forgets closed ones.
    pub fn emit(&self, event: MediaEvent) {
        let mut senders = self.senders.lock();
        senders.retain(|tx| {
            if tx.try_send(event).is_ok() {
                true
            } else {
                debug!("Dropping closed media listener");
                false
            }
        });
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.senders.lock().iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
