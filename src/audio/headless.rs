//! Media handle that plays sources on a clock without an audio device.
//!
//! `HeadlessHandle` resolves and probes local sources with `symphonia`,
//! then advances the playback position by elapsed wall time while playing.
//! It reports everything through media events, so it behaves towards the
//! coordinator exactly like a device-backed handle would.

use std::{
    path::PathBuf,
    sync::{Arc, Weak},
};

use {
    async_channel::{Receiver, Sender, unbounded},
    parking_lot::Mutex,
    tokio::{
        select, spawn,
        task::spawn_blocking,
        time::{Duration, Instant, MissedTickBehavior, interval},
    },
    tracing::{debug, warn},
};

use crate::audio::{
    media::{
        MediaEvent,
        MediaEventKind::{self, DurationKnown, Ended, Failed, Paused, PositionChanged, Started},
        MediaHandle, MediaListeners, MediaSubscription, PlaybackError, SourceId,
    },
    probe::{ProbeError, ProbedSource, probe_source},
};

/// Default interval between position updates.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for a `HeadlessHandle`.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Interval between position updates while playing.
    pub tick_interval: Duration,
    /// Base directory for relative sources.
    pub media_root: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            media_root: None,
        }
    }
}

/// Loading status of the current source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceStatus {
    /// No source set.
    Empty,
    /// Probing in progress.
    Probing,
    /// Probed successfully.
    Ready,
    /// Probing failed.
    Failed(PlaybackError),
}

#[derive(Debug)]
struct Inner {
    source: SourceId,
    status: SourceStatus,
    position: f64,
    duration: Option<f64>,
    volume: f64,
    playing: bool,
    start_requested: bool,
    last_tick: Option<Instant>,
}

impl Inner {
    /// Folds the time elapsed since the last tick into `position`.
    fn advance_to(&mut self, now: Instant) {
        if let Some(last) = self.last_tick.replace(now)
            && self.playing
        {
            self.position += now.saturating_duration_since(last).as_secs_f64();
        }
    }

    fn at_end(&self) -> bool {
        self.duration.is_some_and(|duration| self.position >= duration)
    }

    fn begin_playback(&mut self, now: Instant, events: &mut Vec<MediaEventKind>) {
        self.start_requested = false;
        if self.playing {
            return;
        }
        if self.at_end() {
            self.position = 0.0;
            events.push(PositionChanged(0.0));
        }
        self.playing = true;
        self.last_tick = Some(now);
        events.push(Started);
    }
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    listeners: MediaListeners,
}

impl Shared {
    fn emit_all(&self, source: SourceId, events: Vec<MediaEventKind>) {
        for kind in events {
            self.listeners.emit(MediaEvent::new(source, kind));
        }
    }

    /// Advances the clock by one tick.
    fn tick(&self, now: Instant) {
        let mut inner = self.inner.lock();
        if !inner.playing {
            return;
        }
        inner.advance_to(now);
        let mut events = Vec::new();
        if let Some(duration) = inner.duration.filter(|d| inner.position >= *d) {
            inner.position = duration;
            inner.playing = false;
            inner.last_tick = None;
            events.push(PositionChanged(duration));
            events.push(Ended);
        } else {
            events.push(PositionChanged(inner.position));
        }
        self.emit_all(inner.source, events);
    }

    /// Applies the outcome of probing `source`.
    fn finish_probe(&self, source: SourceId, result: Result<ProbedSource, ProbeError>) {
        let mut events = Vec::new();
        let mut inner = self.inner.lock();
        if inner.source != source {
            debug!(%source, "Discarding probe result of superseded source");
            return;
        }
        match result {
            Ok(probed) => {
                debug!(%source, path = ?probed.path, duration = ?probed.duration_seconds, "Source ready");
                inner.status = SourceStatus::Ready;
                inner.duration = probed.duration_seconds.filter(|d| d.is_finite() && *d > 0.0);
                if let Some(duration) = inner.duration {
                    events.push(DurationKnown(duration));
                }
                if inner.start_requested {
                    inner.begin_playback(Instant::now(), &mut events);
                }
            }
            Err(error) => {
                let kind = error.playback_error();
                warn!(%source, error = %error, "Source failed to load");
                inner.status = SourceStatus::Failed(kind);
                inner.start_requested = false;
                events.push(Failed(kind));
            }
        }
        self.emit_all(source, events);
    }
}

/// Device-less media handle driven by a tokio clock.
///
/// Must be created inside a tokio runtime. Dropping the handle stops its
/// clock task.
#[derive(Debug)]
pub struct HeadlessHandle {
    shared: Arc<Shared>,
    media_root: Option<PathBuf>,
    shutdown_tx: Option<Sender<()>>,
}

impl HeadlessHandle {
    /// Creates a handle and starts its clock task.
    ///
    /// # Arguments
    ///
    /// * `config` - Tick interval and media root.
    #[must_use]
    pub fn new(config: HeadlessConfig) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                source: SourceId::default(),
                status: SourceStatus::Empty,
                position: 0.0,
                duration: None,
                volume: 1.0,
                playing: false,
                start_requested: false,
                last_tick: None,
            }),
            listeners: MediaListeners::new(),
        });

        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        let tick_interval = if config.tick_interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            config.tick_interval
        };
        spawn(run_clock(Arc::downgrade(&shared), tick_interval, shutdown_rx));

        Self {
            shared,
            media_root: config.media_root,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Current output volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.shared.inner.lock().volume
    }

    /// Whether the handle is currently producing output.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.shared.inner.lock().playing
    }
}

impl MediaHandle for HeadlessHandle {
    fn set_source(&mut self, uri: &str) -> SourceId {
        let source = {
            let mut inner = self.shared.inner.lock();
            let previous = inner.source;
            let mut events = Vec::new();
            if inner.playing {
                events.push(Paused);
            }
            inner.source = inner.source.next();
            inner.status = SourceStatus::Probing;
            inner.position = 0.0;
            inner.duration = None;
            inner.playing = false;
            inner.start_requested = false;
            inner.last_tick = None;
            self.shared.emit_all(previous, events);
            inner.source
        };

        debug!(%source, uri, "Probing source");
        let shared = Arc::downgrade(&self.shared);
        let uri = uri.to_string();
        let media_root = self.media_root.clone();
        spawn_blocking(move || {
            let result = probe_source(&uri, media_root.as_deref());
            if let Some(shared) = shared.upgrade() {
                shared.finish_probe(source, result);
            }
        });

        source
    }

    fn set_position(&mut self, seconds: f64) {
        let mut inner = self.shared.inner.lock();
        if inner.status == SourceStatus::Empty {
            return;
        }
        let mut position = seconds.max(0.0);
        if let Some(duration) = inner.duration {
            position = position.min(duration);
        }
        inner.position = position;
        if inner.playing {
            inner.last_tick = Some(Instant::now());
        }
        self.shared
            .emit_all(inner.source, vec![PositionChanged(position)]);
    }

    fn position(&self) -> f64 {
        let inner = self.shared.inner.lock();
        let mut position = inner.position;
        if inner.playing
            && let Some(last) = inner.last_tick
        {
            position += last.elapsed().as_secs_f64();
        }
        inner.duration.map_or(position, |duration| position.min(duration))
    }

    fn duration(&self) -> Option<f64> {
        self.shared.inner.lock().duration
    }

    fn set_volume(&mut self, fraction: f64) {
        self.shared.inner.lock().volume = fraction.clamp(0.0, 1.0);
    }

    fn start(&mut self) {
        let mut inner = self.shared.inner.lock();
        let mut events = Vec::new();
        match inner.status {
            SourceStatus::Empty => debug!("Start requested without a source"),
            SourceStatus::Probing => inner.start_requested = true,
            SourceStatus::Ready => inner.begin_playback(Instant::now(), &mut events),
            SourceStatus::Failed(_) => events.push(Failed(PlaybackError::Aborted)),
        }
        self.shared.emit_all(inner.source, events);
    }

    fn stop(&mut self) {
        let mut inner = self.shared.inner.lock();
        inner.start_requested = false;
        if !inner.playing {
            return;
        }
        inner.advance_to(Instant::now());
        if let Some(duration) = inner.duration {
            inner.position = inner.position.min(duration);
        }
        inner.playing = false;
        inner.last_tick = None;
        self.shared.emit_all(inner.source, vec![Paused]);
    }

    fn subscribe(&mut self) -> MediaSubscription {
        self.shared.listeners.subscribe()
    }
}

impl Drop for HeadlessHandle {
    fn drop(&mut self) {
        debug!("Shutting down headless media handle");
        drop(self.shutdown_tx.take());
    }
}

/// Clock loop advancing playback until the handle is dropped.
async fn run_clock(shared: Weak<Shared>, tick_interval: Duration, shutdown_rx: Receiver<()>) {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        select! {
            now = ticker.tick() => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.tick(now);
            }
            _ = shutdown_rx.recv() => {
                debug!("Headless clock received shutdown signal");
                break;
            }
        }
    }
}
