//! The interactive terminal session.
//!
//! `Session` turns parsed commands into coordinator calls and renders the
//! result; `run` multiplexes input lines and media events on one task so the
//! coordinator is only ever touched from there.

use std::path::{Path, PathBuf};

use {
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
        select,
        sync::broadcast::{Receiver, error::TryRecvError},
    },
    tracing::{debug, info, warn},
};

use crate::{
    audio::{
        MediaEvent, MediaHandle, Track,
        metadata::{UNKNOWN_ARTIST, read_track, title_from_path},
        probe::{ProbeError, resolve_source},
    },
    error::{AudioError, ErrorReporter, Result, ResultExt, RuntimeError},
    library::Catalog,
    runtime::command::{Command, HELP, PlayTarget},
    state::{ControlOutcome, PlaybackCoordinator, PlayerEvent},
    ui,
};

const NO_TRACK: &str = "No track loaded. Use `play <n>` to pick one from `list`.";
const CLOSED: &str = "Player closed.";

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print the text and keep reading.
    Continue(String),
    /// Leave the loop.
    Quit,
}

/// Terminal session around one coordinator.
pub struct Session<H: MediaHandle> {
    coordinator: PlaybackCoordinator<H>,
    catalog: Catalog,
    media_root: Option<PathBuf>,
    notices: Receiver<PlayerEvent>,
}

impl<H: MediaHandle> Session<H> {
    /// Creates a session.
    ///
    /// # Arguments
    ///
    /// * `coordinator` - The coordinator to drive.
    /// * `catalog` - Tracks reachable by position or title.
    /// * `media_root` - Base directory for relative file paths.
    pub fn new(
        coordinator: PlaybackCoordinator<H>,
        catalog: Catalog,
        media_root: Option<PathBuf>,
    ) -> Self {
        let notices = coordinator.subscribe();
        Self {
            coordinator,
            catalog,
            media_root,
            notices,
        }
    }

    /// The coordinator being driven.
    pub fn coordinator(&self) -> &PlaybackCoordinator<H> {
        &self.coordinator
    }

    /// Runs one command against the coordinator.
    pub fn execute(&mut self, command: Command) -> Reply {
        debug!(?command, "Executing command");
        let outcome = match command {
            Command::List => return Reply::Continue(self.list()),
            Command::Help => return Reply::Continue(HELP.to_string()),
            Command::Status => return Reply::Continue(self.surface()),
            Command::Quit => {
                self.coordinator.close();
                return Reply::Quit;
            }
            Command::Play(Some(target)) => match self.resolve_track(&target) {
                Ok(track) => self.coordinator.load_and_play(track),
                Err(error) => {
                    ErrorReporter::warn(&error, "Resolving track");
                    return Reply::Continue(ErrorReporter::to_user_message(&error));
                }
            },
            Command::Play(None) => self.coordinator.play(),
            Command::Pause => self.coordinator.pause(),
            Command::Toggle => self.coordinator.toggle_play(),
            Command::Seek(seconds) => self.coordinator.seek(seconds),
            Command::Volume(level) => self.coordinator.set_volume(level),
            Command::Expand => self.coordinator.expand(),
            Command::Minimize => self.coordinator.minimize(),
            Command::Close => self.coordinator.close(),
        };

        if outcome == ControlOutcome::NoTrackLoaded {
            return Reply::Continue(NO_TRACK.to_string());
        }
        self.coordinator.drain_media_events();
        Reply::Continue(self.surface())
    }

    /// Applies one media event to the coordinator.
    pub fn apply_media_event(&mut self, event: MediaEvent) {
        self.coordinator.apply_media_event(event);
    }

    /// Takes the track-ended and error notices published since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        let mut notices = Vec::new();
        loop {
            match self.notices.try_recv() {
                Ok(PlayerEvent::TrackEnded(track)) => notices.push(format!("Finished: {track}")),
                Ok(PlayerEvent::Error { track, error }) => notices.push(match track {
                    Some(track) => format!("Cannot play {track}: {error}"),
                    None => format!("Playback error: {error}"),
                }),
                Ok(PlayerEvent::StateChanged(_)) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Notice receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        notices
    }

    fn surface(&self) -> String {
        ui::render(&self.coordinator.snapshot()).unwrap_or_else(|| CLOSED.to_string())
    }

    fn list(&self) -> String {
        let mut lines = Vec::new();
        let mut position = 0;
        for section in self.catalog.sections() {
            lines.push(section.title.clone());
            for track in &section.tracks {
                position += 1;
                lines.push(format!("  {position:>2}. {track}"));
            }
        }
        lines.join("\n")
    }

    fn resolve_track(&self, target: &PlayTarget) -> Result<Track> {
        match target {
            PlayTarget::Position(position) => self
                .catalog
                .get(*position)
                .cloned()
                .add_context("Cannot pick track"),
            PlayTarget::Title(title) => self
                .catalog
                .find(title)
                .cloned()
                .add_context("Cannot pick track"),
            PlayTarget::Path(uri) => Ok(track_from_path(uri, self.media_root.as_deref())),
        }
    }
}

/// Builds a track for a file given on the command line.
///
/// Tags fill in title and artist when the file can be read. Otherwise the
/// track is still returned, named after the file, and the media handle
/// reports the failure once it tries to load it.
fn track_from_path(uri: &str, media_root: Option<&Path>) -> Track {
    let fallback = |path: &Path| {
        Track::new(title_from_path(path), UNKNOWN_ARTIST, String::new(), uri)
    };

    let path = match resolve_source(uri, media_root) {
        Ok(path) => path,
        Err(error @ ProbeError::UnsupportedScheme { .. }) => {
            debug!(%error, uri, "Not reading tags of remote source");
            return fallback(Path::new(uri));
        }
        Err(error) => {
            warn!(%error, uri, "Cannot resolve source");
            return fallback(Path::new(uri));
        }
    };

    match read_track(&path)
        .map_err(AudioError::from)
        .add_contextf(format!("Reading tags of {}", path.display()))
    {
        Ok(track) => Track {
            src: uri.to_string(),
            ..track
        },
        Err(error) => {
            ErrorReporter::warn(&error, "Reading track metadata");
            fallback(&path)
        }
    }
}

/// Runs the session until `quit` or the end of input.
///
/// # Arguments
///
/// * `session` - Session to drive.
/// * `input` - Source of command lines.
/// * `output` - Where replies and notices are written.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run<H, R, W>(session: &mut Session<H>, input: R, mut output: W) -> Result<()>
where
    H: MediaHandle,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_line(&mut output, "SoundWave. Type `help` for commands.").await?;

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line.map_err(RuntimeError::from)? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match Command::parse(&line) {
                    Ok(command) => session.execute(command),
                    Err(error) => {
                        let error = anyhow::Error::from(RuntimeError::from(error));
                        ErrorReporter::warn(&error, "Parsing command");
                        Reply::Continue(ErrorReporter::to_user_message(&error))
                    }
                };
                match reply {
                    Reply::Continue(text) => write_line(&mut output, &text).await?,
                    Reply::Quit => break,
                }
            }
            event = session.coordinator.next_media_event() => {
                let Some(event) = event else {
                    warn!("Media handle stopped emitting events");
                    break;
                };
                session.apply_media_event(event);
            }
        }

        for notice in session.take_notices() {
            write_line(&mut output, &notice).await?;
        }
    }

    output.flush().await.map_err(RuntimeError::from)?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(format!("{text}\n").as_bytes())
        .await
        .map_err(RuntimeError::from)?;
    output.flush().await.map_err(RuntimeError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use tempfile::tempdir;

    use crate::{
        audio::{HeadlessConfig, HeadlessHandle, test_support::write_silent_wav},
        library::Catalog,
        runtime::{
            command::{Command, PlayTarget},
            event_loop::{CLOSED, NO_TRACK, Reply, Session, run, track_from_path},
        },
        state::{PlaybackCoordinator, ViewMode},
    };

    fn new_session(media_root: Option<PathBuf>) -> Session<HeadlessHandle> {
        let handle = HeadlessHandle::new(HeadlessConfig {
            tick_interval: Duration::from_millis(20),
            media_root: media_root.clone(),
        });
        Session::new(
            PlaybackCoordinator::new(handle, 0.8),
            Catalog::sample(),
            media_root,
        )
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Continue(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_list_numbers_tracks_across_sections() {
        let mut session = new_session(None);
        let listing = text(session.execute(Command::List));

        assert!(listing.starts_with("Trending Now\n   1. Midnight City - M83"));
        assert!(listing.contains("New Releases\n   5. As It Was - Harry Styles"));
        assert!(listing.contains("12. Levels - Avicii"));
    }

    #[tokio::test]
    async fn test_controls_without_track() {
        let mut session = new_session(None);

        assert_eq!(text(session.execute(Command::Pause)), NO_TRACK);
        assert_eq!(text(session.execute(Command::Seek(10.0))), NO_TRACK);
        assert_eq!(text(session.execute(Command::Status)), CLOSED);
        assert_eq!(text(session.execute(Command::Close)), CLOSED);
    }

    #[tokio::test]
    async fn test_play_from_catalog_shows_mini_player() {
        let mut session = new_session(None);

        let shown = text(session.execute(Command::Play(Some(
            PlayTarget::Title("levels".to_string()),
        ))));
        assert!(shown.contains("Levels - Avicii"));

        let state = session.coordinator().snapshot();
        assert_eq!(state.view_mode, ViewMode::Minimized);
        assert_eq!(
            state.current_track.map(|track| track.src),
            Some("tracks/levels.mp3".to_string())
        );

        let expanded = text(session.execute(Command::Expand));
        assert!(expanded.starts_with("Now Playing"));

        session.execute(Command::Volume(0.5));
        assert_eq!(session.coordinator().snapshot().volume, 0.5);
    }

    #[tokio::test]
    async fn test_unknown_catalog_entry_is_reported() {
        let mut session = new_session(None);

        let reply = text(session.execute(Command::Play(Some(
            PlayTarget::Position(99),
        ))));
        assert_eq!(
            reply,
            "Cannot pick track: Track 99 is out of range (catalog has 12 tracks)"
        );
        assert!(session.coordinator().snapshot().current_track.is_none());
    }

    #[tokio::test]
    async fn test_missing_source_produces_error_notice() {
        let dir = tempdir().unwrap();
        let mut session = new_session(Some(dir.path().to_path_buf()));
        session.execute(Command::Play(Some(
            PlayTarget::Position(1),
        )));

        let notices = loop {
            let notices = session.take_notices();
            if !notices.is_empty() {
                break notices;
            }
            let event = session.coordinator.next_media_event().await.unwrap();
            session.apply_media_event(event);
        };
        assert_eq!(
            notices[0],
            "Cannot play Midnight City - M83: Source unavailable"
        );
    }

    #[test]
    fn test_track_from_path_reads_file_or_falls_back() {
        let dir = tempdir().unwrap();
        write_silent_wav(&dir.path().join("morning_walk.wav"), 8_000, 800);

        let track = track_from_path("morning_walk.wav", Some(dir.path()));
        assert_eq!(track.title, "morning walk");
        assert_eq!(track.src, "morning_walk.wav");

        let missing = track_from_path("gone/lost-song.mp3", Some(dir.path()));
        assert_eq!(missing.title, "lost song");
        assert_eq!(missing.src, "gone/lost-song.mp3");

        let remote = track_from_path("https://cdn.example.com/a/stream.mp3", None);
        assert_eq!(remote.title, "stream");
    }

    #[tokio::test]
    async fn test_run_processes_commands_until_quit() {
        let mut session = new_session(None);
        let input: &[u8] = b"help\nplay 2\nexpand\nbogus\nquit\nstatus\n";
        let mut output = Vec::new();

        run(&mut session, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Commands:"));
        assert!(printed.contains("Blinding Lights - The Weeknd"));
        assert!(printed.contains("Now Playing"));
        assert!(printed.contains("Command error: Unknown command: bogus"));
        assert!(!printed.contains(CLOSED));
        assert!(session.coordinator().snapshot().current_track.is_none());
    }
}
