//! Parsing of the player's line commands.

use std::{num::ParseFloatError, str::FromStr};

use thiserror::Error;

/// Error type for command parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The line was empty.
    #[error("Empty command")]
    Empty,
    /// The command word is not known.
    #[error("Unknown command: {0}")]
    Unknown(String),
    /// A required argument is missing.
    #[error("Missing argument for {command}: expected {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    /// A time could not be parsed.
    #[error("Invalid time \"{0}\": expected seconds or m:ss")]
    InvalidTime(String),
    /// A volume could not be parsed.
    #[error("Invalid volume \"{0}\": expected 0..1 or 0..100%")]
    InvalidVolume(String),
}

/// What `play` should load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayTarget {
    /// 1-based catalog position.
    Position(usize),
    /// Catalog title, matched case-insensitively.
    Title(String),
    /// Local file path or `file://` URI.
    Path(String),
}

/// A parsed player command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the catalog.
    List,
    /// Load a track, or resume the current one.
    Play(Option<PlayTarget>),
    /// Pause playback.
    Pause,
    /// Pause when playing, resume otherwise.
    Toggle,
    /// Seek to an absolute time in seconds.
    Seek(f64),
    /// Set the volume, as a fraction.
    Volume(f64),
    /// Show the full-screen view.
    Expand,
    /// Show the compact bar.
    Minimize,
    /// Stop and unload the track.
    Close,
    /// Print the active surface.
    Status,
    /// Print the command reference.
    Help,
    /// Close the player and leave the session.
    Quit,
}

/// Usage shown by `help`.
pub const HELP: &str = "\
Commands:
  list                     show the catalog
  play [<n>|<title>|<path>] load a track, or resume
  pause | toggle           pause, or toggle play/pause
  seek <secs|m:ss>         jump to a position
  volume <0..1|0..100%>    set the volume
  expand | minimize        switch between full view and mini bar
  close                    stop and unload the track
  status                   show the player
  help                     show this text
  quit                     exit";

impl Command {
    /// Parses one input line.
    ///
    /// Command words are case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for an empty line, an unknown command or a
    /// missing or malformed argument.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        if word.is_empty() {
            return Err(CommandError::Empty);
        }

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "play" => Command::Play((!rest.is_empty()).then(|| parse_target(rest))),
            "pause" => Command::Pause,
            "toggle" => Command::Toggle,
            "seek" => Command::Seek(parse_time(require(rest, "seek", "a time")?)?),
            "volume" | "vol" => {
                Command::Volume(parse_volume(require(rest, "volume", "a level")?)?)
            }
            "expand" => Command::Expand,
            "minimize" => Command::Minimize,
            "close" => Command::Close,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(command)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

fn require<'a>(
    rest: &'a str,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, expected })
    } else {
        Ok(rest)
    }
}

fn parse_target(argument: &str) -> PlayTarget {
    if let Ok(position) = argument.parse::<usize>() {
        return PlayTarget::Position(position);
    }
    if argument.contains('/') || argument.contains('\\') || argument.contains("://") {
        return PlayTarget::Path(argument.to_string());
    }
    PlayTarget::Title(argument.to_string())
}

/// Parses `90`, `90.5` or `1:30` into seconds.
///
/// Negative values are accepted; the coordinator clamps them.
///
/// # Errors
///
/// Returns `CommandError::InvalidTime` for anything else, including a
/// seconds field of 60 or more in `m:ss` form.
pub fn parse_time(argument: &str) -> Result<f64, CommandError> {
    let invalid = |_: ParseFloatError| CommandError::InvalidTime(argument.to_string());

    let Some((minutes, seconds)) = argument.split_once(':') else {
        return argument.parse::<f64>().map_err(invalid);
    };
    let minutes = minutes
        .parse::<u64>()
        .map_err(|_| CommandError::InvalidTime(argument.to_string()))?;
    let seconds = seconds.parse::<f64>().map_err(invalid)?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(CommandError::InvalidTime(argument.to_string()));
    }
    Ok(minutes as f64 * 60.0 + seconds)
}

/// Parses `0.5` or `50%` into a volume fraction.
///
/// Out-of-range values are accepted; the coordinator clamps them.
///
/// # Errors
///
/// Returns `CommandError::InvalidVolume` if the number is malformed.
pub fn parse_volume(argument: &str) -> Result<f64, CommandError> {
    let invalid = |_: ParseFloatError| CommandError::InvalidVolume(argument.to_string());

    match argument.strip_suffix('%') {
        Some(percent) => Ok(percent.trim().parse::<f64>().map_err(invalid)? / 100.0),
        None => argument.parse::<f64>().map_err(invalid),
    }
}
