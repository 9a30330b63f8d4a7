//! Compact player bar.

use crate::{
    state::PlaybackState,
    ui::utils::{format_time, progress_bar, progress_percent},
};

/// Width of the mini player's progress bar.
const BAR_WIDTH: usize = 10;

/// Renders the one-line bar shown while the player is minimized.
///
/// Returns an empty string when no track is loaded.
#[must_use]
pub fn render(state: &PlaybackState) -> String {
    let Some(track) = state.current_track.as_ref() else {
        return String::new();
    };

    let status = if state.is_playing { "playing" } else { "paused" };
    let percent = progress_percent(state.progress_seconds, state.duration_seconds);
    let mut line = format!(
        "[{status}] {track}  {} / {}  {}",
        format_time(state.progress_seconds),
        format_time(state.duration_seconds),
        progress_bar(percent, BAR_WIDTH),
    );
    if let Some(error) = state.last_error {
        line.push_str(&format!("  ({error})"));
    }
    line
}
