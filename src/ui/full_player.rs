//! Full-screen player view.

use std::fmt::Write;

use crate::{
    state::PlaybackState,
    ui::utils::{PROGRESS_BAR_WIDTH, format_time, progress_bar, progress_percent, volume_percent},
};

/// Renders the multi-line view shown while the player is expanded.
///
/// Returns an empty string when no track is loaded.
#[must_use]
pub fn render(state: &PlaybackState) -> String {
    let Some(track) = state.current_track.as_ref() else {
        return String::new();
    };

    let percent = progress_percent(state.progress_seconds, state.duration_seconds);
    let status = if state.is_playing { "Playing" } else { "Paused" };

    let mut out = String::new();
    let _ = writeln!(out, "Now Playing");
    let _ = writeln!(out, "  {}", track.title);
    let _ = writeln!(out, "  {}", track.artist);
    if !track.cover_url.is_empty() {
        let _ = writeln!(out, "  Cover: {}", track.cover_url);
    }
    let _ = writeln!(
        out,
        "  {} {} {}",
        format_time(state.progress_seconds),
        progress_bar(percent, PROGRESS_BAR_WIDTH),
        format_time(state.duration_seconds),
    );
    let _ = write!(
        out,
        "  {status} | Volume {}%",
        volume_percent(state.volume)
    );
    if let Some(error) = state.last_error {
        let _ = write!(out, " | {error}");
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::{
        audio::Track,
        state::{PlaybackState, ViewMode},
        ui::full_player::render,
    };

    #[test]
    fn test_render_expanded() {
        let state = PlaybackState {
            current_track: Some(Track::new(
                "Strobe",
                "Deadmau5",
                "https://img.example.com/strobe.jpg",
                "strobe.mp3",
            )),
            is_playing: true,
            progress_seconds: 150.0,
            duration_seconds: 600.0,
            volume: 0.5,
            view_mode: ViewMode::Expanded,
            last_error: None,
        };

        let expected = "Now Playing\n  Strobe\n  Deadmau5\n  Cover: https://img.example.com/strobe.jpg\n  2:30 [#####---------------] 10:00\n  Playing | Volume 50%";
        assert_eq!(render(&state), expected);
    }

    #[test]
    fn test_render_skips_missing_cover() {
        let state = PlaybackState {
            current_track: Some(Track::new("Opus", "Eric Prydz", "", "opus.mp3")),
            view_mode: ViewMode::Expanded,
            ..PlaybackState::default()
        };
        let rendered = render(&state);
        assert!(!rendered.contains("Cover"));
        assert!(rendered.ends_with("Paused | Volume 80%"));
    }

    #[test]
    fn test_render_without_track() {
        assert!(render(&PlaybackState::default()).is_empty());
    }
}
