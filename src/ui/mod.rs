//! Text display surfaces for the player.
//!
//! Each surface is a pure function of a `PlaybackState` snapshot; which one
//! is shown depends on the view mode.

pub mod full_player;
pub mod mini_player;
pub mod utils;

use crate::state::{PlaybackState, ViewMode};

/// Renders the surface for the current view mode.
///
/// # Returns
///
/// `None` while the player is closed.
#[must_use]
pub fn render(state: &PlaybackState) -> Option<String> {
    match state.view_mode {
        ViewMode::Closed => None,
        ViewMode::Minimized => Some(mini_player::render(state)),
        ViewMode::Expanded => Some(full_player::render(state)),
    }
}
