//! Formatting helpers shared by the display surfaces.

/// Width of the progress bar in characters.
pub const PROGRESS_BAR_WIDTH: usize = 20;

/// Formats a number of seconds as `m:ss`.
///
/// Zero, negative and non-finite values render as `0:00`.
///
/// # Arguments
///
/// * `total_seconds` - Time to format.
#[must_use]
pub fn format_time(total_seconds: f64) -> String {
    if !total_seconds.is_finite() || total_seconds <= 0.0 {
        return "0:00".to_string();
    }
    let whole = total_seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Playback progress as a percentage in `[0, 100]`.
///
/// Returns `0` while the duration is unknown.
#[must_use]
pub fn progress_percent(progress_seconds: f64, duration_seconds: f64) -> f64 {
    if duration_seconds.is_nan() || duration_seconds <= 0.0 || !progress_seconds.is_finite() {
        return 0.0;
    }
    (progress_seconds / duration_seconds * 100.0).clamp(0.0, 100.0)
}

/// Renders a bar of `width` cells, filled to `percent`.
#[must_use]
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Volume as a whole percentage.
#[must_use]
pub fn volume_percent(volume: f64) -> u8 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u8
}
