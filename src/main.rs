//! SoundWave - terminal player
//!
//! Loads the user settings, sets up logging, and runs an interactive
//! session over stdin and stdout.

use std::{io::stderr, path::PathBuf};

use {
    anyhow::Context,
    tokio::io::{BufReader, stdin, stdout},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt},
};

use soundwave::{
    Catalog, HeadlessHandle, PlaybackCoordinator, Session, SettingsManager,
    error::{ErrorReporter, RuntimeError},
    runtime::run,
};

/// Main entry point for the SoundWave player.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_manager = SettingsManager::new()
        .map_err(RuntimeError::from)
        .context("Cannot load settings")?;
    let settings = settings_manager.get_settings().clone();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .map_err(|error| RuntimeError::LoggingError(error.to_string()))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .try_init()
        .map_err(|error| RuntimeError::LoggingError(error.to_string()))?;

    info!(
        config = %settings_manager.get_config_path().display(),
        volume = settings.default_volume,
        "Starting SoundWave"
    );

    let handle = HeadlessHandle::new(settings.headless_config());
    let coordinator = PlaybackCoordinator::new(handle, settings.default_volume);
    let mut session = Session::new(
        coordinator,
        Catalog::sample(),
        settings.media_root.as_ref().map(PathBuf::from),
    );

    if let Err(error) = run(&mut session, BufReader::new(stdin()), stdout()).await {
        ErrorReporter::error(&error, "Running session");
        return Err(error);
    }
    Ok(())
}
