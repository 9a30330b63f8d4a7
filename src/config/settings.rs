//! User preference management with XDG Base Directory compliance.
//!
//! Settings only shape how the player starts (initial volume, update rate,
//! where local media lives, log verbosity). Playback state itself is never
//! written to disk.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
    time::Duration,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

use crate::{audio::HeadlessConfig, state::DEFAULT_VOLUME};

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Serializable user settings structure with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Volume the player starts with, in `[0, 1]`.
    pub default_volume: f64,
    /// Interval between position updates while playing, in milliseconds.
    pub position_update_interval_ms: u64,
    /// Base directory for relative track sources.
    pub media_root: Option<String>,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_volume: DEFAULT_VOLUME,
            position_update_interval_ms: 250,
            media_root: None,
            log_filter: "info".to_string(),
        }
    }
}

impl UserSettings {
    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for a volume outside `[0, 1]`
    /// or a zero update interval.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(SettingsError::InvalidValue {
                reason: format!(
                    "default_volume must be within 0..=1, got {}",
                    self.default_volume
                ),
            });
        }
        if self.position_update_interval_ms == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "position_update_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the media handle configuration these settings describe.
    #[must_use]
    pub fn headless_config(&self) -> HeadlessConfig {
        HeadlessConfig {
            tick_interval: Duration::from_millis(self.position_update_interval_ms),
            media_root: self.media_root.as_ref().map(PathBuf::from),
        }
    }
}

/// Handles loading, saving, and validation of user preferences.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe user settings storage.
    settings: RwLock<UserSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk or
    /// hold invalid values.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Path of the settings file.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk or
    /// hold invalid values.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str::<UserSettings>(&contents)?
        } else {
            debug!("Using default settings, no file at {:?}", config_path);
            UserSettings::default()
        };
        settings.validate()?;

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Validates, applies and saves new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the settings are invalid or cannot be
    /// saved to disk. Invalid settings are not applied.
    pub fn update_settings(&self, new_settings: UserSettings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Location of the settings file under the XDG config directory.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("soundwave");
    config_dir.push("settings.json");
    config_dir
}

/// Gets the XDG config home directory following XDG Base Directory specification.
///
/// Uses `XDG_CONFIG_HOME` environment variable if set, otherwise defaults to $HOME/.config
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{read_to_string, write},
        io::{Error, ErrorKind::NotFound},
        path::PathBuf,
        time::Duration,
    };

    use {
        serde_json::{from_str, to_string},
        tempfile::tempdir,
    };

    use crate::config::settings::{SettingsError, SettingsManager, UserSettings};

    #[test]
    fn test_user_settings_default() {
        let settings = UserSettings::default();
        assert_eq!(settings.default_volume, 0.8);
        assert_eq!(settings.position_update_interval_ms, 250);
        assert!(settings.media_root.is_none());
        assert_eq!(settings.log_filter, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_user_settings_serialization() {
        let settings = UserSettings {
            default_volume: 0.4,
            position_update_interval_ms: 100,
            media_root: Some("/srv/music".to_string()),
            log_filter: "soundwave=debug".to_string(),
        };

        let serialized = to_string(&settings).unwrap();
        let deserialized: UserSettings = from_str(&serialized).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: UserSettings = from_str(r#"{ "default_volume": 0.5 }"#).unwrap();
        assert_eq!(settings.default_volume, 0.5);
        assert_eq!(settings.position_update_interval_ms, 250);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let loud = UserSettings {
            default_volume: 1.5,
            ..UserSettings::default()
        };
        assert!(matches!(
            loud.validate(),
            Err(SettingsError::InvalidValue { .. })
        ));

        let frozen = UserSettings {
            position_update_interval_ms: 0,
            ..UserSettings::default()
        };
        assert!(frozen.validate().is_err());
    }

    #[test]
    fn test_headless_config() {
        let settings = UserSettings {
            position_update_interval_ms: 100,
            media_root: Some("/srv/music".to_string()),
            ..UserSettings::default()
        };
        let config = settings.headless_config();
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.media_root, Some(PathBuf::from("/srv/music")));
    }

    #[test]
    fn test_manager_creates_defaults_and_saves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("soundwave").join("settings.json");

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();
        assert_eq!(*manager.get_settings(), UserSettings::default());
        assert!(!path.exists());

        let updated = UserSettings {
            default_volume: 0.6,
            ..UserSettings::default()
        };
        manager.update_settings(updated.clone()).unwrap();

        let saved: UserSettings = from_str(&read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, updated);

        let reloaded = SettingsManager::with_config_path(path).unwrap();
        assert_eq!(*reloaded.get_settings(), updated);
    }

    #[test]
    fn test_manager_rejects_invalid_update() {
        let dir = tempdir().unwrap();
        let manager = SettingsManager::with_config_path(dir.path().join("settings.json")).unwrap();

        let invalid = UserSettings {
            default_volume: -1.0,
            ..UserSettings::default()
        };
        assert!(manager.update_settings(invalid).is_err());
        assert_eq!(manager.get_settings().default_volume, 0.8);
    }

    #[test]
    fn test_manager_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, "{ not json").unwrap();

        let error = SettingsManager::with_config_path(path).unwrap_err();
        assert!(matches!(error, SettingsError::SerializationError(_)));
    }

    #[test]
    fn test_settings_error_display() {
        let io_error = Error::new(NotFound, "File not found");
        let settings_error = SettingsError::IoError(io_error);
        assert!(settings_error.to_string().contains("IO error"));

        let invalid_value_error = SettingsError::InvalidValue {
            reason: "test reason".to_string(),
        };
        assert_eq!(
            invalid_value_error.to_string(),
            "Invalid settings value: test reason"
        );
    }
}
