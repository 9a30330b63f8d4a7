//! User preferences and settings management.
//!
//! This module provides user preference management with XDG Base Directory
//! compliance.

pub mod settings;

pub use settings::{SettingsError, SettingsManager, UserSettings, get_config_path};
