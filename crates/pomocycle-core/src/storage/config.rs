//! TOML-based user configuration.
//!
//! Read from `config.toml` in the data directory and never written by the
//! program. Every field has a default, so a partial, empty or missing file is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{resolve_data_dir, CONFIG_FILE};
use crate::error::{ConfigError, Result};
use crate::timer::DEFAULT_LONG_BREAK_MINUTES;

/// Notification preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ask the backend for its default sound.
    #[serde(default = "default_true")]
    pub sound: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Used when `--break` is not given.
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_true() -> bool {
    true
}
fn default_long_break() -> u32 {
    DEFAULT_LONG_BREAK_MINUTES
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_break_minutes: default_long_break(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the data directory without creating anything.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&resolve_data_dir().join(CONFIG_FILE))?)
    }

    /// Load from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> std::result::Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }
}
