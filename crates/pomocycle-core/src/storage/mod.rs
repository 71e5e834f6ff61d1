mod config;
pub mod history;
pub mod timestamp;

pub use config::{Config, NotificationsConfig};
pub use history::{CycleRecord, History, HistoryEntry, HistoryStore, LoadIssue};

use std::path::PathBuf;

use crate::error::StoreError;

/// Overrides the data directory when set.
pub const HOME_ENV: &str = "POMOCYCLE_HOME";
pub const HISTORY_FILE: &str = "history.json";
pub const CONFIG_FILE: &str = "config.toml";

/// Returns `$POMOCYCLE_HOME` if set, else `~/.config/pomocycle/`, without
/// creating it.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pomocycle"),
    }
}

/// [`resolve_data_dir`], created if missing.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = resolve_data_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Location of the history file inside [`data_dir`].
pub fn history_path() -> Result<PathBuf, StoreError> {
    Ok(data_dir()?.join(HISTORY_FILE))
}
