pub mod run;
pub mod stats;

use pomocycle_core::storage::HistoryStore;
use std::path::PathBuf;

/// Open the history at `data_file`, or the default one in the data directory.
pub fn open_store(data_file: Option<PathBuf>) -> Result<HistoryStore, Box<dyn std::error::Error>> {
    Ok(match data_file {
        Some(path) => HistoryStore::open(path),
        None => HistoryStore::open_default()?,
    })
}
