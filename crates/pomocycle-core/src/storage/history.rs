//! JSON-backed cycle history.
//!
//! The whole history lives in one document:
//!
//! ```text
//! { "pomodoros": [ { start_time, end_time, completed, work_sessions, total_work_minutes }, ... ] }
//! ```
//!
//! Loading never fails: missing files start empty, and unreadable or
//! structurally wrong files are replaced by an empty history with a warning.
//! Appending rewrites the whole document through a temp file + rename.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::{history_path, timestamp};
use crate::error::{Result, StoreError};
use crate::timer::SESSIONS_PER_CYCLE;

/// Top-level key holding the record list.
pub const RECORDS_KEY: &str = "pomodoros";

/// One attempted cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Local>,
    #[serde(with = "timestamp")]
    pub end_time: DateTime<Local>,
    pub completed: bool,
    pub work_sessions: u8,
    pub total_work_minutes: f64,
}

impl CycleRecord {
    /// All work sessions finished.
    pub fn completed(start: DateTime<Local>, end: DateTime<Local>, work_minutes: f64) -> Self {
        Self {
            start_time: start,
            end_time: end,
            completed: true,
            work_sessions: SESSIONS_PER_CYCLE,
            total_work_minutes: work_minutes * SESSIONS_PER_CYCLE as f64,
        }
    }

    /// Cancelled cycle. `None` when nothing worth recording finished, i.e.
    /// zero sessions (or a full set, which is a completed cycle instead).
    pub fn incomplete(
        start: DateTime<Local>,
        end: DateTime<Local>,
        work_sessions: u8,
        work_minutes: f64,
    ) -> Option<Self> {
        if work_sessions == 0 || work_sessions >= SESSIONS_PER_CYCLE {
            return None;
        }
        Some(Self {
            start_time: start,
            end_time: end,
            completed: false,
            work_sessions,
            total_work_minutes: work_minutes * work_sessions as f64,
        })
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.work_sessions > SESSIONS_PER_CYCLE {
            return Err(format!(
                "work_sessions {} exceeds {}",
                self.work_sessions, SESSIONS_PER_CYCLE
            ));
        }
        if !self.total_work_minutes.is_finite() || self.total_work_minutes < 0.0 {
            return Err(format!(
                "invalid total_work_minutes {}",
                self.total_work_minutes
            ));
        }
        Ok(())
    }
}

/// One element of the persisted list.
///
/// Elements that do not form a valid record are kept verbatim so that
/// rewriting the history never drops data.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Record(CycleRecord),
    Malformed { raw: Value, reason: String },
}

impl HistoryEntry {
    fn from_value(raw: Value) -> Self {
        match serde_json::from_value::<CycleRecord>(raw.clone()) {
            Ok(record) => match record.validate() {
                Ok(()) => HistoryEntry::Record(record),
                Err(reason) => HistoryEntry::Malformed { raw, reason },
            },
            Err(e) => HistoryEntry::Malformed {
                raw,
                reason: e.to_string(),
            },
        }
    }

    pub fn record(&self) -> Option<&CycleRecord> {
        match self {
            HistoryEntry::Record(r) => Some(r),
            HistoryEntry::Malformed { .. } => None,
        }
    }
}

impl Serialize for HistoryEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            HistoryEntry::Record(r) => r.serialize(serializer),
            HistoryEntry::Malformed { raw, .. } => raw.serialize(serializer),
        }
    }
}

/// Why a history file was replaced by an empty history on load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadIssue {
    #[error("history file could not be read: {0}")]
    Unreadable(String),
    #[error("history file is corrupted: {0}")]
    Unparsable(String),
    #[error("history file is not a JSON object")]
    NotAMapping,
    #[error("\"pomodoros\" is not a list")]
    RecordsNotAList,
}

#[derive(Serialize)]
struct Document<'a> {
    pomodoros: &'a [HistoryEntry],
    #[serde(flatten)]
    other: &'a Map<String, Value>,
}

/// Ordered, append-only list of cycle attempts.
///
/// Top-level keys other than `pomodoros` are carried along untouched and
/// written back on every save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
    other: Map<String, Value>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I: IntoIterator<Item = CycleRecord>>(records: I) -> Self {
        Self {
            entries: records.into_iter().map(HistoryEntry::Record).collect(),
            other: Map::new(),
        }
    }

    /// Parse a history document. A document without `pomodoros` is an
    /// empty history that keeps its other keys.
    pub fn parse(content: &str) -> std::result::Result<Self, LoadIssue> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| LoadIssue::Unparsable(e.to_string()))?;
        let Value::Object(mut map) = value else {
            return Err(LoadIssue::NotAMapping);
        };
        let items = match map.remove(RECORDS_KEY) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(LoadIssue::RecordsNotAList),
            None => Vec::new(),
        };
        Ok(Self {
            entries: items.into_iter().map(HistoryEntry::from_value).collect(),
            other: map,
        })
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Document {
            pomodoros: &self.entries,
            other: &self.other,
        })
    }

    /// Valid records in chronological order.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &CycleRecord> + '_ {
        self.entries.iter().filter_map(HistoryEntry::record)
    }

    /// `(index, reason)` of every malformed entry.
    pub fn malformed(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| match e {
            HistoryEntry::Malformed { reason, .. } => Some((i, reason.as_str())),
            HistoryEntry::Record(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.records().filter(|r| r.completed).count()
    }

    fn push(&mut self, record: CycleRecord) {
        self.entries.push(HistoryEntry::Record(record));
    }
}

/// File-backed owner of the history.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: History,
    recovery: Option<LoadIssue>,
}

impl HistoryStore {
    /// Open the store at `path`, loading whatever is there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (history, recovery) = Self::read(&path);
        Self {
            path,
            history,
            recovery,
        }
    }

    /// Open `history.json` in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(history_path()?))
    }

    /// Load the history at `path`. Never fails; see the module docs.
    pub fn load(path: &Path) -> History {
        Self::read(path).0
    }

    fn read(path: &Path) -> (History, Option<LoadIssue>) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return (History::new(), None),
            Err(e) => {
                let issue = LoadIssue::Unreadable(e.to_string());
                warn!(path = %path.display(), "{issue}, starting with an empty history");
                return (History::new(), Some(issue));
            }
        };

        match History::parse(&content) {
            Ok(history) => {
                let malformed = history.malformed().count();
                if malformed > 0 {
                    warn!(
                        path = %path.display(),
                        malformed,
                        "history contains entries that are not valid cycle records"
                    );
                }
                (history, None)
            }
            Err(issue) => {
                warn!(path = %path.display(), "{issue}, starting with an empty history");
                (History::new(), Some(issue))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Set when the file on disk was discarded during load.
    pub fn recovery(&self) -> Option<&LoadIssue> {
        self.recovery.as_ref()
    }

    pub fn completed_count(&self) -> usize {
        self.history.completed_count()
    }

    /// Append `record` and rewrite the whole file.
    ///
    /// On error nothing changes, neither in memory nor on disk.
    ///
    /// # Errors
    /// Returns `StoreError::Write` if the file cannot be written or replaced.
    pub fn append(&mut self, record: CycleRecord) -> std::result::Result<(), StoreError> {
        let mut next = self.history.clone();
        next.push(record);
        self.write(&next)?;
        self.history = next;
        info!(
            path = %self.path.display(),
            entries = self.history.len(),
            "history saved"
        );
        Ok(())
    }

    fn write(&self, history: &History) -> std::result::Result<(), StoreError> {
        let content = history.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = tmp_path(&self.path);
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        });
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write { path: tmp, source });
        }

        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "history.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
