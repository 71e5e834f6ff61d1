//! Integration tests for the JSON history store.
//!
//! Covers load-time recovery from bad files and the append-then-load
//! property over arbitrary record sequences.

use chrono::{Duration, Local, TimeZone};
use pomocycle_core::storage::{CycleRecord, HistoryStore, LoadIssue};
use proptest::prelude::*;
use tempfile::TempDir;

fn load_from(content: &str) -> (HistoryStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, content).unwrap();
    (HistoryStore::open(&path), dir)
}

#[test]
fn records_not_a_list_resets_to_empty() {
    let (store, _dir) = load_from(r#"{"pomodoros": "not-a-list"}"#);
    assert!(store.history().is_empty());
    assert_eq!(store.recovery(), Some(&LoadIssue::RecordsNotAList));
}

#[test]
fn invalid_json_resets_to_empty() {
    let (store, _dir) = load_from("{\"pomodoros\": [");
    assert!(store.history().is_empty());
    assert!(matches!(store.recovery(), Some(LoadIssue::Unparsable(_))));
}

#[test]
fn top_level_list_resets_to_empty() {
    let (store, _dir) = load_from("[1, 2, 3]");
    assert!(store.history().is_empty());
    assert_eq!(store.recovery(), Some(&LoadIssue::NotAMapping));
}

#[test]
fn recovered_file_is_overwritten_on_next_append() {
    let (mut store, _dir) = load_from("garbage");
    let now = Local::now();
    store
        .append(CycleRecord::completed(now, now, 25.0))
        .unwrap();

    let reloaded = HistoryStore::open(store.path());
    assert!(reloaded.recovery().is_none());
    assert_eq!(reloaded.history().len(), 1);
}

#[test]
fn other_top_level_keys_survive_an_append() {
    let (mut store, _dir) = load_from(r#"{"pomodoros": [], "settings": {"theme": "dark"}}"#);
    let now = Local::now();
    store
        .append(CycleRecord::completed(now, now, 25.0))
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["settings"]["theme"], "dark");
    assert_eq!(raw["pomodoros"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_records_key_is_an_empty_history() {
    let (mut store, _dir) = load_from(r#"{"settings": {"theme": "dark"}}"#);
    assert!(store.history().is_empty());
    assert!(store.recovery().is_none());

    let now = Local::now();
    store
        .append(CycleRecord::completed(now, now, 25.0))
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["settings"]["theme"], "dark");
    assert_eq!(raw["pomodoros"][0]["completed"], true);
}

#[test]
fn written_file_uses_pomodoros_key_and_rfc3339() {
    let dir = TempDir::new().unwrap();
    let mut store = HistoryStore::open(dir.path().join("history.json"));
    let start = Local.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    store
        .append(CycleRecord::incomplete(start, start + Duration::minutes(40), 1, 25.0).unwrap())
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    let entry = &raw["pomodoros"][0];
    assert_eq!(entry["completed"], false);
    assert_eq!(entry["work_sessions"], 1);
    assert_eq!(entry["total_work_minutes"], 25.0);
    let start_raw = entry["start_time"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(start_raw).is_ok());
}

fn record_strategy() -> impl Strategy<Value = CycleRecord> {
    (0i64..10_000, 0u8..=4).prop_map(|(minutes_ago, sessions)| {
        let start = Local::now() - Duration::minutes(minutes_ago);
        let end = start + Duration::minutes(30);
        match CycleRecord::incomplete(start, end, sessions, 25.0) {
            Some(r) => r,
            None => CycleRecord::completed(start, end, 25.0),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// After N appends, a fresh load returns exactly those N records in order.
    #[test]
    fn appends_are_cumulative(records in prop::collection::vec(record_strategy(), 0..8)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        for record in &records {
            let mut store = HistoryStore::open(&path);
            store.append(record.clone()).unwrap();
        }

        let history = HistoryStore::load(&path);
        let loaded: Vec<&CycleRecord> = history.records().collect();
        prop_assert_eq!(loaded.len(), records.len());
        for (got, want) in loaded.iter().zip(&records) {
            prop_assert_eq!(got.start_time.timestamp(), want.start_time.timestamp());
            prop_assert_eq!(got.work_sessions, want.work_sessions);
            prop_assert_eq!(got.completed, want.completed);
            prop_assert_eq!(got.total_work_minutes, want.total_work_minutes);
        }
    }
}
