//! Integration tests for the cycle state machine.
//!
//! Runs full cycles with short real durations against a history file in a
//! temp directory, cancelling at chosen points through the observer.

use std::cell::RefCell;
use std::time::Duration;

use pomocycle_core::events::{CycleObserver, Event};
use pomocycle_core::notify::Notifier;
use pomocycle_core::storage::HistoryStore;
use pomocycle_core::timer::{
    CancelToken, CycleConfig, CycleMachine, CycleOutcome, CycleReport, IntervalKind,
    LongBreakOutcome, PromptAnswer, ScriptedPrompter,
};
use pomocycle_core::CoreError;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, _play_sound: bool) {
        self.sent
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

impl RecordingNotifier {
    fn titles(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(t, _)| t.clone()).collect()
    }
}

/// Trips the cancel token as soon as the target interval starts.
struct CancelAt {
    kind: IntervalKind,
    ordinal: u8,
    cancel: CancelToken,
    events: Vec<Event>,
}

impl CycleObserver for CancelAt {
    fn on_event(&mut self, event: &Event) {
        if let Event::IntervalStarted { interval, .. } = event {
            if interval.kind == self.kind && interval.ordinal == self.ordinal {
                self.cancel.cancel();
            }
        }
        self.events.push(event.clone());
    }
}

fn fast_config() -> CycleConfig {
    CycleConfig::with_durations(
        Duration::from_millis(100),
        Duration::from_millis(50),
        Duration::from_millis(50),
    )
    .with_tick(Duration::from_millis(20))
}

struct Run {
    report: CycleReport,
    notifier: RecordingNotifier,
    store: HistoryStore,
    _dir: TempDir,
}

fn run_cycle(
    config: CycleConfig,
    answers: Vec<PromptAnswer>,
    cancel_at: Option<(IntervalKind, u8)>,
) -> Run {
    let dir = TempDir::new().unwrap();
    let mut store = HistoryStore::open(dir.path().join("history.json"));
    let mut prompter = ScriptedPrompter::new(answers);
    let notifier = RecordingNotifier::default();
    let cancel = CancelToken::new();

    let report = match cancel_at {
        Some((kind, ordinal)) => {
            let mut observer = CancelAt {
                kind,
                ordinal,
                cancel: cancel.clone(),
                events: Vec::new(),
            };
            CycleMachine::new(config, &mut store, &mut prompter, &notifier, &mut observer, cancel)
                .run()
                .unwrap()
        }
        None => {
            let mut events: Vec<Event> = Vec::new();
            CycleMachine::new(config, &mut store, &mut prompter, &notifier, &mut events, cancel)
                .run()
                .unwrap()
        }
    };

    Run {
        report,
        notifier,
        store,
        _dir: dir,
    }
}

#[test]
fn full_cycle_with_every_break_taken() {
    let run = run_cycle(fast_config(), vec![], None);

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Completed {
            long_break: LongBreakOutcome::Taken
        }
    );
    assert_eq!(
        run.notifier.titles(),
        vec![
            "Work Session Complete!",
            "Break Over!",
            "Work Session Complete!",
            "Break Over!",
            "Work Session Complete!",
            "Break Over!",
            "Work Session Complete!",
            "Pomodoro Complete!",
        ]
    );
    let messages: Vec<String> = run
        .notifier
        .sent
        .borrow()
        .iter()
        .filter(|(t, _)| t == "Work Session Complete!")
        .map(|(_, m)| m.clone())
        .collect();
    assert!(messages[0].contains("1/4"));
    assert!(messages[3].contains("4/4"));

    let history = HistoryStore::load(run.store.path());
    let records: Vec<_> = history.records().collect();
    assert_eq!(records.len(), 1);
    assert!(records[0].completed);
    assert_eq!(records[0].work_sessions, 4);
    assert!(records[0].end_time >= records[0].start_time);
    assert_eq!(run.report.completed_total, 1);
}

#[test]
fn cancel_during_second_work_session_records_one() {
    let run = run_cycle(fast_config(), vec![], Some((IntervalKind::Work, 2)));

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Cancelled { work_sessions: 1 }
    );
    let history = HistoryStore::load(run.store.path());
    let records: Vec<_> = history.records().collect();
    assert_eq!(records.len(), 1);
    assert!(!records[0].completed);
    assert_eq!(records[0].work_sessions, 1);

    let work_done = run
        .notifier
        .sent
        .borrow()
        .iter()
        .filter(|(t, _)| t == "Work Session Complete!")
        .count();
    assert_eq!(work_done, 1);
    assert_eq!(run.report.completed_total, 0);
}

#[test]
fn cancel_during_first_work_session_records_nothing() {
    let run = run_cycle(fast_config(), vec![], Some((IntervalKind::Work, 1)));

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Cancelled { work_sessions: 0 }
    );
    assert!(run.report.record.is_none());
    assert!(!run.store.path().exists());
    assert!(run.notifier.titles().is_empty());
}

#[test]
fn cancel_during_short_break_counts_preceding_session() {
    let run = run_cycle(fast_config(), vec![], Some((IntervalKind::ShortBreak, 3)));

    let history = HistoryStore::load(run.store.path());
    let records: Vec<_> = history.records().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].work_sessions, 3);
    assert!(!records[0].completed);
}

#[test]
fn interrupt_at_short_break_prompt_counts_preceding_session() {
    let run = run_cycle(
        fast_config(),
        vec![PromptAnswer::Interrupted],
        None,
    );

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Cancelled { work_sessions: 1 }
    );
    let history = HistoryStore::load(run.store.path());
    assert_eq!(history.records().next().unwrap().work_sessions, 1);
}

#[test]
fn skipped_long_break_keeps_single_completed_record() {
    let run = run_cycle(
        fast_config(),
        vec![
            PromptAnswer::Take,
            PromptAnswer::Skip,
            PromptAnswer::Take,
            PromptAnswer::Skip,
        ],
        None,
    );

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Completed {
            long_break: LongBreakOutcome::Skipped
        }
    );
    let history = HistoryStore::load(run.store.path());
    assert_eq!(history.len(), 1);
    assert_eq!(history.completed_count(), 1);
    assert_eq!(run.notifier.titles().last().unwrap(), "Work Session Complete!");
}

#[test]
fn cancelled_long_break_keeps_single_completed_record() {
    let run = run_cycle(fast_config(), vec![], Some((IntervalKind::LongBreak, 0)));

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Completed {
            long_break: LongBreakOutcome::Interrupted
        }
    );
    let history = HistoryStore::load(run.store.path());
    assert_eq!(history.len(), 1);
    assert_eq!(history.completed_count(), 1);
    assert!(!run.notifier.titles().contains(&"Pomodoro Complete!".to_string()));
}

#[test]
fn interrupt_at_long_break_prompt_keeps_single_completed_record() {
    let run = run_cycle(
        fast_config(),
        vec![
            PromptAnswer::Skip,
            PromptAnswer::Skip,
            PromptAnswer::Skip,
            PromptAnswer::Interrupted,
        ],
        None,
    );

    assert_eq!(
        run.report.outcome,
        CycleOutcome::Completed {
            long_break: LongBreakOutcome::Interrupted
        }
    );
    assert!(run.report.persisted);
    let history = HistoryStore::load(run.store.path());
    assert_eq!(history.len(), 1);
    assert_eq!(history.completed_count(), 1);
    assert_eq!(run.report.completed_total, 1);
}

#[test]
fn previous_history_counts_toward_total() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");

    for _ in 0..2 {
        let mut store = HistoryStore::open(&path);
        let mut prompter = ScriptedPrompter::new(vec![PromptAnswer::Skip; 4]);
        let mut events: Vec<Event> = Vec::new();
        let report = CycleMachine::new(
            fast_config(),
            &mut store,
            &mut prompter,
            &pomocycle_core::NoopNotifier,
            &mut events,
            CancelToken::new(),
        )
        .run()
        .unwrap();
        assert!(report.persisted);
    }

    assert_eq!(HistoryStore::load(&path).completed_count(), 2);
}

#[test]
fn write_failure_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::create_dir(&path).unwrap();

    let mut store = HistoryStore::open(&path);
    let mut prompter = ScriptedPrompter::new(vec![PromptAnswer::Skip; 4]);
    let mut events: Vec<Event> = Vec::new();
    let result = CycleMachine::new(
        fast_config(),
        &mut store,
        &mut prompter,
        &pomocycle_core::NoopNotifier,
        &mut events,
        CancelToken::new(),
    )
    .run();

    assert!(matches!(result, Err(CoreError::Store(_))));
    assert!(!events.iter().any(|e| e.name() == "cycle_finished"));
}
