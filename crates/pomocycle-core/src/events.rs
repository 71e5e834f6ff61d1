use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::CycleRecord;
use crate::timer::{BreakPrompt, CycleOutcome, Interval, IntervalKind, Profile};

/// Every transition of the cycle machine produces an Event.
/// The CLI renders from them; tests assert on their order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CycleStarted {
        profile: Profile,
        work_ms: u64,
        short_break_ms: u64,
        long_break_ms: u64,
        at: DateTime<Utc>,
    },
    IntervalStarted {
        interval: Interval,
        at: DateTime<Utc>,
    },
    /// Progress within the running interval. Not timestamped; emitted often.
    Tick {
        kind: IntervalKind,
        remaining_ms: u64,
        total_ms: u64,
        fraction: f64,
    },
    IntervalCompleted {
        interval: Interval,
        at: DateTime<Utc>,
    },
    IntervalCancelled {
        interval: Interval,
        at: DateTime<Utc>,
    },
    BreakPrompted {
        prompt: BreakPrompt,
        at: DateTime<Utc>,
    },
    BreakSkipped {
        prompt: BreakPrompt,
        at: DateTime<Utc>,
    },
    /// A record was appended to history.
    RecordSaved {
        record: CycleRecord,
        at: DateTime<Utc>,
    },
    /// A record was produced but the profile does not persist it.
    RecordDiscarded {
        record: CycleRecord,
        at: DateTime<Utc>,
    },
    CycleFinished {
        outcome: CycleOutcome,
        completed_total: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Event::CycleStarted { .. } => "cycle_started",
            Event::IntervalStarted { .. } => "interval_started",
            Event::Tick { .. } => "tick",
            Event::IntervalCompleted { .. } => "interval_completed",
            Event::IntervalCancelled { .. } => "interval_cancelled",
            Event::BreakPrompted { .. } => "break_prompted",
            Event::BreakSkipped { .. } => "break_skipped",
            Event::RecordSaved { .. } => "record_saved",
            Event::RecordDiscarded { .. } => "record_discarded",
            Event::CycleFinished { .. } => "cycle_finished",
        }
    }
}

/// Receiver for cycle events.
pub trait CycleObserver {
    fn on_event(&mut self, event: &Event);
}

/// Collects every event, in order.
impl CycleObserver for Vec<Event> {
    fn on_event(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Discards every event.
impl CycleObserver for () {
    fn on_event(&mut self, _event: &Event) {}
}
