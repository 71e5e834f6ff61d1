use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ValidationError;

/// Work sessions in one full cycle.
pub const SESSIONS_PER_CYCLE: u8 = 4;
/// Standard work session length in minutes.
pub const WORK_MINUTES: u64 = 25;
/// Standard short break length in minutes.
pub const SHORT_BREAK_MINUTES: u64 = 5;
/// Long break used when neither the CLI nor the config file sets one.
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 20;
/// Accepted long break lengths outside the test profile.
pub const LONG_BREAK_RANGE: RangeInclusive<u32> = 15..=30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn label(&self) -> &'static str {
        match self {
            IntervalKind::Work => "WORK SESSION",
            IntervalKind::ShortBreak => "SHORT BREAK",
            IntervalKind::LongBreak => "LONG BREAK",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, IntervalKind::Work)
    }
}

/// One timed segment of a cycle. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub kind: IntervalKind,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Work session number (1..=4). For a short break, the session it follows.
    /// Zero for the long break.
    pub ordinal: u8,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Duration in (possibly fractional) minutes.
    pub fn duration_min(&self) -> f64 {
        self.duration_ms as f64 / 60_000.0
    }
}

/// Duration preset chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Real durations; finished cycles are written to history.
    Standard,
    /// Sub-second durations for exercising the state machine; nothing is persisted.
    Test,
}

/// Immutable timing configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleConfig {
    work: Duration,
    short_break: Duration,
    long_break: Duration,
    tick: Duration,
    profile: Profile,
}

impl CycleConfig {
    /// Standard durations with a validated long break.
    ///
    /// # Errors
    /// Returns `LongBreakOutOfRange` unless `long_break_min` is within 15..=30.
    pub fn standard(long_break_min: u32) -> Result<Self, ValidationError> {
        if !LONG_BREAK_RANGE.contains(&long_break_min) {
            return Err(ValidationError::LongBreakOutOfRange {
                minutes: long_break_min,
                min: *LONG_BREAK_RANGE.start(),
                max: *LONG_BREAK_RANGE.end(),
            });
        }
        Ok(Self {
            work: minutes(WORK_MINUTES),
            short_break: minutes(SHORT_BREAK_MINUTES),
            long_break: minutes(long_break_min as u64),
            tick: Duration::from_secs(1),
            profile: Profile::Standard,
        })
    }

    /// Sub-second durations. The long break setting is ignored in this profile.
    pub fn test_profile() -> Self {
        Self {
            work: Duration::from_millis(500),
            short_break: Duration::from_millis(300),
            long_break: Duration::from_millis(500),
            tick: Duration::from_millis(100),
            profile: Profile::Test,
        }
    }

    /// Standard profile with explicit durations and no range check.
    pub fn with_durations(work: Duration, short_break: Duration, long_break: Duration) -> Self {
        Self {
            work,
            short_break,
            long_break,
            tick: Duration::from_secs(1),
            profile: Profile::Standard,
        }
    }

    /// Replace the progress tick cadence.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn work(&self) -> Duration {
        self.work
    }

    pub fn short_break(&self) -> Duration {
        self.short_break
    }

    pub fn long_break(&self) -> Duration {
        self.long_break
    }

    pub fn sessions_per_cycle(&self) -> u8 {
        SESSIONS_PER_CYCLE
    }

    /// Whether records produced by this run reach the history store.
    pub fn persists_records(&self) -> bool {
        self.profile == Profile::Standard
    }

    /// Work session length in minutes, as stored in `total_work_minutes`.
    pub fn work_minutes(&self) -> f64 {
        self.work.as_secs_f64() / 60.0
    }

    pub fn work_interval(&self, ordinal: u8) -> Interval {
        interval(IntervalKind::Work, self.work, ordinal)
    }

    pub fn short_break_interval(&self, after_session: u8) -> Interval {
        interval(IntervalKind::ShortBreak, self.short_break, after_session)
    }

    pub fn long_break_interval(&self) -> Interval {
        interval(IntervalKind::LongBreak, self.long_break, 0)
    }
}

fn minutes(min: u64) -> Duration {
    Duration::from_secs(min.saturating_mul(60))
}

fn interval(kind: IntervalKind, duration: Duration, ordinal: u8) -> Interval {
    Interval {
        kind,
        duration_ms: duration.as_millis() as u64,
        ordinal,
    }
}
