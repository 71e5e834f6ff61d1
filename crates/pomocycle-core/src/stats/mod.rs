//! Read-only aggregation over cycle history.

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{Result, ValidationError};
use crate::storage::{CycleRecord, History};

/// How many records the recent view lists.
pub const RECENT_LIMIT: usize = 10;

/// Date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "window", content = "days", rename_all = "snake_case")]
pub enum StatsWindow {
    AllTime,
    LastDays(u32),
}

impl StatsWindow {
    pub fn week() -> Self {
        StatsWindow::LastDays(7)
    }

    pub fn month() -> Self {
        StatsWindow::LastDays(30)
    }

    /// A window of `days`, which must be positive.
    ///
    /// # Errors
    /// Returns `InvalidValue` for a zero-day window.
    pub fn last_days(days: u32) -> std::result::Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::InvalidValue {
                field: "days".into(),
                message: "window must cover at least one day".into(),
            });
        }
        Ok(StatsWindow::LastDays(days))
    }

    /// Earliest `start_time` kept, if the window is bounded.
    pub fn cutoff(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match self {
            StatsWindow::AllTime => None,
            StatsWindow::LastDays(days) => Some(now - Duration::days(i64::from(*days))),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StatsWindow::AllTime => "all time".into(),
            StatsWindow::LastDays(days) => format!("last {days} days"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub window: StatsWindow,
    pub completed: usize,
    pub incomplete: usize,
    pub total_work_sessions: u32,
    pub total_work_minutes: f64,
    pub total_work_hours: f64,
    /// Work sessions per active day, over completed cycles only.
    /// `None` when the window holds no completed cycle.
    pub avg_sessions_per_day: Option<f64>,
    /// Most recent first.
    pub recent: Vec<CycleRecord>,
}

/// Aggregate the records of `history` that fall inside `window`.
///
/// Returns `Ok(None)` when nothing falls inside the window.
///
/// # Errors
/// Returns `MalformedRecord` if any history entry is not a valid record.
pub fn compute_stats(
    history: &History,
    window: StatsWindow,
    now: DateTime<Local>,
) -> Result<Option<StatsReport>> {
    if let Some((index, reason)) = history.malformed().next() {
        return Err(ValidationError::MalformedRecord {
            index,
            message: reason.to_string(),
        }
        .into());
    }

    let cutoff = window.cutoff(now);
    let filtered: Vec<&CycleRecord> = history
        .records()
        .filter(|r| cutoff.map_or(true, |c| r.start_time >= c))
        .collect();

    if filtered.is_empty() {
        return Ok(None);
    }

    let completed: Vec<&CycleRecord> = filtered.iter().copied().filter(|r| r.completed).collect();
    let total_work_sessions: u32 = filtered.iter().map(|r| u32::from(r.work_sessions)).sum();
    let total_work_minutes: f64 = filtered.iter().map(|r| r.total_work_minutes).sum();

    let avg_sessions_per_day = if completed.is_empty() {
        None
    } else {
        let days: BTreeSet<NaiveDate> = completed.iter().map(|r| r.start_time.date_naive()).collect();
        let sessions: u32 = completed.iter().map(|r| u32::from(r.work_sessions)).sum();
        Some(f64::from(sessions) / days.len() as f64)
    };

    let recent = filtered
        .iter()
        .rev()
        .take(RECENT_LIMIT)
        .map(|r| (*r).clone())
        .collect();

    Ok(Some(StatsReport {
        window,
        completed: completed.len(),
        incomplete: filtered.len() - completed.len(),
        total_work_sessions,
        total_work_minutes,
        total_work_hours: total_work_minutes / 60.0,
        avg_sessions_per_day,
        recent,
    }))
}
