//! The Pomodoro cycle state machine.
//!
//! ```text
//! Work(1) -> DecideShortBreak(1) -> [ShortBreak(1)] -> Work(2) -> ...
//!         -> Work(4) -> DecideLongBreak -> [LongBreak] -> Done
//! any Work/ShortBreak/short-break prompt --cancel--> Cancelled
//! ```
//!
//! The completed record is written once, right after the fourth work session
//! finishes and before the long break is offered. A cancelled cycle records
//! only the work sessions that fully finished.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::countdown::{CancelToken, Countdown, CountdownOutcome};
use super::interval::{CycleConfig, Interval};
use super::prompt::{BreakPrompt, PromptAnswer, Prompter};
use crate::error::Result;
use crate::events::{CycleObserver, Event};
use crate::notify::{Announcement, Notifier};
use crate::storage::{CycleRecord, HistoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Work(u8),
    DecideShortBreak(u8),
    ShortBreak(u8),
    DecideLongBreak,
    LongBreak,
    Done,
    Cancelled,
}

impl CycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleState::Done | CycleState::Cancelled)
    }
}

/// What happened after the last work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongBreakOutcome {
    Taken,
    Skipped,
    /// Cancelled while prompting or during the break.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// All work sessions finished.
    Completed { long_break: LongBreakOutcome },
    /// Stopped early with `work_sessions` fully finished.
    Cancelled { work_sessions: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// The record produced by this run, if any.
    pub record: Option<CycleRecord>,
    /// Whether `record` reached the history store.
    pub persisted: bool,
    /// Completed cycles in history after this run.
    pub completed_total: usize,
}

/// Drives one cycle from the first work session to a terminal state.
pub struct CycleMachine<'a> {
    config: CycleConfig,
    countdown: Countdown,
    store: &'a mut HistoryStore,
    prompter: &'a mut dyn Prompter,
    notifier: &'a dyn Notifier,
    observer: &'a mut dyn CycleObserver,
    cancel: CancelToken,
    state: CycleState,
    finished_sessions: u8,
    started_at: DateTime<Local>,
    record: Option<CycleRecord>,
    persisted: bool,
    long_break: LongBreakOutcome,
}

impl<'a> CycleMachine<'a> {
    pub fn new(
        config: CycleConfig,
        store: &'a mut HistoryStore,
        prompter: &'a mut dyn Prompter,
        notifier: &'a dyn Notifier,
        observer: &'a mut dyn CycleObserver,
        cancel: CancelToken,
    ) -> Self {
        Self {
            countdown: Countdown::new(config.tick()),
            config,
            store,
            prompter,
            notifier,
            observer,
            cancel,
            state: CycleState::Work(1),
            finished_sessions: 0,
            started_at: Local::now(),
            record: None,
            persisted: false,
            long_break: LongBreakOutcome::Skipped,
        }
    }

    /// Run to a terminal state.
    ///
    /// # Errors
    /// Returns the store error if a record cannot be written. The cycle stops
    /// at that point.
    pub fn run(mut self) -> Result<CycleReport> {
        self.started_at = Local::now();
        self.emit(Event::CycleStarted {
            profile: self.config.profile(),
            work_ms: millis(self.config.work()),
            short_break_ms: millis(self.config.short_break()),
            long_break_ms: millis(self.config.long_break()),
            at: Utc::now(),
        });
        info!(profile = ?self.config.profile(), "cycle started");

        while !self.state.is_terminal() {
            self.state = self.step()?;
        }

        let outcome = match self.state {
            CycleState::Done => CycleOutcome::Completed {
                long_break: self.long_break,
            },
            _ => CycleOutcome::Cancelled {
                work_sessions: self.finished_sessions,
            },
        };
        let completed_total = self.store.completed_count();
        info!(?outcome, completed_total, "cycle finished");
        self.emit(Event::CycleFinished {
            outcome,
            completed_total,
            at: Utc::now(),
        });

        Ok(CycleReport {
            outcome,
            record: self.record,
            persisted: self.persisted,
            completed_total,
        })
    }

    fn step(&mut self) -> Result<CycleState> {
        let next = match self.state {
            CycleState::Work(i) => {
                let interval = self.config.work_interval(i);
                match self.run_interval(interval) {
                    CountdownOutcome::Completed => {
                        self.finished_sessions = i;
                        self.announce(&interval);
                        if i < self.config.sessions_per_cycle() {
                            CycleState::DecideShortBreak(i)
                        } else {
                            let record = CycleRecord::completed(
                                self.started_at,
                                Local::now(),
                                self.config.work_minutes(),
                            );
                            self.save(record)?;
                            CycleState::DecideLongBreak
                        }
                    }
                    CountdownOutcome::Cancelled => {
                        self.save_incomplete()?;
                        CycleState::Cancelled
                    }
                }
            }
            CycleState::DecideShortBreak(i) => {
                match self.ask(BreakPrompt::ShortBreak { after_session: i }) {
                    PromptAnswer::Take => CycleState::ShortBreak(i),
                    PromptAnswer::Skip => CycleState::Work(i + 1),
                    PromptAnswer::Interrupted => {
                        self.save_incomplete()?;
                        CycleState::Cancelled
                    }
                }
            }
            CycleState::ShortBreak(i) => {
                let interval = self.config.short_break_interval(i);
                match self.run_interval(interval) {
                    CountdownOutcome::Completed => {
                        self.announce(&interval);
                        CycleState::Work(i + 1)
                    }
                    CountdownOutcome::Cancelled => {
                        self.save_incomplete()?;
                        CycleState::Cancelled
                    }
                }
            }
            CycleState::DecideLongBreak => match self.ask(BreakPrompt::LongBreak) {
                PromptAnswer::Take => CycleState::LongBreak,
                PromptAnswer::Skip => {
                    self.long_break = LongBreakOutcome::Skipped;
                    CycleState::Done
                }
                PromptAnswer::Interrupted => {
                    self.long_break = LongBreakOutcome::Interrupted;
                    CycleState::Done
                }
            },
            CycleState::LongBreak => {
                let interval = self.config.long_break_interval();
                self.long_break = match self.run_interval(interval) {
                    CountdownOutcome::Completed => {
                        self.announce(&interval);
                        LongBreakOutcome::Taken
                    }
                    // The completed record is already written.
                    CountdownOutcome::Cancelled => LongBreakOutcome::Interrupted,
                };
                CycleState::Done
            }
            terminal @ (CycleState::Done | CycleState::Cancelled) => terminal,
        };
        Ok(next)
    }

    fn run_interval(&mut self, interval: Interval) -> CountdownOutcome {
        self.emit(Event::IntervalStarted {
            interval,
            at: Utc::now(),
        });
        info!(kind = ?interval.kind, ordinal = interval.ordinal, "interval started");

        let observer = &mut *self.observer;
        let outcome = self
            .countdown
            .run(interval.duration(), &self.cancel, |tick| {
                debug!(remaining_ms = millis(tick.remaining), "tick");
                observer.on_event(&Event::Tick {
                    kind: interval.kind,
                    remaining_ms: millis(tick.remaining),
                    total_ms: millis(tick.total),
                    fraction: tick.fraction,
                });
            });

        match outcome {
            CountdownOutcome::Completed => {
                info!(kind = ?interval.kind, ordinal = interval.ordinal, "interval completed");
                self.emit(Event::IntervalCompleted {
                    interval,
                    at: Utc::now(),
                });
            }
            CountdownOutcome::Cancelled => {
                info!(kind = ?interval.kind, ordinal = interval.ordinal, "interval cancelled");
                self.emit(Event::IntervalCancelled {
                    interval,
                    at: Utc::now(),
                });
            }
        }
        outcome
    }

    fn ask(&mut self, prompt: BreakPrompt) -> PromptAnswer {
        self.emit(Event::BreakPrompted {
            prompt,
            at: Utc::now(),
        });
        let answer = self.prompter.ask(prompt, &self.cancel);
        debug!(?prompt, ?answer, "break prompt answered");
        if answer == PromptAnswer::Skip {
            self.emit(Event::BreakSkipped {
                prompt,
                at: Utc::now(),
            });
        }
        answer
    }

    fn announce(&self, interval: &Interval) {
        let a = Announcement::interval_finished(interval, self.config.sessions_per_cycle());
        self.notifier.notify(a.title, &a.message, true);
    }

    fn save_incomplete(&mut self) -> Result<()> {
        match CycleRecord::incomplete(
            self.started_at,
            Local::now(),
            self.finished_sessions,
            self.config.work_minutes(),
        ) {
            Some(record) => self.save(record),
            None => {
                debug!("no work session finished, nothing to record");
                Ok(())
            }
        }
    }

    fn save(&mut self, record: CycleRecord) -> Result<()> {
        if self.config.persists_records() {
            self.store.append(record.clone())?;
            self.persisted = true;
            self.emit(Event::RecordSaved {
                record: record.clone(),
                at: Utc::now(),
            });
        } else {
            debug!("test profile, record not persisted");
            self.emit(Event::RecordDiscarded {
                record: record.clone(),
                at: Utc::now(),
            });
        }
        self.record = Some(record);
        Ok(())
    }

    fn emit(&mut self, event: Event) {
        self.observer.on_event(&event);
    }
}

fn millis(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
