//! # Pomocycle Core Library
//!
//! Business logic for the `pomocycle` terminal Pomodoro timer. The CLI binary
//! is a thin layer over this crate: it supplies a stdin prompter, a desktop
//! notifier and a terminal renderer, and everything else lives here.
//!
//! ## Architecture
//!
//! - **Timer**: a polling [`Countdown`] that honours a shared [`CancelToken`],
//!   and the [`CycleMachine`] that strings work sessions and breaks together
//! - **Storage**: JSON cycle history ([`HistoryStore`]) and TOML user
//!   configuration ([`Config`])
//! - **Stats**: read-only aggregation over the history ([`compute_stats`])
//! - **Events**: every transition is reported to a [`CycleObserver`]

pub mod error;
pub mod events;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{CycleObserver, Event};
pub use notify::{NoopNotifier, Notifier};
pub use stats::{compute_stats, StatsReport, StatsWindow};
pub use storage::{Config, CycleRecord, History, HistoryStore};
pub use timer::{
    CancelToken, Countdown, CycleConfig, CycleMachine, CycleOutcome, CycleReport, PromptAnswer,
    Prompter,
};
