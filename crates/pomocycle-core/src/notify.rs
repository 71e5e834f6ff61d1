//! Notification capability.
//!
//! The cycle machine only calls [`Notifier::notify`]; delivery is up to the
//! implementation. Calls are fire-and-forget: implementations swallow their
//! own failures so a missing backend never changes a transition.

use crate::timer::{Interval, IntervalKind};

pub trait Notifier {
    fn notify(&self, title: &str, message: &str, play_sound: bool);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str, _play_sound: bool) {}
}

/// Title and body announced when an interval finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: &'static str,
    pub message: String,
}

impl Announcement {
    pub fn interval_finished(interval: &Interval, sessions_per_cycle: u8) -> Self {
        match interval.kind {
            IntervalKind::Work => Self {
                title: "Work Session Complete!",
                message: format!(
                    "Great work on session {}/{}! Time for a break.",
                    interval.ordinal, sessions_per_cycle
                ),
            },
            IntervalKind::ShortBreak => Self {
                title: "Break Over!",
                message: "Time to get back to work!".into(),
            },
            IntervalKind::LongBreak => Self {
                title: "Pomodoro Complete!",
                message: "You finished a full Pomodoro cycle! Great job!".into(),
            },
        }
    }
}
