//! Cancellable countdown.
//!
//! The countdown is wall-clock based: elapsed time is re-measured on every
//! poll, so a late wake-up never stretches an interval. Between polls the
//! thread sleeps for at most [`CANCEL_POLL`], which bounds how long a
//! cancellation can go unnoticed.
//!
//! ```ignore
//! let cancel = CancelToken::new();
//! let outcome = Countdown::new(Duration::from_secs(1))
//!     .run(Duration::from_secs(25 * 60), &cancel, |tick| draw(tick));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest sleep between two cancellation checks.
pub const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Shared interrupt flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress snapshot handed to the tick callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub total: Duration,
    pub elapsed: Duration,
    pub remaining: Duration,
    /// 0.0 ..= 1.0
    pub fraction: f64,
}

impl Tick {
    pub fn at(total: Duration, elapsed: Duration) -> Self {
        let elapsed = elapsed.min(total);
        let fraction = if total.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        };
        Self {
            total,
            elapsed,
            remaining: total - elapsed,
            fraction,
        }
    }

    /// The closing 100% snapshot.
    pub fn is_final(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Completed,
    Cancelled,
}

/// Polling countdown with a fixed progress cadence.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    tick: Duration,
}

impl Countdown {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    /// Block until `duration` has elapsed or `cancel` is tripped.
    ///
    /// `on_tick` is called once immediately, then every tick interval, and a
    /// last time with a 100% snapshot when the countdown completes. A cancelled
    /// countdown gets no final snapshot.
    pub fn run<F>(&self, duration: Duration, cancel: &CancelToken, mut on_tick: F) -> CountdownOutcome
    where
        F: FnMut(Tick),
    {
        let start = Instant::now();
        let mut next_tick = start;

        loop {
            if cancel.is_cancelled() {
                return CountdownOutcome::Cancelled;
            }

            let elapsed = start.elapsed();
            if elapsed >= duration {
                on_tick(Tick::at(duration, duration));
                return CountdownOutcome::Completed;
            }

            let now = Instant::now();
            if now >= next_tick {
                on_tick(Tick::at(duration, elapsed));
                next_tick += self.tick;
                if next_tick < now {
                    next_tick = now + self.tick;
                }
            }

            let until_done = duration - elapsed;
            let until_tick = next_tick.saturating_duration_since(Instant::now());
            thread::sleep(until_done.min(until_tick).min(CANCEL_POLL));
        }
    }
}
