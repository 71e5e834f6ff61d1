mod countdown;
mod cycle;
mod interval;
mod prompt;

pub use countdown::{CancelToken, Countdown, CountdownOutcome, Tick, CANCEL_POLL};
pub use cycle::{CycleMachine, CycleOutcome, CycleReport, CycleState, LongBreakOutcome};
pub use interval::{
    CycleConfig, Interval, IntervalKind, Profile, DEFAULT_LONG_BREAK_MINUTES, LONG_BREAK_RANGE,
    SESSIONS_PER_CYCLE, SHORT_BREAK_MINUTES, WORK_MINUTES,
};
pub use prompt::{BreakPrompt, PromptAnswer, Prompter, ScriptedPrompter};
