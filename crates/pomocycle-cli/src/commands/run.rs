use chrono::Local;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use tracing::{debug, warn};

use pomocycle_core::events::{CycleObserver, Event};
use pomocycle_core::notify::{NoopNotifier, Notifier};
use pomocycle_core::storage::Config;
use pomocycle_core::timer::{
    BreakPrompt, CancelToken, CycleConfig, CycleMachine, CycleOutcome, Profile,
    PromptAnswer, Prompter, CANCEL_POLL,
};

use super::open_store;
use crate::notifier::DesktopNotifier;
use crate::render;

pub struct RunArgs {
    pub long_break: Option<u32>,
    pub test: bool,
    pub json: bool,
    pub data_file: Option<PathBuf>,
    pub no_notify: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Flags and config.toml are both checked before anything touches the disk.
    let explicit = if args.test {
        Some(CycleConfig::test_profile())
    } else {
        args.long_break.map(CycleConfig::standard).transpose()?
    };
    let settings = Config::load()?;
    let config = match explicit {
        Some(config) => config,
        None => CycleConfig::standard(settings.long_break_minutes)?,
    };

    let mut store = open_store(args.data_file)?;
    let notifier: Box<dyn Notifier> = if args.no_notify || !settings.notifications.enabled {
        Box::new(NoopNotifier)
    } else {
        Box::new(DesktopNotifier::new(settings.notifications.sound))
    };

    let cancel = CancelToken::new();
    spawn_interrupt_listener(cancel.clone())?;

    let mut prompter = StdinPrompter::default();
    let mut view = ConsoleView::new(args.json);
    let report = CycleMachine::new(
        config,
        &mut store,
        &mut prompter,
        notifier.as_ref(),
        &mut view,
        cancel,
    )
    .run()?;

    debug!(outcome = ?report.outcome, persisted = report.persisted, "run finished");
    Ok(())
}

/// Trip `cancel` on the first Ctrl+C.
fn spawn_interrupt_listener(cancel: CancelToken) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        debug!("interrupt received");
                        cancel.cancel();
                    }
                    Err(e) => warn!("cannot listen for Ctrl+C: {e}"),
                }
            });
        })?;
    Ok(())
}

/// Reads answers from stdin on a helper thread so a pending prompt can
/// still observe the cancel token.
#[derive(Default)]
struct StdinPrompter {
    lines: Option<Receiver<String>>,
}

impl StdinPrompter {
    fn lines(&mut self) -> &Receiver<String> {
        self.lines.get_or_insert_with(spawn_stdin_reader)
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("cannot read from stdin: {e}");
                    break;
                }
            }
        }
    });
    rx
}

impl Prompter for StdinPrompter {
    fn ask(&mut self, prompt: BreakPrompt, cancel: &CancelToken) -> PromptAnswer {
        let lines = self.lines();
        loop {
            if cancel.is_cancelled() {
                return PromptAnswer::Interrupted;
            }
            match lines.recv_timeout(CANCEL_POLL) {
                Ok(line) => return PromptAnswer::from_input(&line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!(?prompt, "end of input, taking the break");
                    return PromptAnswer::from_input("");
                }
            }
        }
    }
}

/// Renders cycle events to stdout, either for a terminal or as JSON lines.
struct ConsoleView {
    json: bool,
    out: io::Stdout,
}

impl ConsoleView {
    fn new(json: bool) -> Self {
        Self {
            json,
            out: io::stdout(),
        }
    }

    fn render(&mut self, event: &Event) -> io::Result<()> {
        let mut out = self.out.lock();
        if self.json {
            if !matches!(event, Event::Tick { .. }) {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
            }
            return Ok(());
        }

        match event {
            Event::CycleStarted {
                profile,
                long_break_ms,
                ..
            } => {
                if *profile == Profile::Test {
                    writeln!(out, "⚡ TEST MODE: shortened durations, nothing is saved")?;
                }
                writeln!(out, "\n{}", render::RULE)?;
                writeln!(out, "🍅 STARTING NEW POMODORO")?;
                writeln!(
                    out,
                    "4x25min work + 5min breaks + {} long break",
                    render::format_length(*long_break_ms)
                )?;
                writeln!(out, "{}", render::RULE)?;
            }
            Event::IntervalStarted { interval, .. } => {
                writeln!(out, "\n{}", render::interval_header(interval))?;
                writeln!(out, "Started at: {}", Local::now().format("%H:%M:%S"))?;
                writeln!(out, "\nPress Ctrl+C to cancel\n")?;
            }
            Event::Tick {
                remaining_ms,
                fraction,
                ..
            } => {
                write!(out, "\r{}", render::progress_line(*remaining_ms, *fraction))?;
            }
            Event::IntervalCompleted { interval, .. } => {
                writeln!(
                    out,
                    "\r✅ {} DONE! [{}]      ",
                    interval.kind.label(),
                    render::progress_bar(1.0)
                )?;
            }
            Event::IntervalCancelled { .. } => {
                writeln!(out, "\n\n⚠️  Session cancelled")?;
            }
            Event::BreakPrompted { prompt, .. } => {
                if *prompt == BreakPrompt::LongBreak {
                    writeln!(out, "\n🎉 ALL WORK SESSIONS COMPLETE!")?;
                } else {
                    writeln!(out)?;
                }
                write!(out, "{}", prompt.question())?;
            }
            Event::BreakSkipped { prompt, .. } => match prompt {
                BreakPrompt::ShortBreak { .. } => writeln!(out, "⏭️  Skipping break...\n")?,
                BreakPrompt::LongBreak => writeln!(out, "⏭️  Skipping long break...\n")?,
            },
            Event::RecordSaved { .. } | Event::RecordDiscarded { .. } => {}
            Event::CycleFinished {
                outcome,
                completed_total,
                ..
            } => {
                match outcome {
                    CycleOutcome::Completed { .. } => {
                        writeln!(out, "\n{}", render::RULE)?;
                        writeln!(out, "✅ POMODORO COMPLETE!")?;
                    }
                    CycleOutcome::Cancelled { .. } => {
                        writeln!(out, "\n❌ Pomodoro cancelled.")?;
                        writeln!(out, "{}", render::RULE)?;
                    }
                }
                writeln!(out, "Total completed: {completed_total}")?;
                writeln!(out, "{}", render::RULE)?;
            }
        }
        out.flush()
    }
}

impl CycleObserver for ConsoleView {
    fn on_event(&mut self, event: &Event) {
        if let Err(e) = self.render(event) {
            debug!("cannot write to stdout: {e}");
        }
    }
}
