use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pomocycle_core::timer::CycleConfig;

mod commands;
mod notifier;
mod render;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "POMOCYCLE_LOG";

#[derive(Parser)]
#[command(
    name = "pomocycle",
    version,
    about = "Terminal Pomodoro timer: 4 work sessions, short breaks, one long break"
)]
struct Cli {
    /// Show statistics instead of starting a cycle
    #[arg(long)]
    stats: bool,
    /// Limit statistics to the last 7 days
    #[arg(long, requires = "stats", conflicts_with_all = ["month", "days"])]
    week: bool,
    /// Limit statistics to the last 30 days
    #[arg(long, requires = "stats", conflicts_with = "days")]
    month: bool,
    /// Limit statistics to the last N days
    #[arg(long, value_name = "N", requires = "stats")]
    days: Option<u32>,
    /// Long break length in minutes (15-30); defaults to the config file value
    #[arg(long = "break", value_name = "MINUTES")]
    long_break: Option<u32>,
    /// Sub-second durations; nothing is saved
    #[arg(long)]
    test: bool,
    /// Print JSON: the report with --stats, one event per line otherwise
    #[arg(long)]
    json: bool,
    /// History file to use instead of the one in the data directory
    #[arg(long, value_name = "PATH")]
    data_file: Option<PathBuf>,
    /// Do not send desktop notifications
    #[arg(long)]
    no_notify: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = dispatch(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // --break is rejected out of range whichever command runs.
    if let (Some(minutes), false) = (cli.long_break, cli.test) {
        CycleConfig::standard(minutes)?;
    }

    if cli.stats {
        commands::stats::run(commands::stats::StatsArgs {
            week: cli.week,
            month: cli.month,
            days: cli.days,
            json: cli.json,
            data_file: cli.data_file,
        })
    } else {
        commands::run::run(commands::run::RunArgs {
            long_break: cli.long_break,
            test: cli.test,
            json: cli.json,
            data_file: cli.data_file,
            no_notify: cli.no_notify,
        })
    }
}
