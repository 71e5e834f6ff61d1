use chrono::Local;
use std::path::PathBuf;

use pomocycle_core::stats::{compute_stats, StatsReport, StatsWindow};
use pomocycle_core::timer::SESSIONS_PER_CYCLE;

use super::open_store;
use crate::render::{RULE, THIN_RULE};

pub struct StatsArgs {
    pub week: bool,
    pub month: bool,
    pub days: Option<u32>,
    pub json: bool,
    pub data_file: Option<PathBuf>,
}

impl StatsArgs {
    fn window(&self) -> Result<StatsWindow, Box<dyn std::error::Error>> {
        Ok(if self.week {
            StatsWindow::week()
        } else if self.month {
            StatsWindow::month()
        } else if let Some(days) = self.days {
            StatsWindow::last_days(days)?
        } else {
            StatsWindow::AllTime
        })
    }
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let window = args.window()?;
    let store = open_store(args.data_file)?;
    let history = store.history();
    let report = compute_stats(history, window, Local::now())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report {
        Some(report) => print_report(&report),
        None if history.is_empty() => {
            println!("\n📊 No Pomodoros recorded yet. Start your first one!");
        }
        None => match window {
            StatsWindow::LastDays(days) => println!("\n📊 No Pomodoros in the last {days} days."),
            StatsWindow::AllTime => println!("\n📊 No Pomodoros recorded yet. Start your first one!"),
        },
    }
    Ok(())
}

fn print_report(report: &StatsReport) {
    println!("\n📊 POMODORO STATISTICS ({})", report.window.describe());
    println!("{RULE}");
    println!("✅ Completed Pomodoros: {}", report.completed);
    if report.incomplete > 0 {
        println!("⚠️  Incomplete Pomodoros: {}", report.incomplete);
    }
    println!("🍅 Total work sessions: {}", report.total_work_sessions);
    println!(
        "⏱️  Total work time: {:.0} minutes ({:.1} hours)",
        report.total_work_minutes, report.total_work_hours
    );
    if let Some(avg) = report.avg_sessions_per_day {
        println!("📈 Average: {avg:.1} work sessions/day");
    }

    println!("\n📅 Recent:");
    println!("{THIN_RULE}");
    for record in &report.recent {
        let status = if record.completed { "✅" } else { "⚠️" };
        println!(
            "   {status} {} - {}/{} sessions ({} min)",
            record.start_time.format("%Y-%m-%d %H:%M"),
            record.work_sessions,
            SESSIONS_PER_CYCLE,
            record.total_work_minutes
        );
    }
    println!();
}
