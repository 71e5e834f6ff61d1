//! Terminal formatting helpers.

use pomocycle_core::timer::{Interval, IntervalKind, SESSIONS_PER_CYCLE};

pub const BAR_WIDTH: usize = 20;
pub const RULE: &str = "================================================";
pub const THIN_RULE: &str = "------------------------------------------------";

/// `MM:SS`, rounding down to the second.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Whole minutes when exact, otherwise seconds.
pub fn format_length(ms: u64) -> String {
    if ms % 60_000 == 0 {
        format!("{} minutes", ms / 60_000)
    } else {
        format!("{:.1} seconds", ms as f64 / 1000.0)
    }
}

pub fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// The in-place countdown line, without the leading carriage return.
pub fn progress_line(remaining_ms: u64, fraction: f64) -> String {
    format!(
        "⏱️  {} remaining [{}] {:.0}%",
        format_time(remaining_ms),
        progress_bar(fraction),
        fraction.clamp(0.0, 1.0) * 100.0
    )
}

pub fn interval_header(interval: &Interval) -> String {
    let length = format_length(interval.duration_ms);
    match interval.kind {
        IntervalKind::Work => format!(
            "🍅 WORK SESSION {}/{}: {length}",
            interval.ordinal, SESSIONS_PER_CYCLE
        ),
        IntervalKind::ShortBreak => format!("☕ SHORT BREAK: {length}"),
        IntervalKind::LongBreak => format!("🎉 LONG BREAK: {length}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(61_999), "01:01");
        assert_eq!(format_time(25 * 60_000), "25:00");
    }

    #[test]
    fn format_length_prefers_minutes() {
        assert_eq!(format_length(25 * 60_000), "25 minutes");
        assert_eq!(format_length(500), "0.5 seconds");
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(1.0), "█".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(2.0), "█".repeat(BAR_WIDTH));
        let half = progress_bar(0.5);
        assert_eq!(half.chars().filter(|c| *c == '█').count(), 10);
        assert_eq!(half.chars().count(), BAR_WIDTH);
    }

    #[test]
    fn progress_line_shows_percent() {
        let line = progress_line(90_000, 0.25);
        assert!(line.contains("01:30 remaining"));
        assert!(line.ends_with("25%"));
    }

    #[test]
    fn headers_name_the_session() {
        let work = Interval {
            kind: IntervalKind::Work,
            duration_ms: 25 * 60_000,
            ordinal: 2,
        };
        assert_eq!(interval_header(&work), "🍅 WORK SESSION 2/4: 25 minutes");
    }
}
