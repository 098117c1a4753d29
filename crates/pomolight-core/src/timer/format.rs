//! Display helpers shared by the CLI front-ends.

use chrono::{DateTime, TimeZone, Timelike};

/// `mm:ss` for a remaining duration. Minutes are not wrapped at 60 and
/// grow past two digits when needed; negative input renders as `00:00`.
pub fn format_millis(millis: i64) -> String {
    let total_secs = millis.max(0) / 1_000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// `HH:MM` wall-clock time.
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Fixed-width text progress bar, filled by the elapsed share.
pub fn progress_bar(completion_fraction: f64, width: usize) -> String {
    let elapsed = (1.0 - completion_fraction).clamp(0.0, 1.0);
    let filled = ((elapsed * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_millis(0), "00:00");
        assert_eq!(format_millis(61_999), "01:01");
        assert_eq!(format_millis(25 * 60_000), "25:00");
        assert_eq!(format_millis(125 * 60_000), "125:00");
        assert_eq!(format_millis(-5_000), "00:00");
    }

    #[test]
    fn formats_clock_time() {
        let t = Utc.with_ymd_and_hms(2020, 2, 1, 9, 9, 0).unwrap();
        assert_eq!(format_clock(&t), "09:09");
    }

    #[test]
    fn bar_fills_with_elapsed_time() {
        assert_eq!(progress_bar(1.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(0.0, 4), "[####]");
    }
}
