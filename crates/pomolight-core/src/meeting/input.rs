//! `HHMM` meeting time parsing.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::MeetingInputError;

/// A wall-clock time of day, validated to 00:00..=23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Parse `HHMM` as an integer and split it into hour and minute.
    /// Leading zeros are optional, so `"930"` is 09:30.
    pub fn parse(input: &str) -> Result<Self, MeetingInputError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MeetingInputError::InvalidFormat(input.to_string()));
        }
        let n: u32 = trimmed
            .parse()
            .map_err(|_| MeetingInputError::InvalidFormat(input.to_string()))?;

        let (hour, minute) = (n / 100, n % 100);
        if hour > 23 {
            return Err(MeetingInputError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(MeetingInputError::InvalidMinute(minute));
        }
        Ok(Self { hour, minute })
    }

    /// This time on the same calendar day as `now`, in `now`'s timezone,
    /// at second and millisecond zero. `None` when the time does not exist
    /// that day (a DST gap).
    pub fn on_day_of<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let naive = now.date_naive().and_hms_opt(self.hour, self.minute, 0)?;
        now.timezone().from_local_datetime(&naive).earliest()
    }

    /// Epoch milliseconds for [`TimeOfDay::on_day_of`].
    pub fn today_ms<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<i64> {
        self.on_day_of(now).map(|t| t.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn parses_padded_and_unpadded() {
        assert_eq!(
            TimeOfDay::parse("0913").unwrap(),
            TimeOfDay { hour: 9, minute: 13 }
        );
        assert_eq!(
            TimeOfDay::parse(" 930 ").unwrap(),
            TimeOfDay { hour: 9, minute: 30 }
        );
        assert_eq!(
            TimeOfDay::parse("0").unwrap(),
            TimeOfDay { hour: 0, minute: 0 }
        );
        assert_eq!(
            TimeOfDay::parse("2359").unwrap(),
            TimeOfDay { hour: 23, minute: 59 }
        );
    }

    #[test]
    fn rejects_non_numeric() {
        for input in ["abc", "", "  ", "9:30", "-100", "+900", "12a0", "99999999999"] {
            assert!(
                matches!(TimeOfDay::parse(input), Err(MeetingInputError::InvalidFormat(_))),
                "{input:?} should be InvalidFormat"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_parts() {
        assert_eq!(
            TimeOfDay::parse("2500"),
            Err(MeetingInputError::InvalidHour(25))
        );
        assert_eq!(
            TimeOfDay::parse("1060"),
            Err(MeetingInputError::InvalidMinute(60))
        );
    }

    #[test]
    fn anchors_to_the_day_of_now() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 42).unwrap();
        let at = TimeOfDay { hour: 9, minute: 13 }.on_day_of(&now).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 10, 16, 9, 13, 0).unwrap());
        assert_eq!(at.timestamp_millis() % 1_000, 0);
    }
}
