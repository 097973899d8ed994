//! Human-readable rendering of cycle boundaries.

use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, Timelike};
use chrono_tz::Tz;

use crate::domain::foundation::{Timestamp, ValidationError};

use super::location::localize;

/// Default boundary format, e.g. "14 February 18:00 (GMT)".
pub const DEFAULT_DISPLAY_FORMAT: &str = "%-d %B 18:00 (%Z)";

/// Formats that print a fixed "18:00" describe the close of the previous day.
const CLOSING_TIME_MARKER: &str = "18:00";

/// How boundaries are shown to employees.
///
/// A boundary at midnight is shown as 18:00 on the day before when the
/// format pins the time to 18:00. Otherwise minutes are floored to the
/// nearest half hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPolicy {
    format: String,
}

impl DisplayPolicy {
    /// Creates a policy, rejecting formats chrono cannot render.
    pub fn new(format: impl Into<String>) -> Result<Self, ValidationError> {
        let format = format.into();
        if format.trim().is_empty() {
            return Err(ValidationError::empty_field("display_format"));
        }
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ValidationError::invalid_format(
                "display_format",
                format!("'{}' is not a valid strftime format", format),
            ));
        }
        Ok(Self { format })
    }

    pub fn format_str(&self) -> &str {
        &self.format
    }

    /// Renders `boundary` as local time in `zone`.
    pub fn render(&self, boundary: Timestamp, zone: Tz) -> String {
        let mut wall = boundary.naive_utc();
        if self.format.contains(CLOSING_TIME_MARKER) {
            wall -= Duration::days(1);
        } else {
            let minute = i64::from(wall.minute());
            if minute > 0 && minute < 30 {
                wall -= Duration::minutes(minute);
            } else if minute > 30 {
                wall -= Duration::minutes(minute - 30);
            }
        }
        localize(wall, zone).format(&self.format).to_string()
    }
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wall(m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Timestamp::from_naive_utc(
            NaiveDate::from_ymd_opt(2024, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn default_format_shows_previous_day_close() {
        let policy = DisplayPolicy::default();
        let rendered = policy.render(wall(2, 15, 0, 0), chrono_tz::Europe::London);
        assert_eq!(rendered, "14 February 18:00 (GMT)");
    }

    #[test]
    fn default_format_uses_local_abbreviation() {
        let policy = DisplayPolicy::default();
        let rendered = policy.render(wall(7, 2, 0, 0), chrono_tz::America::New_York);
        assert_eq!(rendered, "1 July 18:00 (EDT)");
    }

    #[test]
    fn minutes_below_half_hour_are_floored() {
        let policy = DisplayPolicy::new("%H:%M").unwrap();
        assert_eq!(policy.render(wall(1, 10, 9, 17), chrono_tz::Europe::London), "09:00");
    }

    #[test]
    fn minutes_above_half_hour_floor_to_half() {
        let policy = DisplayPolicy::new("%H:%M").unwrap();
        assert_eq!(policy.render(wall(1, 10, 9, 59), chrono_tz::Europe::London), "09:30");
        assert_eq!(policy.render(wall(1, 10, 9, 30), chrono_tz::Europe::London), "09:30");
    }

    #[test]
    fn invalid_format_is_rejected() {
        assert!(DisplayPolicy::new("%Q broken").is_err());
        assert!(DisplayPolicy::new("  ").is_err());
    }
}
