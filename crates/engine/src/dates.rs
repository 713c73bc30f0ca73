//! Canonical calendar values used by the ledger.
//!
//! Dates travel as `YYYY-MM-DD` and months as `YYYY-MM`. Parsing is strict:
//! exact width, zero padded, and the day must exist in the calendar.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::EngineError;

/// A purchase day without time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// The month the day falls in.
    pub fn month(self) -> Month {
        Month(self.0.with_day(1).unwrap_or(self.0))
    }
}

impl FromStr for CalendarDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Validation("date must be YYYY-MM-DD".to_string());
        if !has_shape(s, "0000-00-00") {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A calendar month, stored as its first day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// First day of the month, the key budgets are stored under.
    pub fn first_day(self) -> CalendarDay {
        CalendarDay(self.0)
    }

    /// The `YYYY-MM` prefix stored purchase dates are matched against.
    pub fn prefix(self) -> String {
        self.to_string()
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Validation("month must be YYYY-MM".to_string());
        if !has_shape(s, "0000-00") {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

/// `0` in `shape` stands for an ASCII digit, anything else must match as is.
fn has_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value
            .bytes()
            .zip(shape.bytes())
            .all(|(v, s)| if s == b'0' { v.is_ascii_digit() } else { v == s })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_day() {
        let day: CalendarDay = "2024-05-31".parse().unwrap();
        assert_eq!(day.to_string(), "2024-05-31");
        assert_eq!(day.month().to_string(), "2024-05");
    }

    #[test]
    fn rejects_impossible_or_loose_days() {
        for raw in [
            "2024-13-40",
            "2023-02-29",
            "2024-5-3",
            "2024/05/03",
            "2024-05-03T10:00",
            "",
            " 2024-05-03",
        ] {
            assert!(raw.parse::<CalendarDay>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn leap_day_is_accepted() {
        assert!("2024-02-29".parse::<CalendarDay>().is_ok());
    }

    #[test]
    fn month_round_trips_to_prefix_and_first_day() {
        let month: Month = "2024-05".parse().unwrap();
        assert_eq!(month.prefix(), "2024-05");
        assert_eq!(month.first_day().to_string(), "2024-05-01");
    }

    #[test]
    fn rejects_malformed_months() {
        for raw in ["2024-13", "2024-00", "2024-5", "202405", "2024-05-01", "may"] {
            assert_eq!(
                raw.parse::<Month>(),
                Err(EngineError::Validation("month must be YYYY-MM".to_string())),
                "accepted {raw:?}"
            );
        }
    }
}
