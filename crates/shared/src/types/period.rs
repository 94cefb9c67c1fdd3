//! Budget period key (month + year).
//!
//! Every budget row is scoped to a calendar month. `Period` is the shared
//! key type for that scope; it validates the month range once at the edge
//! so the rest of the system never sees an invalid month.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing or parsing a [`Period`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Month outside 1..=12.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// String did not match `YYYY-MM`.
    #[error("period must be formatted as YYYY-MM, got {0:?}")]
    InvalidFormat(String),
}

/// A calendar month in a specific year.
///
/// Serialized as `"YYYY-MM"` in API payloads and stored as separate
/// `month`/`year` columns in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, validating the month range.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidMonth` if `month` is not in 1..=12.
    pub const fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if month < 1 || month > 12 {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The year component.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// The month component (1..=12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Month is validated on construction, so this cannot fail.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| unreachable!("validated month"))
    }

    /// First day of the following month (exclusive upper bound for date
    /// range queries).
    #[must_use]
    pub fn first_day_of_next(self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap_or_else(|| unreachable!("validated month"))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodError::InvalidFormat(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rejects_invalid_month() {
        assert_eq!(Period::new(2025, 0), Err(PeriodError::InvalidMonth(0)));
        assert_eq!(Period::new(2025, 13), Err(PeriodError::InvalidMonth(13)));
    }

    #[rstest]
    #[case("2025-08", 2025, 8)]
    #[case("2024-12", 2024, 12)]
    #[case("1999-01", 1999, 1)]
    fn parses_period_strings(#[case] input: &str, #[case] year: i32, #[case] month: u32) {
        let period: Period = input.parse().unwrap();
        assert_eq!(period.year(), year);
        assert_eq!(period.month(), month);
        assert_eq!(period.to_string(), input);
    }

    #[rstest]
    #[case("2025")]
    #[case("2025-00")]
    #[case("2025-13")]
    #[case("august")]
    fn rejects_malformed_strings(#[case] input: &str) {
        assert!(input.parse::<Period>().is_err());
    }

    #[test]
    fn date_range_covers_the_month() {
        let period = Period::new(2025, 12).unwrap();
        assert_eq!(
            period.first_day(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );
        assert_eq!(
            period.first_day_of_next(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn serde_round_trip() {
        let period = Period::new(2025, 8).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2025-08\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }
}
