//! Calendar core for a weekday-bounded date range picker.
//!
//! Provides the pieces a date-range picker UI needs behind its rendering
//! layer: a validated [`CalendarDate`] value type, weekend enumeration over a
//! [`DateRange`], the Sunday-first [`MonthGrid`] month layout, and the
//! [`RangeSelector`] state machine that turns date clicks into finalized
//! ranges.

mod consts;
mod grid;
mod prelude;
mod range;
mod selection;
mod types;

pub use consts::*;
pub use grid::MonthGrid;
pub use range::{weekends_between, DateRange, RangeError};
pub use selection::{PredefinedRange, RangeSelector, SelectionState};
pub use types::{Day, Month, Weekday, Year};

use crate::prelude::*;
use std::str::FromStr;
use types::{civil_from_days, days_from_civil, days_in_month, weekday_index_for};

/// A single day on the proleptic Gregorian calendar, within years 1..=9999.
/// Immutable once constructed; comparisons follow calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{:04}-{:02}-{:02}", "year.get()", "month.get()", "day.get()")]
pub struct CalendarDate {
    year: Year,
    month: Month,
    day: Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DateError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { month: u8, day: u8, year: u16 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for DateError {}

impl CalendarDate {
    /// Creates a date from raw year/month/day components.
    ///
    /// # Errors
    /// Returns a `DateError` naming the first invalid component.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, DateError> {
        let year = Year::new(year)?;
        let month_checked = Month::new(month)?;
        let day = Day::new(day, year.get(), month)?;
        Ok(Self {
            year,
            month: month_checked,
            day,
        })
    }

    /// Returns the year (1..=9999)
    #[inline]
    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    /// Returns the month (1..=12)
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    /// Returns the day of month (1..=31)
    #[inline]
    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    /// Day count since 1970-01-01 (negative before the epoch)
    pub const fn days_since_epoch(&self) -> i64 {
        days_from_civil(self.year() as i32, self.month(), self.day())
    }

    /// Creates a date from a day count since 1970-01-01.
    /// Returns `None` outside the supported year range.
    pub fn from_days_since_epoch(days: i64) -> Option<Self> {
        let (year, month, day) = civil_from_days(days);
        let year = u16::try_from(year).ok()?;
        Self::new(year, month, day).ok()
    }

    /// Day of week on the Sunday-first scale (Sunday=0 .. Saturday=6)
    pub const fn day_of_week(&self) -> Weekday {
        Weekday::from_index(weekday_index_for(self.days_since_epoch()))
    }

    /// Monday through Friday
    #[inline]
    pub const fn is_weekday(&self) -> bool {
        self.day_of_week().is_weekday()
    }

    /// Saturday or Sunday
    #[inline]
    pub const fn is_weekend(&self) -> bool {
        self.day_of_week().is_weekend()
    }

    /// Next calendar day, `None` past the `MAX_YEAR` limit
    pub fn succ(&self) -> Option<Self> {
        next_day(self.year(), self.month(), self.day())
            .and_then(|(y, m, d)| Self::new(y, m, d).ok())
    }

    /// Previous calendar day, `None` before year 1
    pub fn pred(&self) -> Option<Self> {
        self.checked_sub_days(1)
    }

    /// Date `days` later, `None` past the `MAX_YEAR` limit
    pub fn checked_add_days(&self, days: u32) -> Option<Self> {
        Self::from_days_since_epoch(self.days_since_epoch() + i64::from(days))
    }

    /// Date `days` earlier, `None` before year 1
    pub fn checked_sub_days(&self, days: u32) -> Option<Self> {
        Self::from_days_since_epoch(self.days_since_epoch() - i64::from(days))
    }
}

// --- helpers for day rollover ---
fn next_month(year: u16, month: u8) -> Option<(u16, u8)> {
    debug_assert!(month != 0 && month <= MAX_MONTH);
    if month == DECEMBER {
        // Check both overflow and our MAX_YEAR limit
        if year >= MAX_YEAR {
            None
        } else {
            Some((year + 1, JANUARY))
        }
    } else {
        Some((year, month + 1))
    }
}

fn next_day(year: u16, month: u8, day: u8) -> Option<(u16, u8, u8)> {
    let max = days_in_month(year, month);
    if day < max {
        Some((year, month, day + 1))
    } else {
        // roll to first of next month (respects MAX_YEAR limit)
        next_month(year, month).map(|(ny, nm)| (ny, nm, MIN_DAY))
    }
}

fn parse_u16(s: &str) -> Result<u16, DateError> {
    s.parse::<u16>()
        .map_err(|_| DateError::InvalidFormat(s.to_owned()))
}

fn parse_u8(s: &str) -> Result<u8, DateError> {
    s.parse::<u8>()
        .map_err(|_| DateError::InvalidFormat(s.to_owned()))
}

impl FromStr for CalendarDate {
    type Err = DateError;

    /// Strict ISO format: `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DateError::EmptyInput);
        }

        let parts: Vec<&str> = trimmed.split(DATE_SEPARATOR).map(str::trim).collect();
        if parts.len() != 3 {
            return Err(DateError::InvalidFormat(format!(
                "Expected year{DATE_SEPARATOR}month{DATE_SEPARATOR}day: {s}"
            )));
        }

        let year = parse_u16(parts[0])?;
        let month = parse_u8(parts[1])?;
        let day = parse_u8(parts[2])?;
        Self::new(year, month, day)
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::CalendarDate;

    /// Shorthand constructor for dates known to be valid in tests
    pub(crate) fn date(year: u16, month: u8, day: u8) -> CalendarDate {
        CalendarDate::new(year, month, day).expect("valid test date")
    }
}
