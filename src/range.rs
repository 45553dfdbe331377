use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{prelude::*, CalendarDate, DateError, Weekday, DAYS_PER_WEEK, RANGE_SEPARATOR};

/// A closed interval of calendar dates (inclusive on both ends).
/// The start date must be less than or equal to the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{start}/{end}")]
pub struct DateRange {
    start: CalendarDate,
    end:   CalendarDate,
}

/// Error type for date range operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start date is after end date.
    #[error("Invalid date range: start ({start}) is after end ({end})")]
    InvalidRange {
        start: CalendarDate,
        end:   CalendarDate,
    },

    /// Error parsing a date component.
    #[error(transparent)]
    DateError(#[from] DateError),

    /// Invalid range format.
    #[error("Invalid range format: {0}")]
    InvalidFormat(String),
}

impl DateRange {
    /// Creates a new date range with validation.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidRange` if start > end.
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the start date of the range
    pub const fn start(&self) -> CalendarDate {
        self.start
    }

    /// Returns the end date of the range
    pub const fn end(&self) -> CalendarDate {
        self.end
    }

    /// Returns both start and end dates as a tuple
    pub const fn dates(&self) -> (CalendarDate, CalendarDate) {
        (self.start, self.end)
    }

    /// Checks if the range contains a given date
    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// Number of days in the range, counting both endpoints
    pub fn len_days(&self) -> u64 {
        let days = self.end.days_since_epoch() - self.start.days_since_epoch() + 1;
        u64::try_from(days).unwrap_or(0)
    }

    /// Every date in the range falling on a Saturday or Sunday, ascending.
    /// Linear scan over the spanned days; UI-selected ranges are small.
    pub fn weekends(&self) -> Vec<CalendarDate> {
        let mut dates = Vec::new();
        let mut current = Some(self.start);
        while let Some(day) = current {
            if day > self.end {
                break;
            }
            if day.is_weekend() {
                dates.push(day);
            }
            current = day.succ();
        }
        dates
    }

    /// Closed-form count of days in the range falling on `weekday`
    pub fn weekday_count(&self, weekday: Weekday) -> u64 {
        let week = u64::from(DAYS_PER_WEEK);
        let total = self.len_days();
        let full_weeks = total / week;
        let remainder = total % week;
        // Offset of the first matching day from the range start, in days
        let offset = (weekday.index() + DAYS_PER_WEEK - self.start.day_of_week().index())
            % DAYS_PER_WEEK;
        full_weeks + u64::from(u64::from(offset) < remainder)
    }

    /// Closed-form count of Saturdays and Sundays in the range
    pub fn weekend_count(&self) -> u64 {
        self.weekday_count(Weekday::Saturday) + self.weekday_count(Weekday::Sunday)
    }
}

/// Weekend dates between two endpoints given as an ordered pair.
///
/// Policy: a reversed pair is rejected rather than treated as empty.
///
/// # Errors
/// Returns `RangeError::InvalidRange` if start > end.
pub fn weekends_between(
    start: CalendarDate,
    end: CalendarDate,
) -> Result<Vec<CalendarDate>, RangeError> {
    DateRange::new(start, end).map(|range| range.weekends())
}

impl FromStr for DateRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // ISO 8601 extended format: use RANGE_SEPARATOR to separate start/end
        let separator_count = trimmed.matches(RANGE_SEPARATOR).count();

        match separator_count {
            0 => Err(RangeError::InvalidFormat(format!(
                "No range separator found (expected '{RANGE_SEPARATOR}'): {s}"
            ))),
            1 => {
                // SAFETY: We just verified separator_count == 1, so find() must succeed
                let pos = trimmed.find(RANGE_SEPARATOR).ok_or_else(|| {
                    RangeError::InvalidFormat(format!(
                        "Separator '{RANGE_SEPARATOR}' not found despite count == 1"
                    ))
                })?;
                let start_str = trimmed[..pos].trim();
                let end_str = trimmed[pos + 1..].trim();

                let start = start_str.parse::<CalendarDate>()?;
                let end = end_str.parse::<CalendarDate>()?;

                Self::new(start, end)
            },
            _ => Err(RangeError::InvalidFormat(format!(
                "Too many '{RANGE_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
