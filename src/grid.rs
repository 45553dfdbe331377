use crate::prelude::*;
use crate::types::{days_from_civil, days_in_month, weekday_index_for};
use crate::{CalendarDate, Weekday, MAX_MONTH, MAX_YEAR};

/// One month of calendar cells laid out Sunday-first: leading `None`
/// padding up to the weekday of day 1, then one `Some(date)` per day.
/// Derefs to the cell slice.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct MonthGrid {
    year:          u16,
    month:         u8,
    first_weekday: Weekday,
    #[deref]
    cells:         Vec<Option<CalendarDate>>,
}

impl MonthGrid {
    /// Builds the grid for a displayed year and 0-based month.
    ///
    /// Any integer month is accepted: values outside 0..12 roll across year
    /// boundaries (month -1 is December of `year - 1`, month 12 is January
    /// of `year + 1`). After normalization the year is clamped to the
    /// supported 1..=9999 range, so building never fails.
    pub fn build(year: i32, month: i32) -> Self {
        let (year, month) = normalize(year, month);
        let first_weekday =
            Weekday::from_index(weekday_index_for(days_from_civil(i32::from(year), month, 1)));
        let day_count = days_in_month(year, month);

        let blanks = usize::from(first_weekday.index());
        let mut cells = Vec::with_capacity(blanks + usize::from(day_count));
        cells.resize(blanks, None);
        for day in 1..=day_count {
            // day never exceeds days_in_month(year, month), so the cell is always Some
            cells.push(CalendarDate::new(year, month, day).ok());
        }

        Self {
            year,
            month,
            first_weekday,
            cells,
        }
    }

    /// Normalized year of the displayed month
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Normalized month, 1-based (1..=12)
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Weekday of the 1st of the month
    pub const fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// Number of leading padding cells (0..=6)
    pub const fn leading_blanks(&self) -> usize {
        self.first_weekday.index() as usize
    }

    /// Number of day cells in the month
    pub fn day_count(&self) -> usize {
        self.cells.len() - self.leading_blanks()
    }

    /// All cells: leading padding as `None`, days as `Some(date)`
    pub fn cells(&self) -> &[Option<CalendarDate>] {
        &self.cells
    }
}

/// Resolves a (year, 0-based month) pair to a clamped (year, 1-based month)
fn normalize(year: i32, month: i32) -> (u16, u8) {
    let months_per_year = i32::from(MAX_MONTH);
    let year = year + month.div_euclid(months_per_year);
    let month = month.rem_euclid(months_per_year) as u8 + 1;
    let year = year.clamp(1, i32::from(MAX_YEAR)) as u16;
    (year, month)
}
