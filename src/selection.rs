use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{CalendarDate, DateRange, MonthGrid};

/// Progress of an in-flight range selection.
///
/// `RangeSelected` is terminal until the next date click starts a new
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    StartSelected(CalendarDate),
    RangeSelected(DateRange),
}

/// A labelled preset range offered alongside the calendar, e.g. a billing
/// period or "Last 7 Days" button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedRange {
    pub label: String,
    pub range: DateRange,
}

/// Selection state machine of the date range picker.
///
/// Owns the in-flight selection and the displayed year/month, and reports
/// every finalized range through the `on_change` callback together with the
/// weekend dates inside it. The callback fires exactly once per
/// finalization, synchronously.
///
/// Click handling deliberately never errors: an end click that is not a
/// later weekday restarts the selection at the clicked date instead of
/// being rejected.
pub struct RangeSelector<F> {
    state:           SelectionState,
    displayed_year:  i32,
    displayed_month: i32,
    on_change:       F,
}

impl<F> RangeSelector<F>
where
    F: FnMut(DateRange, &[CalendarDate]),
{
    /// Creates a selector displaying the current local month.
    pub fn new(on_change: F) -> Self {
        let (year, month) = local_today()
            .map(|today| (i32::from(today.year()), i32::from(today.month()) - 1))
            .unwrap_or((1970, 0));
        Self::with_display(year, month, on_change)
    }

    /// Creates a selector displaying the given year and 0-based month.
    pub fn with_display(year: i32, month: i32, on_change: F) -> Self {
        Self {
            state: SelectionState::Empty,
            displayed_year: year,
            displayed_month: month,
            on_change,
        }
    }

    /// Current selection state
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    /// The finalized range, if the selection is complete
    pub const fn selected_range(&self) -> Option<DateRange> {
        match self.state {
            SelectionState::RangeSelected(range) => Some(range),
            SelectionState::Empty | SelectionState::StartSelected(_) => None,
        }
    }

    /// Handles a click on a calendar day.
    ///
    /// With a start date pending, a click on a later weekday finalizes the
    /// range and fires the callback. Any other click (weekend day, or a date
    /// at or before the start) silently restarts the selection at the
    /// clicked date, as does any click from the empty or finalized states.
    pub fn select_date(&mut self, date: CalendarDate) {
        if let SelectionState::StartSelected(start) = self.state {
            if date > start && date.is_weekday() {
                // start < date, so the range constructor cannot reject it
                if let Ok(range) = DateRange::new(start, date) {
                    self.finalize(range);
                    return;
                }
            }
        }
        self.state = SelectionState::StartSelected(date);
    }

    /// Finalizes a caller-supplied range directly, bypassing the
    /// weekday-click rules. Always fires the callback.
    pub fn select_range(&mut self, range: DateRange) {
        self.finalize(range);
    }

    /// Applies a labelled preset through the predefined-range path
    pub fn select_predefined(&mut self, preset: &PredefinedRange) {
        self.select_range(preset.range);
    }

    /// Selects the `days`-day range ending at `today` (so "last 7 days" is
    /// `today - 6` through `today`). Zero is treated as a single-day range,
    /// and a start falling before year 1 collapses to `today`.
    pub fn select_last_days(&mut self, days: u32, today: CalendarDate) {
        let start = today
            .checked_sub_days(days.saturating_sub(1))
            .unwrap_or(today);
        if let Ok(range) = DateRange::new(start, today) {
            self.finalize(range);
        }
    }

    /// `select_last_days` anchored at the local clock's current date
    pub fn select_last_days_from_today(&mut self, days: u32) {
        if let Some(today) = local_today() {
            self.select_last_days(days, today);
        }
    }

    /// Jumps the displayed calendar to a year and 0-based month
    pub fn set_display(&mut self, year: i32, month: i32) {
        self.displayed_year = year;
        self.displayed_month = month;
    }

    /// Moves the displayed month by `delta` months; the grid normalizes
    /// across year boundaries
    pub fn shift_month(&mut self, delta: i32) {
        self.displayed_month += delta;
    }

    /// Moves the displayed year by `delta` years
    pub fn shift_year(&mut self, delta: i32) {
        self.displayed_year += delta;
    }

    /// Displayed (year, 0-based month) as last set, without normalization
    pub const fn displayed(&self) -> (i32, i32) {
        (self.displayed_year, self.displayed_month)
    }

    /// Builds the grid for the currently displayed month
    pub fn month_grid(&self) -> MonthGrid {
        MonthGrid::build(self.displayed_year, self.displayed_month)
    }

    fn finalize(&mut self, range: DateRange) {
        let weekends = range.weekends();
        self.state = SelectionState::RangeSelected(range);
        (self.on_change)(range, &weekends);
    }
}

/// Today on the host's local calendar, if it falls in the supported year range
fn local_today() -> Option<CalendarDate> {
    let today = chrono::Local::now().date_naive();
    let year = u16::try_from(today.year()).ok()?;
    CalendarDate::new(year, today.month() as u8, today.day() as u8).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Finalized = Rc<RefCell<Vec<(DateRange, Vec<CalendarDate>)>>>;

    fn selector() -> (RangeSelector<impl FnMut(DateRange, &[CalendarDate])>, Finalized) {
        let calls: Finalized = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let selector = RangeSelector::with_display(2024, 2, move |range, weekends: &[CalendarDate]| {
            sink.borrow_mut().push((range, weekends.to_vec()));
        });
        (selector, calls)
    }

    #[test]
    fn test_initial_state_is_empty() {
        let (selector, calls) = selector();
        assert_eq!(selector.state(), SelectionState::Empty);
        assert_eq!(selector.selected_range(), None);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_first_click_selects_start() {
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 4));
        assert_eq!(
            selector.state(),
            SelectionState::StartSelected(date(2024, 3, 4))
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_later_weekday_click_finalizes() {
        // 2024-03-04 is a Monday, 2024-03-08 a Friday
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 4));
        selector.select_date(date(2024, 3, 8));

        let expected = DateRange::new(date(2024, 3, 4), date(2024, 3, 8)).expect("ordered range");
        assert_eq!(selector.state(), SelectionState::RangeSelected(expected));
        assert_eq!(selector.selected_range(), Some(expected));

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, expected);
        // Monday through Friday contains no weekend days
        assert_eq!(calls[0].1, vec![]);
    }

    #[test]
    fn test_weekend_end_click_restarts_selection() {
        // 2024-03-10 is a Sunday: not a valid end date
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 4));
        selector.select_date(date(2024, 3, 10));

        assert_eq!(
            selector.state(),
            SelectionState::StartSelected(date(2024, 3, 10))
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_earlier_or_equal_click_restarts_selection() {
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 8));

        // Earlier weekday
        selector.select_date(date(2024, 3, 4));
        assert_eq!(
            selector.state(),
            SelectionState::StartSelected(date(2024, 3, 4))
        );

        // Same date again
        selector.select_date(date(2024, 3, 4));
        assert_eq!(
            selector.state(),
            SelectionState::StartSelected(date(2024, 3, 4))
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_click_after_finalization_starts_new_selection() {
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 4));
        selector.select_date(date(2024, 3, 8));
        assert_eq!(calls.borrow().len(), 1);

        selector.select_date(date(2024, 3, 20));
        assert_eq!(
            selector.state(),
            SelectionState::StartSelected(date(2024, 3, 20))
        );
        // No further callback until the new selection completes
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_finalized_range_spanning_weekend() {
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 8));
        selector.select_date(date(2024, 3, 12));

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, vec![date(2024, 3, 9), date(2024, 3, 10)]);
    }

    #[test]
    fn test_predefined_range_bypasses_weekday_rules() {
        // Saturday through Sunday endpoints would never pass select_date
        let (mut selector, calls) = selector();
        let range = DateRange::new(date(2024, 3, 9), date(2024, 3, 17)).expect("ordered range");
        selector.select_range(range);

        assert_eq!(selector.state(), SelectionState::RangeSelected(range));
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].1,
            vec![
                date(2024, 3, 9),
                date(2024, 3, 10),
                date(2024, 3, 16),
                date(2024, 3, 17),
            ]
        );
    }

    #[test]
    fn test_select_predefined_preset() {
        let (mut selector, calls) = selector();
        let preset = PredefinedRange {
            label: "Early March".to_owned(),
            range: DateRange::new(date(2024, 3, 1), date(2024, 3, 10)).expect("ordered range"),
        };
        selector.select_predefined(&preset);

        assert_eq!(selector.selected_range(), Some(preset.range));
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_last_seven_days() {
        let (mut selector, calls) = selector();
        selector.select_last_days(7, date(2024, 3, 15));

        let expected = DateRange::new(date(2024, 3, 9), date(2024, 3, 15)).expect("ordered range");
        assert_eq!(selector.selected_range(), Some(expected));

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, expected);
        assert_eq!(calls[0].1, vec![date(2024, 3, 9), date(2024, 3, 10)]);
    }

    #[test]
    fn test_last_thirty_days() {
        let (mut selector, _calls) = selector();
        selector.select_last_days(30, date(2024, 3, 15));

        let range = selector.selected_range().expect("finalized range");
        assert_eq!(range.start(), date(2024, 2, 15));
        assert_eq!(range.end(), date(2024, 3, 15));
        assert_eq!(range.len_days(), 30);
    }

    #[test]
    fn test_last_days_zero_is_single_day() {
        let (mut selector, _calls) = selector();
        selector.select_last_days(0, date(2024, 3, 15));

        let range = selector.selected_range().expect("finalized range");
        assert_eq!(range.dates(), (date(2024, 3, 15), date(2024, 3, 15)));
    }

    #[test]
    fn test_last_days_underflow_collapses_to_today() {
        let (mut selector, _calls) = selector();
        selector.select_last_days(30, date(1, 1, 5));

        let range = selector.selected_range().expect("finalized range");
        assert_eq!(range.dates(), (date(1, 1, 5), date(1, 1, 5)));
    }

    #[test]
    fn test_display_navigation() {
        let (mut selector, _calls) = selector();
        assert_eq!(selector.displayed(), (2024, 2));

        selector.shift_month(-3);
        assert_eq!(selector.displayed(), (2024, -1));
        // The grid normalizes the drifted month
        let grid = selector.month_grid();
        assert_eq!(grid.year(), 2023);
        assert_eq!(grid.month(), 12);

        selector.shift_year(1);
        selector.shift_month(1);
        let grid = selector.month_grid();
        assert_eq!(grid.year(), 2025);
        assert_eq!(grid.month(), 1);

        selector.set_display(2020, 0);
        let grid = selector.month_grid();
        assert_eq!(grid.year(), 2020);
        assert_eq!(grid.month(), 1);
    }

    #[test]
    fn test_navigation_does_not_touch_selection() {
        let (mut selector, calls) = selector();
        selector.select_date(date(2024, 3, 4));
        selector.shift_month(1);
        selector.shift_year(-1);
        assert_eq!(
            selector.state(),
            SelectionState::StartSelected(date(2024, 3, 4))
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_predefined_range_serde() {
        let preset = PredefinedRange {
            label: "Last week of Q1".to_owned(),
            range: DateRange::new(date(2024, 3, 25), date(2024, 3, 31)).expect("ordered range"),
        };
        let json = serde_json::to_string(&preset).expect("failed to serialize preset");
        assert_eq!(
            json,
            r#"{"label":"Last week of Q1","range":"2024-03-25/2024-03-31"}"#
        );

        let parsed: PredefinedRange = serde_json::from_str(&json).expect("failed to deserialize preset");
        assert_eq!(preset, parsed);
    }
}
