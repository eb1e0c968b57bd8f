use crate::dates::{date_key, is_same_day, today_utc};
use crate::models::{CalendarDay, CheckedDateSet};
use chrono::{Datelike, Duration, NaiveDate};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A displayed month. `month0` is always in `0..12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthRef {
    pub year: i32,
    pub month0: u32,
}

impl MonthRef {
    /// Builds a month from a possibly out-of-range zero-based index:
    /// `-1` is December of the previous year, `12` is January of the next.
    pub fn normalized(year: i32, month_index: i32) -> Self {
        let year = year.saturating_add(month_index.div_euclid(12));
        let month0 = month_index.rem_euclid(12) as u32;
        Self { year, month0 }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn current() -> Self {
        Self::containing(today_utc())
    }

    pub fn prev(self) -> Self {
        Self::normalized(self.year, self.month0 as i32 - 1)
    }

    pub fn next(self) -> Self {
        Self::normalized(self.year, self.month0 as i32 + 1)
    }

    /// One-based month number.
    pub fn month(self) -> u32 {
        self.month0 + 1
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month(), 1)
    }

    pub fn days_in_month(self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        match self.next().first_day() {
            Some(next_first) => (next_first - first).num_days() as u32,
            None => 31,
        }
    }

    pub fn title(self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }
}

/// Builds the month's cells: leading blanks up to the weekday of day 1
/// (Sunday = 0), then one cell per day. No trailing padding.
pub fn build_month_grid(month: MonthRef, checked: &CheckedDateSet, today: NaiveDate) -> Vec<CalendarDay> {
    let Some(first) = month.first_day() else {
        return Vec::new();
    };

    let leading = first.weekday().num_days_from_sunday() as usize;
    let days = month.days_in_month();

    let mut cells = Vec::with_capacity(leading + days as usize);
    cells.extend(std::iter::repeat_n(CalendarDay::Empty, leading));

    for offset in 0..days {
        let date = first + Duration::days(offset as i64);
        cells.push(CalendarDay::Day {
            date,
            day: date.day(),
            is_today: is_same_day(date, today),
            is_checked: checked.is_checked(&date_key(date)),
        });
    }

    cells
}

pub fn build_month_grid_now(month: MonthRef, checked: &CheckedDateSet) -> Vec<CalendarDay> {
    build_month_grid(month, checked, today_utc())
}
