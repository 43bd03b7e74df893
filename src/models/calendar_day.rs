//! Calendar day model.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Precomputed facts about one calendar date.
///
/// # Example
///
/// ```
/// use worktrack_engine::models::CalendarDay;
/// use chrono::NaiveDate;
///
/// let day = CalendarDay::new(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(), None);
/// assert!(day.is_weekend);
/// assert!(!day.is_holiday);
/// assert!(!day.is_working_day());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The date.
    pub date: NaiveDate,
    /// The weekday of the date.
    pub weekday: Weekday,
    /// Whether the date falls on Saturday or Sunday.
    pub is_weekend: bool,
    /// Whether the date is a public holiday.
    pub is_holiday: bool,
    /// Name of the holiday, when the date is one.
    pub holiday_name: Option<String>,
}

impl CalendarDay {
    /// Builds the entry for `date`, flagged as a holiday when a name is given.
    pub fn new(date: NaiveDate, holiday_name: Option<String>) -> Self {
        let weekday = date.weekday();
        Self {
            date,
            weekday,
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_holiday: holiday_name.is_some(),
            holiday_name,
        }
    }

    /// A working day is a weekday that is not a holiday; it contributes to the fund.
    pub fn is_working_day(&self) -> bool {
        !self.is_weekend && !self.is_holiday
    }
}
