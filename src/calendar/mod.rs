//! Calendar data: holiday rules, the per-date catalog and month helpers.
//!
//! The [`CalendarCatalog`] is generated once from the configured holiday
//! rules and then shared read-only by segmentation and balance calculations.

mod catalog;
mod holidays;

pub use catalog::CalendarCatalog;
pub use holidays::{EasterHoliday, FixedHoliday, HolidayRules, easter_sunday};

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};

/// Returns the first and last date of a month.
///
/// # Example
///
/// ```
/// use worktrack_engine::calendar::month_bounds;
/// use chrono::NaiveDate;
///
/// let (first, last) = month_bounds(2024, 2).unwrap();
/// assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn month_bounds(year: i32, month: u32) -> EngineResult<(NaiveDate, NaiveDate)> {
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(EngineError::InvalidMonth { year, month })?;
    let (next_year, next_month) = next_month(year, month);
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or(EngineError::InvalidMonth { year, month })?;
    Ok((first, last))
}

/// The (year, month) following the given one.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// The (year, month) a date falls in.
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
