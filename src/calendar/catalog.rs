//! The calendar catalog.
//!
//! A read-only lookup table of [`CalendarDay`] entries, one per date, shared
//! by every engine operation. Lookups for dates outside the generated range
//! fail with [`EngineError::MissingCalendarDay`]; weekend and holiday flags are
//! never defaulted.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::CalendarDay;

use super::HolidayRules;
use super::month_bounds;

/// Precomputed per-date facts for a range of years.
///
/// # Example
///
/// ```
/// use worktrack_engine::calendar::{CalendarCatalog, HolidayRules};
/// use chrono::NaiveDate;
///
/// let catalog = CalendarCatalog::generate(2025, 2025, &HolidayRules::default()).unwrap();
/// assert_eq!(catalog.len(), 365);
///
/// let saturday = catalog.day(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()).unwrap();
/// assert!(saturday.is_weekend);
///
/// assert!(catalog.day(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalendarCatalog {
    days: BTreeMap<NaiveDate, CalendarDay>,
}

impl CalendarCatalog {
    /// Generates entries for every date of `first_year..=last_year`.
    pub fn generate(first_year: i32, last_year: i32, rules: &HolidayRules) -> EngineResult<Self> {
        let mut catalog = Self::default();
        catalog.regenerate(first_year, last_year, rules)?;
        Ok(catalog)
    }

    /// Generates the catalog for the configured year range and holiday rules.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let range = config.settings().calendar;
        Self::generate(range.first_year, range.last_year, config.holidays())
    }

    /// Regenerates entries for `first_year..=last_year` in place.
    ///
    /// Existing entries are updated when the holiday rules changed, missing
    /// entries are inserted, and nothing is ever removed. Returns the number of
    /// entries inserted or updated.
    pub fn regenerate(
        &mut self,
        first_year: i32,
        last_year: i32,
        rules: &HolidayRules,
    ) -> EngineResult<usize> {
        let mut touched = 0;

        for year in first_year..=last_year {
            let holidays: BTreeMap<NaiveDate, String> =
                rules.holidays_in(year)?.into_iter().collect();
            let mut date = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or(EngineError::InvalidMonth { year, month: 1 })?;

            while date.year() == year {
                let entry = CalendarDay::new(date, holidays.get(&date).cloned());
                if self.days.get(&date) != Some(&entry) {
                    self.days.insert(date, entry);
                    touched += 1;
                }
                match date.checked_add_days(Days::new(1)) {
                    Some(next) => date = next,
                    None => break,
                }
            }
        }

        debug!(first_year, last_year, touched, "Regenerated calendar catalog");
        Ok(touched)
    }

    /// Looks up the entry for `date`.
    pub fn day(&self, date: NaiveDate) -> EngineResult<&CalendarDay> {
        self.days
            .get(&date)
            .ok_or(EngineError::MissingCalendarDay { date })
    }

    /// Fails unless an entry exists for `date`.
    pub fn ensure(&self, date: NaiveDate) -> EngineResult<()> {
        self.day(date).map(|_| ())
    }

    /// Returns every entry of the given month, in date order.
    ///
    /// Fails when any date of the month is missing from the catalog.
    pub fn month(&self, year: i32, month: u32) -> EngineResult<Vec<&CalendarDay>> {
        let (first, last) = month_bounds(year, month)?;
        self.ensure(first)?;
        self.ensure(last)?;
        Ok(self.days.range(first..=last).map(|(_, day)| day).collect())
    }

    /// Returns the holidays of the given month.
    pub fn holidays_in_month(&self, year: i32, month: u32) -> EngineResult<Vec<&CalendarDay>> {
        Ok(self
            .month(year, month)?
            .into_iter()
            .filter(|day| day.is_holiday)
            .collect())
    }

    /// Number of entries in the catalog.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true when the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
