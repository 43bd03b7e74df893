//! Public holiday rules.
//!
//! Holidays are either pinned to a month/day (optionally only for a range of
//! years) or derived from Easter Sunday by a day offset.

use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// A holiday on the same month and day every year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixedHoliday {
    /// Month number (1-12).
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Holiday name.
    pub name: String,
    /// First year the holiday is observed.
    #[serde(default)]
    pub from_year: Option<i32>,
    /// Last year the holiday is observed.
    #[serde(default)]
    pub until_year: Option<i32>,
}

impl FixedHoliday {
    fn observed_in(&self, year: i32) -> bool {
        self.from_year.is_none_or(|from| year >= from)
            && self.until_year.is_none_or(|until| year <= until)
    }
}

/// A moveable feast, expressed as an offset from Easter Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EasterHoliday {
    /// Days after Easter Sunday (negative for days before).
    pub offset_days: i64,
    /// Holiday name.
    pub name: String,
}

/// The full set of holiday rules, as loaded from holidays.yaml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HolidayRules {
    /// Fixed-date holidays.
    #[serde(default)]
    pub fixed: Vec<FixedHoliday>,
    /// Easter-relative holidays.
    #[serde(default)]
    pub easter: Vec<EasterHoliday>,
}

impl HolidayRules {
    /// Returns every holiday observed in `year`, sorted by date.
    ///
    /// A fixed holiday with an impossible month/day is a configuration error.
    pub fn holidays_in(&self, year: i32) -> EngineResult<Vec<(NaiveDate, String)>> {
        let mut holidays = Vec::new();

        for holiday in self.fixed.iter().filter(|h| h.observed_in(year)) {
            let date = NaiveDate::from_ymd_opt(year, holiday.month, holiday.day).ok_or_else(|| {
                EngineError::InvalidConfig {
                    message: format!(
                        "holiday '{}' has invalid date {}-{}",
                        holiday.name, holiday.month, holiday.day
                    ),
                }
            })?;
            holidays.push((date, holiday.name.clone()));
        }

        let easter = easter_sunday(year)?;
        for holiday in &self.easter {
            let date = easter
                .checked_add_signed(Duration::days(holiday.offset_days))
                .ok_or_else(|| EngineError::InvalidConfig {
                    message: format!("holiday '{}' offset out of range", holiday.name),
                })?;
            holidays.push((date, holiday.name.clone()));
        }

        holidays.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(holidays)
    }
}

/// Computes Easter Sunday in the Gregorian calendar (anonymous algorithm).
///
/// # Example
///
/// ```
/// use worktrack_engine::calendar::easter_sunday;
/// use chrono::NaiveDate;
///
/// assert_eq!(easter_sunday(2025).unwrap(), NaiveDate::from_ymd_opt(2025, 4, 20).unwrap());
/// ```
pub fn easter_sunday(year: i32) -> EngineResult<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(|| {
        EngineError::InvalidConfig {
            message: format!("cannot compute Easter for year {}", year),
        }
    })
}
