//! Configuration types for the engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;

use crate::calendar::HolidayRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{ChangeReason, ShiftCategory, ShiftType, ShiftTypeId};

/// The daily window whose overlap counts as night hours.
///
/// The window opens at `start` on a date and closes at `end`, on the next
/// day when `end` is not after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NightWindow {
    /// Time the window opens.
    pub start: NaiveTime,
    /// Time the window closes.
    pub end: NaiveTime,
}

impl NightWindow {
    /// Returns the concrete window that opens on `date`.
    ///
    /// # Example
    ///
    /// ```
    /// use worktrack_engine::config::NightWindow;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let window = NightWindow::default();
    /// let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
    /// let (start, end) = window.on(date);
    /// assert_eq!(start, date.and_hms_opt(22, 0, 0).unwrap());
    /// assert_eq!(end, NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(6, 0, 0).unwrap());
    /// ```
    pub fn on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = date.and_time(self.start);
        let end_date = if self.end <= self.start {
            date.checked_add_days(Days::new(1)).unwrap_or(date)
        } else {
            date
        };
        (start, end_date.and_time(self.end))
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// The range of years the calendar catalog is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalendarRange {
    /// First generated year (inclusive).
    pub first_year: i32,
    /// Last generated year (inclusive).
    pub last_year: i32,
}

/// General engine settings from engine.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSettings {
    /// Contractual hours per working day used for the monthly fund.
    #[serde(default = "default_standard_hours")]
    pub standard_hours_per_day: Decimal,
    /// The night window.
    #[serde(default)]
    pub night_window: NightWindow,
    /// The calendar year range.
    pub calendar: CalendarRange,
}

fn default_standard_hours() -> Decimal {
    Decimal::new(70, 1)
}

/// Shift type reference data file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftTypesConfig {
    /// All shift types.
    pub shift_types: Vec<ShiftType>,
}

/// Change reason reference data file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeReasonsConfig {
    /// All change reasons.
    pub change_reasons: Vec<ChangeReason>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    holidays: HolidayRules,
    shift_types: Vec<ShiftType>,
    change_reasons: Vec<ChangeReason>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts, validating that
    /// the parts are consistent.
    pub fn new(
        settings: EngineSettings,
        holidays: HolidayRules,
        shift_types: Vec<ShiftType>,
        change_reasons: Vec<ChangeReason>,
    ) -> EngineResult<Self> {
        if settings.calendar.first_year > settings.calendar.last_year {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "calendar range {}..={} is empty",
                    settings.calendar.first_year, settings.calendar.last_year
                ),
            });
        }
        if settings.standard_hours_per_day <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                message: "standard_hours_per_day must be positive".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for shift_type in &shift_types {
            if !seen.insert(shift_type.id) {
                return Err(EngineError::InvalidConfig {
                    message: format!("duplicate shift type id {}", shift_type.id),
                });
            }
        }
        let other_count = shift_types
            .iter()
            .filter(|t| t.category == ShiftCategory::Other)
            .count();
        if other_count != 1 {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "exactly one shift type must have category 'other', found {}",
                    other_count
                ),
            });
        }

        Ok(Self {
            settings,
            holidays,
            shift_types,
            change_reasons,
        })
    }

    /// Returns the general settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the contractual hours per working day.
    pub fn standard_hours_per_day(&self) -> Decimal {
        self.settings.standard_hours_per_day
    }

    /// Returns the night window.
    pub fn night_window(&self) -> &NightWindow {
        &self.settings.night_window
    }

    /// Returns the holiday rules.
    pub fn holidays(&self) -> &HolidayRules {
        &self.holidays
    }

    /// Returns all shift types.
    pub fn shift_types(&self) -> &[ShiftType] {
        &self.shift_types
    }

    /// Returns all change reasons.
    pub fn change_reasons(&self) -> &[ChangeReason] {
        &self.change_reasons
    }

    /// Looks up a shift type by id.
    pub fn shift_type(&self, id: ShiftTypeId) -> EngineResult<&ShiftType> {
        self.shift_types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "shift type",
                id: id.to_string(),
            })
    }
}
