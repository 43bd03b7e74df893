//! Shift type reference data.
//!
//! Shift types are immutable reference data maintained by managers. Each type
//! carries an explicit [`ShiftCategory`] that drives how durations are resolved
//! and which accounting categories its hours feed.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a shift type.
pub type ShiftTypeId = u32;

/// The accounting capability of a shift type.
///
/// # Example
///
/// ```
/// use worktrack_engine::models::ShiftCategory;
///
/// assert!(ShiftCategory::Night.is_time_derived());
/// assert!(!ShiftCategory::Standard.is_time_derived());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    /// Regular shift with nominal times and a fixed duration.
    Standard,
    /// Night shift; split at midnight into one record per calendar day.
    Night,
    /// Shift whose times are chosen per occurrence.
    Variable,
    /// Work outside the planned window ("other activity"); the type of every carve-out.
    Other,
    /// Paid absence (vacation, sick leave); counts toward worked hours only.
    Absence,
}

impl ShiftCategory {
    /// Returns true when the duration is always computed from clock times,
    /// ignoring any fixed nominal duration.
    pub fn is_time_derived(self) -> bool {
        matches!(
            self,
            ShiftCategory::Night | ShiftCategory::Variable | ShiftCategory::Other
        )
    }

    /// Returns true when hours of this category feed the weekend, holiday and
    /// night totals.
    pub fn counts_toward_premiums(self) -> bool {
        self != ShiftCategory::Absence
    }
}

/// A shift type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftType {
    /// Unique identifier.
    pub id: ShiftTypeId,
    /// Display name (e.g., "Night").
    pub name: String,
    /// Short code shown in rosters (e.g., "N").
    pub code: String,
    /// Nominal start time. Optional for variable types.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// Nominal end time. Optional for variable types.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Fixed nominal duration in hours.
    #[serde(default)]
    pub duration_hours: Option<Decimal>,
    /// Accounting capability of this type.
    pub category: ShiftCategory,
}

impl ShiftType {
    /// Returns true for night-classified types.
    pub fn is_night(&self) -> bool {
        self.category == ShiftCategory::Night
    }

    /// Returns the fixed duration that overrides clock times, if this type has one.
    pub fn fixed_duration(&self) -> Option<Decimal> {
        if self.category.is_time_derived() {
            return None;
        }
        self.duration_hours.filter(|hours| *hours > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn night() -> ShiftType {
        ShiftType {
            id: 20,
            name: "Night".to_string(),
            code: "N".to_string(),
            start_time: NaiveTime::from_hms_opt(21, 0, 0),
            end_time: NaiveTime::from_hms_opt(6, 0, 0),
            duration_hours: Some(Decimal::from_str("9.0").unwrap()),
            category: ShiftCategory::Night,
        }
    }

    #[test]
    fn test_night_type_has_no_fixed_duration() {
        assert!(night().is_night());
        assert_eq!(night().fixed_duration(), None);
    }

    #[test]
    fn test_standard_type_uses_fixed_duration() {
        let day = ShiftType {
            category: ShiftCategory::Standard,
            ..night()
        };
        assert_eq!(day.fixed_duration(), Some(Decimal::from_str("9.0").unwrap()));
    }

    #[test]
    fn test_absence_does_not_count_toward_premiums() {
        assert!(!ShiftCategory::Absence.counts_toward_premiums());
        assert!(ShiftCategory::Other.counts_toward_premiums());
    }

    #[test]
    fn test_category_deserialization() {
        let yaml = r#"
id: 22
name: Other activity
code: X
category: other
"#;
        let shift_type: ShiftType = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(shift_type.category, ShiftCategory::Other);
        assert_eq!(shift_type.start_time, None);
    }
}
