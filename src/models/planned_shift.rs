//! Planned shift model.
//!
//! A planned shift is the manager-authored schedule entry for an employee and
//! date. The reconciliation engine also creates synthetic planned shifts for
//! carve-outs and night-shift continuations.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{ChangeReasonId, ShiftType, ShiftTypeId, TimedRecord};

/// Prefix of the note left on plans flagged for missing attendance.
pub const MISSING_ATTENDANCE_NOTE: &str = "Missing attendance";

/// A scheduled shift for one employee on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedShift {
    /// Unique identifier.
    pub id: Uuid,
    /// The scheduled employee.
    pub employee_id: String,
    /// The date the shift starts on.
    pub date: NaiveDate,
    /// The shift type, if any.
    pub shift_type_id: Option<ShiftTypeId>,
    /// Resolved start time.
    pub start_time: Option<NaiveTime>,
    /// Resolved end time.
    pub end_time: Option<NaiveTime>,
    /// Free-text note; audit notes are appended here.
    #[serde(default)]
    pub note: String,
    /// Set once any attendance record is linked to this shift.
    #[serde(default)]
    pub transferred: bool,
    /// Set when the shift was altered after it was committed.
    #[serde(default)]
    pub is_changed: bool,
    /// Soft deletion flag; hidden shifts are excluded from all accounting.
    #[serde(default)]
    pub hidden: bool,
    /// Justification for the latest change.
    #[serde(default)]
    pub change_reason_id: Option<ChangeReasonId>,
    /// Set when the change still awaits a justification from a manager.
    #[serde(default)]
    pub reason_pending: bool,
}

impl PlannedShift {
    /// Creates a new, uncommitted planned shift with a fresh id.
    ///
    /// # Example
    ///
    /// ```
    /// use worktrack_engine::models::PlannedShift;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let shift = PlannedShift::new(
    ///     "emp_001",
    ///     NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
    ///     Some(3),
    ///     NaiveTime::from_hms_opt(8, 0, 0),
    ///     NaiveTime::from_hms_opt(16, 0, 0),
    /// );
    /// assert!(!shift.transferred);
    /// assert!(!shift.hidden);
    /// ```
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        shift_type_id: Option<ShiftTypeId>,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            shift_type_id,
            start_time,
            end_time,
            note: String::new(),
            transferred: false,
            is_changed: false,
            hidden: false,
            change_reason_id: None,
            reason_pending: false,
        }
    }

    /// Fills absent start/end times from the shift type's nominal times.
    pub fn fill_default_times(&mut self, shift_type: &ShiftType) {
        if self.start_time.is_none() {
            self.start_time = shift_type.start_time;
        }
        if self.end_time.is_none() {
            self.end_time = shift_type.end_time;
        }
    }

    /// Changes the committed start/end times.
    ///
    /// Altering a committed shift requires a change reason; without one the
    /// mutation fails with [`EngineError::MissingChangeReason`] and the shift
    /// is left untouched. Setting the same times again is a no-op.
    pub fn retime(
        &mut self,
        start_time: NaiveTime,
        end_time: NaiveTime,
        reason: Option<ChangeReasonId>,
    ) -> EngineResult<bool> {
        if self.start_time == Some(start_time) && self.end_time == Some(end_time) {
            return Ok(false);
        }
        let reason = reason.ok_or_else(|| EngineError::MissingChangeReason {
            record_id: self.id,
            message: format!(
                "retime to {}-{} requires a change reason",
                start_time.format("%H:%M"),
                end_time.format("%H:%M")
            ),
        })?;

        self.append_note(&format!(
            "Times changed from {} to {}-{}",
            describe_times(self.start_time, self.end_time),
            start_time.format("%H:%M"),
            end_time.format("%H:%M")
        ));
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self.is_changed = true;
        self.change_reason_id = Some(reason);
        self.reason_pending = false;
        Ok(true)
    }

    /// Appends an audit note, separated from any existing text.
    pub fn append_note(&mut self, text: &str) {
        if self.note.is_empty() {
            self.note = text.to_string();
        } else {
            self.note = format!("{}; {}", self.note, text);
        }
    }

    /// Drops the missing-attendance flag once attendance has been reported.
    ///
    /// Removes every note entry starting with [`MISSING_ATTENDANCE_NOTE`]. The
    /// `is_changed` flag is reset unless a change reason is attached or still
    /// pending. Returns true when anything was removed.
    pub fn clear_missing_attendance(&mut self) -> bool {
        let entries: Vec<&str> = self.note.split("; ").collect();
        let kept: Vec<&str> = entries
            .iter()
            .copied()
            .filter(|entry| !entry.starts_with(MISSING_ATTENDANCE_NOTE))
            .collect();
        if kept.len() == entries.len() {
            return false;
        }
        self.note = kept.join("; ");
        if self.change_reason_id.is_none() && !self.reason_pending {
            self.is_changed = false;
        }
        true
    }

    /// Soft-deletes the shift.
    pub fn hide(&mut self) {
        self.hidden = true;
    }
}

/// Formats a raw time pair as `HH:MM-HH:MM`.
pub(crate) fn describe_times(start: Option<NaiveTime>, end: Option<NaiveTime>) -> String {
    let show = |t: Option<NaiveTime>| {
        t.map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    };
    format!("{}-{}", show(start), show(end))
}

impl TimedRecord for PlannedShift {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn employee_id(&self) -> &str {
        &self.employee_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn shift_type_id(&self) -> Option<ShiftTypeId> {
        self.shift_type_id
    }

    fn start_time(&self) -> Option<NaiveTime> {
        self.start_time
    }

    fn end_time(&self) -> Option<NaiveTime> {
        self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftCategory;

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M").unwrap()
    }

    fn make_shift() -> PlannedShift {
        PlannedShift::new(
            "emp_001",
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            Some(3),
            Some(make_time("08:00")),
            Some(make_time("16:00")),
        )
    }

    #[test]
    fn test_retime_without_reason_fails_and_leaves_shift_untouched() {
        let mut shift = make_shift();
        let before = shift.clone();

        let result = shift.retime(make_time("09:00"), make_time("16:00"), None);

        match result {
            Err(EngineError::MissingChangeReason { record_id, .. }) => {
                assert_eq!(record_id, shift.id);
            }
            other => panic!("Expected MissingChangeReason, got {:?}", other),
        }
        assert_eq!(shift, before);
    }

    #[test]
    fn test_retime_with_reason_marks_changed() {
        let mut shift = make_shift();

        let changed = shift
            .retime(make_time("09:00"), make_time("16:00"), Some(1))
            .unwrap();

        assert!(changed);
        assert!(shift.is_changed);
        assert_eq!(shift.change_reason_id, Some(1));
        assert_eq!(shift.start_time, Some(make_time("09:00")));
        assert_eq!(shift.note, "Times changed from 08:00-16:00 to 09:00-16:00");
    }

    #[test]
    fn test_retime_to_same_times_is_noop() {
        let mut shift = make_shift();
        let changed = shift
            .retime(make_time("08:00"), make_time("16:00"), None)
            .unwrap();
        assert!(!changed);
        assert!(!shift.is_changed);
    }

    #[test]
    fn test_fill_default_times_keeps_explicit_values() {
        let shift_type = ShiftType {
            id: 3,
            name: "Day".to_string(),
            code: "D".to_string(),
            start_time: Some(make_time("08:00")),
            end_time: Some(make_time("16:00")),
            duration_hours: None,
            category: ShiftCategory::Standard,
        };
        let mut shift = make_shift();
        shift.start_time = Some(make_time("10:00"));
        shift.end_time = None;

        shift.fill_default_times(&shift_type);

        assert_eq!(shift.start_time, Some(make_time("10:00")));
        assert_eq!(shift.end_time, Some(make_time("16:00")));
    }

    #[test]
    fn test_clear_missing_attendance_keeps_other_notes() {
        let mut shift = make_shift();
        shift.append_note("Imported from roster");
        shift.append_note("Missing attendance: no attendance reported for planned shift 08:00-16:00");
        shift.is_changed = true;

        assert!(shift.clear_missing_attendance());
        assert_eq!(shift.note, "Imported from roster");
        assert!(!shift.is_changed);
        assert!(!shift.clear_missing_attendance());
    }

    #[test]
    fn test_clear_missing_attendance_keeps_justified_change() {
        let mut shift = make_shift();
        shift.retime(make_time("09:00"), make_time("16:00"), Some(1)).unwrap();
        shift.append_note("Missing attendance: no attendance reported for planned shift 09:00-16:00");

        assert!(shift.clear_missing_attendance());
        assert!(shift.is_changed);
        assert_eq!(shift.note, "Times changed from 08:00-16:00 to 09:00-16:00");
    }

    #[test]
    fn test_append_note_separates_entries() {
        let mut shift = make_shift();
        shift.append_note("first");
        shift.append_note("second");
        assert_eq!(shift.note, "first; second");
    }
}
