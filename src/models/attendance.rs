//! Attendance record model.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PlannedShift, ShiftTypeId, TimedRecord};

/// The actual clock times an employee reported for a date.
///
/// An attendance record links forward to the planned shift it fulfils. Carve-outs
/// created by the reconciler link to their own freshly created planned shift,
/// never back to the record that spawned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The reporting employee.
    pub employee_id: String,
    /// The date the attendance starts on.
    pub date: NaiveDate,
    /// The shift type, if any.
    pub shift_type_id: Option<ShiftTypeId>,
    /// Reported start time.
    pub start_time: Option<NaiveTime>,
    /// Reported end time.
    pub end_time: Option<NaiveTime>,
    /// The planned shift this attendance fulfils.
    #[serde(default)]
    pub planned_shift_id: Option<Uuid>,
    /// The planned shift this attendance was exchanged with.
    #[serde(default)]
    pub exchanged_with_id: Option<Uuid>,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
}

impl AttendanceRecord {
    /// Creates a new attendance record with a fresh id.
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
            planned_shift_id: None,
            exchanged_with_id: None,
            note: String::new(),
        }
    }

    /// Derives an attendance record from a planned shift, copying its times.
    ///
    /// # Example
    ///
    /// ```
    /// use worktrack_engine::models::{AttendanceRecord, PlannedShift};
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let plan = PlannedShift::new(
    ///     "emp_001",
    ///     NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
    ///     Some(3),
    ///     NaiveTime::from_hms_opt(8, 0, 0),
    ///     NaiveTime::from_hms_opt(16, 0, 0),
    /// );
    /// let attendance = AttendanceRecord::from_plan(&plan);
    /// assert_eq!(attendance.planned_shift_id, Some(plan.id));
    /// assert_eq!(attendance.start_time, plan.start_time);
    /// ```
    pub fn from_plan(plan: &PlannedShift) -> Self {
        let mut record = Self::new(
            plan.employee_id.clone(),
            plan.date,
            plan.shift_type_id,
            plan.start_time,
            plan.end_time,
        );
        record.planned_shift_id = Some(plan.id);
        record.note = if plan.note.is_empty() {
            "Attendance derived from planned shift".to_string()
        } else {
            plan.note.clone()
        };
        record
    }

    /// Links the record to its originating planned shift.
    pub fn linked_to(mut self, plan_id: Uuid) -> Self {
        self.planned_shift_id = Some(plan_id);
        self
    }
}

impl TimedRecord for AttendanceRecord {
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
