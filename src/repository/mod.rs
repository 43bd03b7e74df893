//! Repository interface the engine reads and writes records through.
//!
//! The engine never talks to a storage technology directly. Lookups go through
//! [`ShiftRepository`], and every mutation of one engine operation is collected
//! into a single [`ChangeSet`] that the repository applies atomically: either
//! every change becomes visible or none does.

mod memory;

pub use memory::InMemoryRepository;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, ChangeReason, ChangeReasonId, Employee, PlannedShift, ShiftCategory,
    ShiftType, ShiftTypeId,
};

/// A single record mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    /// Insert a new planned shift.
    InsertPlanned(PlannedShift),
    /// Replace an existing planned shift with the same id.
    UpdatePlanned(PlannedShift),
    /// Insert a new attendance record.
    InsertAttendance(AttendanceRecord),
    /// Replace an existing attendance record with the same id.
    UpdateAttendance(AttendanceRecord),
    /// Delete an attendance record.
    DeleteAttendance(Uuid),
}

/// An ordered batch of record mutations committed as one unit.
///
/// # Example
///
/// ```
/// use worktrack_engine::repository::ChangeSet;
/// use worktrack_engine::models::PlannedShift;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let mut changes = ChangeSet::new();
/// assert!(changes.is_empty());
///
/// changes.insert_planned(PlannedShift::new(
///     "emp_001",
///     NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
///     Some(3),
///     NaiveTime::from_hms_opt(8, 0, 0),
///     NaiveTime::from_hms_opt(16, 0, 0),
/// ));
/// assert_eq!(changes.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<RecordChange>,
}

impl ChangeSet {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change.
    pub fn push(&mut self, change: RecordChange) {
        self.changes.push(change);
    }

    /// Appends a planned shift insert.
    pub fn insert_planned(&mut self, shift: PlannedShift) {
        self.push(RecordChange::InsertPlanned(shift));
    }

    /// Appends a planned shift update.
    pub fn update_planned(&mut self, shift: PlannedShift) {
        self.push(RecordChange::UpdatePlanned(shift));
    }

    /// Appends an attendance insert.
    pub fn insert_attendance(&mut self, record: AttendanceRecord) {
        self.push(RecordChange::InsertAttendance(record));
    }

    /// Appends an attendance update.
    pub fn update_attendance(&mut self, record: AttendanceRecord) {
        self.push(RecordChange::UpdateAttendance(record));
    }

    /// Appends an attendance deletion.
    pub fn delete_attendance(&mut self, id: Uuid) {
        self.push(RecordChange::DeleteAttendance(id));
    }

    /// Returns true when there is nothing to commit.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes in the set.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterates over the changes in order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordChange> {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = RecordChange;
    type IntoIter = std::vec::IntoIter<RecordChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Read and write access to reference data and shift records.
///
/// Range queries are inclusive on both dates and return hidden planned shifts
/// too; callers decide whether soft-deleted records matter to them.
pub trait ShiftRepository {
    /// All shift types.
    fn shift_types(&self) -> &[ShiftType];

    /// Looks up a change reason.
    fn change_reason(&self, id: ChangeReasonId) -> EngineResult<&ChangeReason>;

    /// Looks up an employee.
    fn employee(&self, id: &str) -> EngineResult<&Employee>;

    /// Looks up a planned shift.
    fn planned_shift(&self, id: Uuid) -> EngineResult<PlannedShift>;

    /// Looks up an attendance record.
    fn attendance(&self, id: Uuid) -> EngineResult<AttendanceRecord>;

    /// Planned shifts of an employee dated within `from..=to`, ordered by date and start.
    fn planned_shifts_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<PlannedShift>>;

    /// Attendance records of an employee dated within `from..=to`, ordered by date and start.
    fn attendance_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// Attendance records linked to a planned shift.
    fn attendance_for_plan(&self, plan_id: Uuid) -> EngineResult<Vec<AttendanceRecord>>;

    /// Date of the employee's earliest non-hidden planned shift.
    fn first_shift_date(&self, employee_id: &str) -> EngineResult<Option<NaiveDate>>;

    /// Applies every change of the set, or none of them.
    fn commit(&mut self, changes: ChangeSet) -> EngineResult<()>;

    /// Looks up a shift type.
    fn shift_type(&self, id: ShiftTypeId) -> EngineResult<&ShiftType> {
        self.shift_types()
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "shift type",
                id: id.to_string(),
            })
    }

    /// Looks up an optional shift type reference.
    fn shift_type_for(&self, id: Option<ShiftTypeId>) -> EngineResult<Option<&ShiftType>> {
        id.map(|id| self.shift_type(id)).transpose()
    }

    /// The single "other activity" type every carve-out is tagged with.
    fn other_activity_type(&self) -> EngineResult<&ShiftType> {
        self.shift_types()
            .iter()
            .find(|t| t.category == ShiftCategory::Other)
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "shift type",
                id: "other".to_string(),
            })
    }
}
