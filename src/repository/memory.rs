//! In-memory repository.
//!
//! Holds reference data and shift records in hash maps, with a per-employee,
//! per-day index. Commits are applied to a staged copy of the record tables and
//! swapped in only when every change succeeded and the records it touched still
//! satisfy the unique constraints.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, ChangeReason, ChangeReasonId, Employee, PlannedShift, ShiftType,
};

use super::{ChangeSet, RecordChange, ShiftRepository};

type DayKey = (String, NaiveDate);

#[derive(Debug, Clone, Default)]
struct Tables {
    planned: HashMap<Uuid, PlannedShift>,
    attendance: HashMap<Uuid, AttendanceRecord>,
    planned_by_day: HashMap<DayKey, Vec<Uuid>>,
    attendance_by_day: HashMap<DayKey, Vec<Uuid>>,
}

impl Tables {
    fn put_planned(&mut self, shift: PlannedShift) {
        if let Some(old) = self.planned.get(&shift.id) {
            unindex(&mut self.planned_by_day, &old.employee_id, old.date, shift.id);
        }
        self.planned_by_day
            .entry((shift.employee_id.clone(), shift.date))
            .or_default()
            .push(shift.id);
        self.planned.insert(shift.id, shift);
    }

    fn put_attendance(&mut self, record: AttendanceRecord) {
        if let Some(old) = self.attendance.get(&record.id) {
            unindex(&mut self.attendance_by_day, &old.employee_id, old.date, record.id);
        }
        self.attendance_by_day
            .entry((record.employee_id.clone(), record.date))
            .or_default()
            .push(record.id);
        self.attendance.insert(record.id, record);
    }

    fn remove_attendance(&mut self, id: Uuid) -> Option<AttendanceRecord> {
        let record = self.attendance.remove(&id)?;
        unindex(&mut self.attendance_by_day, &record.employee_id, record.date, id);
        Some(record)
    }

    fn planned_on<'a>(
        &'a self,
        employee_id: &str,
        date: NaiveDate,
    ) -> impl Iterator<Item = &'a PlannedShift> {
        self.planned_by_day
            .get(&(employee_id.to_string(), date))
            .into_iter()
            .flatten()
            .filter_map(|id| self.planned.get(id))
    }

    fn attendance_on<'a>(
        &'a self,
        employee_id: &str,
        date: NaiveDate,
    ) -> impl Iterator<Item = &'a AttendanceRecord> {
        self.attendance_by_day
            .get(&(employee_id.to_string(), date))
            .into_iter()
            .flatten()
            .filter_map(|id| self.attendance.get(id))
    }
}

fn unindex(index: &mut HashMap<DayKey, Vec<Uuid>>, employee_id: &str, date: NaiveDate, id: Uuid) {
    let key = (employee_id.to_string(), date);
    if let Some(ids) = index.get_mut(&key) {
        ids.retain(|existing| *existing != id);
        if ids.is_empty() {
            index.remove(&key);
        }
    }
}

/// A repository backed by in-process hash maps.
///
/// Enforces the storage unique constraint on (employee, date, start, end)
/// separately for visible planned shifts and for attendance records.
///
/// # Example
///
/// ```
/// use worktrack_engine::config::ConfigLoader;
/// use worktrack_engine::models::Employee;
/// use worktrack_engine::repository::{InMemoryRepository, ShiftRepository};
///
/// let loader = ConfigLoader::load("./config/worktrack").unwrap();
/// let mut repo = InMemoryRepository::from_config(loader.config());
/// repo.add_employee(Employee::new("emp_001", "Jana Novakova"));
///
/// assert!(repo.employee("emp_001").is_ok());
/// assert!(repo.other_activity_type().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    shift_types: Vec<ShiftType>,
    change_reasons: Vec<ChangeReason>,
    employees: HashMap<String, Employee>,
    tables: Tables,
}

impl InMemoryRepository {
    /// Creates an empty repository with the given reference data.
    pub fn new(shift_types: Vec<ShiftType>, change_reasons: Vec<ChangeReason>) -> Self {
        Self {
            shift_types,
            change_reasons,
            ..Self::default()
        }
    }

    /// Creates an empty repository with the configured reference data.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.shift_types().to_vec(),
            config.change_reasons().to_vec(),
        )
    }

    /// Registers or replaces an employee.
    pub fn add_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.id.clone(), employee);
    }

    /// Number of stored planned shifts, hidden ones included.
    pub fn planned_count(&self) -> usize {
        self.tables.planned.len()
    }

    /// Number of stored attendance records.
    pub fn attendance_count(&self) -> usize {
        self.tables.attendance.len()
    }

    fn apply(tables: &mut Tables, change: RecordChange) -> EngineResult<()> {
        match change {
            RecordChange::InsertPlanned(shift) => {
                if tables.planned.contains_key(&shift.id) {
                    return Err(Self::duplicate_planned(&shift));
                }
                tables.put_planned(shift);
            }
            RecordChange::UpdatePlanned(shift) => {
                if !tables.planned.contains_key(&shift.id) {
                    return Err(EngineError::RecordNotFound {
                        kind: "planned shift",
                        id: shift.id.to_string(),
                    });
                }
                tables.put_planned(shift);
            }
            RecordChange::InsertAttendance(record) => {
                if tables.attendance.contains_key(&record.id) {
                    return Err(Self::duplicate_attendance(&record));
                }
                tables.put_attendance(record);
            }
            RecordChange::UpdateAttendance(record) => {
                if !tables.attendance.contains_key(&record.id) {
                    return Err(EngineError::RecordNotFound {
                        kind: "attendance",
                        id: record.id.to_string(),
                    });
                }
                tables.put_attendance(record);
            }
            RecordChange::DeleteAttendance(id) => {
                tables
                    .remove_attendance(id)
                    .ok_or_else(|| EngineError::RecordNotFound {
                        kind: "attendance",
                        id: id.to_string(),
                    })?;
            }
        }
        Ok(())
    }

    /// Checks the unique constraints for the records a commit wrote.
    fn check_unique(tables: &Tables, planned: &[Uuid], attendance: &[Uuid]) -> EngineResult<()> {
        let touched_planned = planned
            .iter()
            .filter_map(|id| tables.planned.get(id))
            .filter(|s| !s.hidden);
        for shift in touched_planned {
            let clash = tables.planned_on(&shift.employee_id, shift.date).any(|other| {
                other.id != shift.id
                    && !other.hidden
                    && other.start_time == shift.start_time
                    && other.end_time == shift.end_time
            });
            if clash {
                return Err(Self::duplicate_planned(shift));
            }
        }

        for record in attendance.iter().filter_map(|id| tables.attendance.get(id)) {
            let clash = tables.attendance_on(&record.employee_id, record.date).any(|other| {
                other.id != record.id
                    && other.start_time == record.start_time
                    && other.end_time == record.end_time
            });
            if clash {
                return Err(Self::duplicate_attendance(record));
            }
        }
        Ok(())
    }

    fn duplicate_planned(shift: &PlannedShift) -> EngineError {
        EngineError::DuplicateRecord {
            kind: "planned shift",
            employee_id: shift.employee_id.clone(),
            date: shift.date,
            start: shift.start_time,
            end: shift.end_time,
        }
    }

    fn duplicate_attendance(record: &AttendanceRecord) -> EngineError {
        EngineError::DuplicateRecord {
            kind: "attendance",
            employee_id: record.employee_id.clone(),
            date: record.date,
            start: record.start_time,
            end: record.end_time,
        }
    }
}

fn sort_key(date: NaiveDate, start: Option<NaiveTime>) -> (NaiveDate, Option<NaiveTime>) {
    (date, start)
}

impl ShiftRepository for InMemoryRepository {
    fn shift_types(&self) -> &[ShiftType] {
        &self.shift_types
    }

    fn change_reason(&self, id: ChangeReasonId) -> EngineResult<&ChangeReason> {
        self.change_reasons
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "change reason",
                id: id.to_string(),
            })
    }

    fn employee(&self, id: &str) -> EngineResult<&Employee> {
        self.employees
            .get(id)
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "employee",
                id: id.to_string(),
            })
    }

    fn planned_shift(&self, id: Uuid) -> EngineResult<PlannedShift> {
        self.tables
            .planned
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "planned shift",
                id: id.to_string(),
            })
    }

    fn attendance(&self, id: Uuid) -> EngineResult<AttendanceRecord> {
        self.tables
            .attendance
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::RecordNotFound {
                kind: "attendance",
                id: id.to_string(),
            })
    }

    fn planned_shifts_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<PlannedShift>> {
        let mut shifts: Vec<PlannedShift> = self
            .tables
            .planned
            .values()
            .filter(|s| s.employee_id == employee_id && s.date >= from && s.date <= to)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| sort_key(s.date, s.start_time));
        Ok(shifts)
    }

    fn attendance_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .tables
            .attendance
            .values()
            .filter(|r| r.employee_id == employee_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        records.sort_by_key(|r| sort_key(r.date, r.start_time));
        Ok(records)
    }

    fn attendance_for_plan(&self, plan_id: Uuid) -> EngineResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .tables
            .attendance
            .values()
            .filter(|r| r.planned_shift_id == Some(plan_id))
            .cloned()
            .collect();
        records.sort_by_key(|r| sort_key(r.date, r.start_time));
        Ok(records)
    }

    fn first_shift_date(&self, employee_id: &str) -> EngineResult<Option<NaiveDate>> {
        Ok(self
            .tables
            .planned
            .values()
            .filter(|s| s.employee_id == employee_id && !s.hidden)
            .map(|s| s.date)
            .min())
    }

    fn commit(&mut self, changes: ChangeSet) -> EngineResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let count = changes.len();
        let mut staged = self.tables.clone();
        let mut planned = Vec::new();
        let mut attendance = Vec::new();
        for change in changes {
            match &change {
                RecordChange::InsertPlanned(shift) | RecordChange::UpdatePlanned(shift) => {
                    planned.push(shift.id)
                }
                RecordChange::InsertAttendance(record) | RecordChange::UpdateAttendance(record) => {
                    attendance.push(record.id)
                }
                RecordChange::DeleteAttendance(_) => {}
            }
            Self::apply(&mut staged, change)?;
        }
        Self::check_unique(&staged, &planned, &attendance)?;
        self.tables = staged;
        debug!(changes = count, "Committed change set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M").unwrap()
    }

    fn make_plan(date: &str, start: &str, end: &str) -> PlannedShift {
        PlannedShift::new(
            "emp_001",
            make_date(date),
            Some(3),
            Some(make_time(start)),
            Some(make_time(end)),
        )
    }

    #[test]
    fn test_commit_applies_all_changes() {
        let mut repo = InMemoryRepository::default();
        let plan = make_plan("2025-06-10", "08:00", "16:00");
        let attendance = AttendanceRecord::from_plan(&plan);

        let mut changes = ChangeSet::new();
        changes.insert_planned(plan.clone());
        changes.insert_attendance(attendance.clone());
        repo.commit(changes).unwrap();

        assert_eq!(repo.planned_shift(plan.id).unwrap(), plan);
        assert_eq!(repo.attendance_for_plan(plan.id).unwrap(), vec![attendance]);
    }

    #[test]
    fn test_failed_commit_leaves_repository_untouched() {
        let mut repo = InMemoryRepository::default();
        let plan = make_plan("2025-06-10", "08:00", "16:00");

        let mut changes = ChangeSet::new();
        changes.insert_planned(plan.clone());
        // Update of a record that does not exist fails the whole set.
        changes.update_attendance(AttendanceRecord::from_plan(&plan));

        assert!(matches!(
            repo.commit(changes),
            Err(EngineError::RecordNotFound { kind: "attendance", .. })
        ));
        assert_eq!(repo.planned_count(), 0);
    }

    #[test]
    fn test_unique_constraint_on_employee_date_and_times() {
        let mut repo = InMemoryRepository::default();
        let mut changes = ChangeSet::new();
        changes.insert_planned(make_plan("2025-06-10", "08:00", "16:00"));
        repo.commit(changes).unwrap();

        let mut changes = ChangeSet::new();
        changes.insert_planned(make_plan("2025-06-10", "08:00", "16:00"));
        match repo.commit(changes) {
            Err(EngineError::DuplicateRecord { kind, date, .. }) => {
                assert_eq!(kind, "planned shift");
                assert_eq!(date, make_date("2025-06-10"));
            }
            other => panic!("Expected DuplicateRecord, got {:?}", other),
        }
        assert_eq!(repo.planned_count(), 1);
    }

    #[test]
    fn test_hidden_shift_does_not_block_identical_plan() {
        let mut repo = InMemoryRepository::default();
        let mut hidden = make_plan("2025-06-10", "08:00", "16:00");
        hidden.hide();

        let mut changes = ChangeSet::new();
        changes.insert_planned(hidden);
        changes.insert_planned(make_plan("2025-06-10", "08:00", "16:00"));
        assert!(repo.commit(changes).is_ok());
        assert_eq!(repo.planned_count(), 2);
    }

    #[test]
    fn test_unique_check_only_covers_written_records() {
        let mut repo = InMemoryRepository::default();
        let existing = make_plan("2025-06-10", "08:00", "16:00");
        let existing_id = existing.id;
        let mut changes = ChangeSet::new();
        changes.insert_planned(existing);
        repo.commit(changes).unwrap();

        // A duplicate that predates the constraint.
        repo.tables.put_planned(make_plan("2025-06-10", "08:00", "16:00"));

        let mut changes = ChangeSet::new();
        changes.insert_planned(make_plan("2025-06-11", "08:00", "16:00"));
        assert!(repo.commit(changes).is_ok());
        assert_eq!(repo.planned_count(), 3);

        let mut touched = repo.planned_shift(existing_id).unwrap();
        touched.note = "reviewed".to_string();
        let mut changes = ChangeSet::new();
        changes.update_planned(touched);
        assert!(matches!(
            repo.commit(changes),
            Err(EngineError::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn test_update_moving_record_reindexes_it() {
        let mut repo = InMemoryRepository::default();
        let plan = make_plan("2025-06-10", "08:00", "16:00");
        let mut moved = plan.clone();
        let mut changes = ChangeSet::new();
        changes.insert_planned(plan);
        repo.commit(changes).unwrap();

        moved.date = make_date("2025-06-11");
        let mut changes = ChangeSet::new();
        changes.update_planned(moved);
        repo.commit(changes).unwrap();

        // The old day is free again.
        let mut changes = ChangeSet::new();
        changes.insert_planned(make_plan("2025-06-10", "08:00", "16:00"));
        assert!(repo.commit(changes).is_ok());

        let mut changes = ChangeSet::new();
        changes.insert_planned(make_plan("2025-06-11", "08:00", "16:00"));
        assert!(matches!(
            repo.commit(changes),
            Err(EngineError::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn test_range_query_is_inclusive_and_sorted() {
        let mut repo = InMemoryRepository::default();
        let mut changes = ChangeSet::new();
        changes.insert_planned(make_plan("2025-06-12", "08:00", "16:00"));
        changes.insert_planned(make_plan("2025-06-10", "14:00", "18:00"));
        changes.insert_planned(make_plan("2025-06-10", "06:00", "10:00"));
        changes.insert_planned(make_plan("2025-06-13", "08:00", "16:00"));
        repo.commit(changes).unwrap();

        let shifts = repo
            .planned_shifts_in_range("emp_001", make_date("2025-06-10"), make_date("2025-06-12"))
            .unwrap();
        let starts: Vec<(NaiveDate, Option<NaiveTime>)> =
            shifts.iter().map(|s| (s.date, s.start_time)).collect();
        assert_eq!(
            starts,
            vec![
                (make_date("2025-06-10"), Some(make_time("06:00"))),
                (make_date("2025-06-10"), Some(make_time("14:00"))),
                (make_date("2025-06-12"), Some(make_time("08:00"))),
            ]
        );
    }

    #[test]
    fn test_first_shift_date_ignores_hidden() {
        let mut repo = InMemoryRepository::default();
        let mut early = make_plan("2025-01-05", "08:00", "16:00");
        early.hide();

        let mut changes = ChangeSet::new();
        changes.insert_planned(early);
        changes.insert_planned(make_plan("2025-03-03", "08:00", "16:00"));
        repo.commit(changes).unwrap();

        assert_eq!(
            repo.first_shift_date("emp_001").unwrap(),
            Some(make_date("2025-03-03"))
        );
        assert_eq!(repo.first_shift_date("emp_002").unwrap(), None);
    }

    #[test]
    fn test_unknown_employee_is_not_found() {
        let repo = InMemoryRepository::default();
        assert!(matches!(
            repo.employee("nobody"),
            Err(EngineError::RecordNotFound { kind: "employee", .. })
        ));
    }
}
