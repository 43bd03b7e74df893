//! Planned shift and attendance lifecycle operations.
//!
//! These wrap the storage writes of everyday record maintenance with the
//! follow-up work the engine owes them: calendar and conflict checks, night
//! splitting, reconciliation and keeping the `transferred` flag current.

use chrono::NaiveTime;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{resolve_record, validate_no_conflict};
use crate::calendar::CalendarCatalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, ChangeReasonId, PlannedShift};
use crate::repository::{ChangeSet, ShiftRepository};

use super::night_split::{ShiftRecordRef, SplitOutcome, ensure_continuation_day, split_night_shift};
use super::reconcile::{ReconcileOptions, ReconcileOutcome, reconcile};

/// Result of recording an attendance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceReport {
    /// The recorded attendance.
    pub attendance_id: Uuid,
    /// Whether a night attendance was split at midnight.
    pub split: SplitOutcome,
    /// Reconciliation of every linked part, first half first.
    pub reconciled: Vec<ReconcileOutcome>,
}

/// Result of creating or retiming a planned shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanReport {
    /// The planned shift.
    pub shift_id: Uuid,
    /// Whether anything was written.
    pub changed: bool,
    /// Whether a night shift was split at midnight.
    pub split: SplitOutcome,
}

/// Records an attendance and reconciles it against its plan.
///
/// When `fill_defaults` is set, missing clock times are taken from the linked
/// plan and then from the shift type. The linked plan is marked transferred in
/// the same commit as the insert, and loses any missing-attendance flag. Night
/// attendance is then split at midnight and each part that links to a plan is
/// reconciled. The day after a night attendance must be in the calendar too.
///
/// A rejected reconciliation (for example a shrink without a change reason)
/// leaves the attendance recorded but unreconciled; the caller may run
/// [`reconcile`] again with corrected options.
pub fn record_attendance<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    mut attendance: AttendanceRecord,
    options: ReconcileOptions,
) -> EngineResult<AttendanceReport>
where
    S: ShiftRepository + ?Sized,
{
    catalog.ensure(attendance.date)?;
    let mut changes = ChangeSet::new();

    if let Some(plan_id) = attendance.planned_shift_id {
        let mut plan = repo.planned_shift(plan_id)?;
        if plan.hidden {
            return Err(EngineError::RecordNotFound {
                kind: "planned shift",
                id: plan_id.to_string(),
            });
        }
        if options.fill_defaults {
            attendance.start_time = attendance.start_time.or(plan.start_time);
            attendance.end_time = attendance.end_time.or(plan.end_time);
        }
        let cleared = plan.clear_missing_attendance();
        if !plan.transferred || cleared {
            plan.transferred = true;
            changes.update_planned(plan);
        }
    }
    if options.fill_defaults
        && let Some(shift_type) = repo.shift_type_for(attendance.shift_type_id)?
    {
        attendance.start_time = attendance.start_time.or(shift_type.start_time);
        attendance.end_time = attendance.end_time.or(shift_type.end_time);
    }
    resolve_record(&*repo, &attendance)?;
    ensure_continuation_day(&*repo, catalog, &attendance)?;

    let attendance_id = attendance.id;
    let linked = attendance.planned_shift_id.is_some();
    info!(
        employee_id = %attendance.employee_id,
        date = %attendance.date,
        attendance_id = %attendance_id,
        "Recorded attendance"
    );
    changes.insert_attendance(attendance);
    repo.commit(changes)?;

    let split = split_night_shift(repo, catalog, ShiftRecordRef::Attendance(attendance_id))?;

    let mut reconciled = Vec::new();
    if linked {
        reconciled.push(reconcile(repo, attendance_id, options)?);
    }
    if let Some(continuation) = split.continuation()
        && repo.attendance(continuation)?.planned_shift_id.is_some()
    {
        reconciled.push(reconcile(repo, continuation, options)?);
    }

    Ok(AttendanceReport {
        attendance_id,
        split,
        reconciled,
    })
}

/// Deletes an attendance record.
///
/// The originating plan loses its `transferred` flag when no other attendance
/// links to it. Returns true when the flag was reset.
pub fn delete_attendance<S>(repo: &mut S, attendance_id: Uuid) -> EngineResult<bool>
where
    S: ShiftRepository + ?Sized,
{
    let attendance = repo.attendance(attendance_id)?;
    let mut changes = ChangeSet::new();
    changes.delete_attendance(attendance_id);

    let mut reset = false;
    if let Some(plan_id) = attendance.planned_shift_id {
        let others_linked = repo
            .attendance_for_plan(plan_id)?
            .iter()
            .any(|r| r.id != attendance_id);
        let mut plan = repo.planned_shift(plan_id)?;
        if !others_linked && plan.transferred {
            plan.transferred = false;
            changes.update_planned(plan);
            reset = true;
        }
    }

    repo.commit(changes)?;
    info!(
        employee_id = %attendance.employee_id,
        date = %attendance.date,
        attendance_id = %attendance_id,
        transferred_reset = reset,
        "Deleted attendance"
    );
    Ok(reset)
}

/// Creates a planned shift.
///
/// The date must be in the calendar, missing times are filled from the shift
/// type, the interval must resolve and must not conflict with the employee's
/// other visible shifts. Night shifts are split at midnight after the insert,
/// so their following day must be in the calendar as well.
pub fn create_planned_shift<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    mut shift: PlannedShift,
) -> EngineResult<PlanReport>
where
    S: ShiftRepository + ?Sized,
{
    catalog.ensure(shift.date)?;
    if let Some(shift_type) = repo.shift_type_for(shift.shift_type_id)? {
        shift.fill_default_times(shift_type);
    }
    let interval = resolve_record(&*repo, &shift)?;
    ensure_continuation_day(&*repo, catalog, &shift)?;
    validate_no_conflict(
        &*repo,
        catalog,
        &shift.employee_id,
        shift.date,
        &interval,
        Some(shift.id),
    )?;

    let shift_id = shift.id;
    info!(
        employee_id = %shift.employee_id,
        date = %shift.date,
        shift_id = %shift_id,
        "Created planned shift"
    );
    let mut changes = ChangeSet::new();
    changes.insert_planned(shift);
    repo.commit(changes)?;

    let split = split_night_shift(repo, catalog, ShiftRecordRef::Planned(shift_id))?;
    Ok(PlanReport {
        shift_id,
        changed: true,
        split,
    })
}

/// Changes the times of a committed planned shift.
///
/// Requires a change reason; fails with [`EngineError::MissingChangeReason`]
/// otherwise. The new interval is conflict-checked against every other shift
/// of the employee. Setting the current times again writes nothing.
pub fn retime_planned_shift<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    shift_id: Uuid,
    start: NaiveTime,
    end: NaiveTime,
    change_reason: Option<ChangeReasonId>,
) -> EngineResult<PlanReport>
where
    S: ShiftRepository + ?Sized,
{
    let mut shift = repo.planned_shift(shift_id)?;
    if let Some(reason) = change_reason {
        repo.change_reason(reason)?;
    }
    if !shift.retime(start, end, change_reason)? {
        return Ok(PlanReport {
            shift_id,
            changed: false,
            split: SplitOutcome::Unchanged,
        });
    }

    let interval = resolve_record(&*repo, &shift)?;
    ensure_continuation_day(&*repo, catalog, &shift)?;
    if !shift.hidden {
        validate_no_conflict(
            &*repo,
            catalog,
            &shift.employee_id,
            shift.date,
            &interval,
            Some(shift_id),
        )?;
    }

    info!(
        employee_id = %shift.employee_id,
        date = %shift.date,
        shift_id = %shift_id,
        change_reason = ?change_reason,
        "Retimed planned shift"
    );
    let mut changes = ChangeSet::new();
    changes.update_planned(shift);
    repo.commit(changes)?;

    let split = split_night_shift(repo, catalog, ShiftRecordRef::Planned(shift_id))?;
    Ok(PlanReport {
        shift_id,
        changed: true,
        split,
    })
}

/// Soft-deletes a planned shift. Returns false when it was already hidden.
pub fn hide_planned_shift<S>(repo: &mut S, shift_id: Uuid) -> EngineResult<bool>
where
    S: ShiftRepository + ?Sized,
{
    let mut shift = repo.planned_shift(shift_id)?;
    if shift.hidden {
        return Ok(false);
    }
    shift.hide();
    info!(
        employee_id = %shift.employee_id,
        date = %shift.date,
        shift_id = %shift_id,
        "Hid planned shift"
    );
    let mut changes = ChangeSet::new();
    changes.update_planned(shift);
    repo.commit(changes)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::repository::InMemoryRepository;
    use chrono::NaiveDate;

    const DAY: u32 = 3;
    const NIGHT: u32 = 20;
    const FLEXIBLE: u32 = 24;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_time(time_str: &str) -> Option<NaiveTime> {
        Some(NaiveTime::parse_from_str(time_str, "%H:%M").unwrap())
    }

    fn setup() -> (InMemoryRepository, CalendarCatalog) {
        let loader = ConfigLoader::load("./config/worktrack").expect("Failed to load config");
        let catalog = CalendarCatalog::from_config(loader.config()).unwrap();
        (InMemoryRepository::from_config(loader.config()), catalog)
    }

    // ==========================================================================
    // Planned shifts
    // ==========================================================================

    #[test]
    fn test_create_fills_nominal_times() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);

        let report = create_planned_shift(&mut repo, &catalog, shift).unwrap();
        assert_eq!(report.split, SplitOutcome::Unchanged);

        let stored = repo.planned_shift(report.shift_id).unwrap();
        assert_eq!(stored.start_time, make_time("08:00"));
        assert_eq!(stored.end_time, make_time("16:00"));
    }

    #[test]
    fn test_create_night_shift_splits_it() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(NIGHT), None, None);

        let report = create_planned_shift(&mut repo, &catalog, shift).unwrap();
        let continuation = report.split.continuation().unwrap();
        assert_eq!(repo.planned_shift(report.shift_id).unwrap().end_time, make_time("00:00"));
        assert_eq!(repo.planned_shift(continuation).unwrap().end_time, make_time("06:00"));
    }

    #[test]
    fn test_create_rejects_conflict_and_missing_day() {
        let (mut repo, catalog) = setup();
        let first = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(FLEXIBLE), make_time("08:00"), make_time("16:00"));
        create_planned_shift(&mut repo, &catalog, first).unwrap();

        let overlapping = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(FLEXIBLE), make_time("12:00"), make_time("18:00"));
        assert!(matches!(
            create_planned_shift(&mut repo, &catalog, overlapping),
            Err(EngineError::ScheduleConflict { .. })
        ));

        let outside = PlannedShift::new("emp_001", make_date("2040-06-10"), Some(DAY), None, None);
        assert!(matches!(
            create_planned_shift(&mut repo, &catalog, outside),
            Err(EngineError::MissingCalendarDay { .. })
        ));
        assert_eq!(repo.planned_count(), 1);
    }

    #[test]
    fn test_retime_requires_reason() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        let id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;

        let result = retime_planned_shift(
            &mut repo,
            &catalog,
            id,
            make_time("09:00").unwrap(),
            make_time("17:00").unwrap(),
            None,
        );
        assert!(matches!(result, Err(EngineError::MissingChangeReason { .. })));

        let report = retime_planned_shift(
            &mut repo,
            &catalog,
            id,
            make_time("09:00").unwrap(),
            make_time("17:00").unwrap(),
            Some(2),
        )
        .unwrap();
        assert!(report.changed);
        let stored = repo.planned_shift(id).unwrap();
        assert!(stored.is_changed);
        assert_eq!(stored.change_reason_id, Some(2));
    }

    #[test]
    fn test_retime_to_same_times_is_noop() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        let id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;

        let report = retime_planned_shift(
            &mut repo,
            &catalog,
            id,
            make_time("08:00").unwrap(),
            make_time("16:00").unwrap(),
            None,
        )
        .unwrap();
        assert!(!report.changed);
    }

    #[test]
    fn test_hide_is_soft_delete() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        let id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;

        assert!(hide_planned_shift(&mut repo, id).unwrap());
        assert!(!hide_planned_shift(&mut repo, id).unwrap());
        assert!(repo.planned_shift(id).unwrap().hidden);

        // The slot is free again for a new plan.
        let replacement = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        assert!(create_planned_shift(&mut repo, &catalog, replacement).is_ok());
    }

    // ==========================================================================
    // Attendance
    // ==========================================================================

    #[test]
    fn test_record_attendance_derived_from_plan() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        let plan_id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;

        let attendance = AttendanceRecord::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None)
            .linked_to(plan_id);
        let report =
            record_attendance(&mut repo, &catalog, attendance, ReconcileOptions::default()).unwrap();

        assert_eq!(report.reconciled.len(), 1);
        assert!(report.reconciled[0].is_noop());
        let stored = repo.attendance(report.attendance_id).unwrap();
        assert_eq!(stored.start_time, make_time("08:00"));
        assert!(repo.planned_shift(plan_id).unwrap().transferred);
    }

    #[test]
    fn test_record_night_attendance_splits_and_reconciles_both_halves() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(NIGHT), None, None);
        let plan = create_planned_shift(&mut repo, &catalog, shift).unwrap();
        let plan_continuation = plan.split.continuation().unwrap();

        // Arrived 15 minutes early and stayed 30 minutes longer.
        let attendance = AttendanceRecord::new(
            "emp_001",
            make_date("2025-06-10"),
            Some(NIGHT),
            make_time("20:45"),
            make_time("06:30"),
        )
        .linked_to(plan.shift_id);
        let report =
            record_attendance(&mut repo, &catalog, attendance, ReconcileOptions::with_reason(4))
                .unwrap();

        assert_eq!(report.reconciled.len(), 2);
        assert_eq!(report.reconciled[0].created[0].start, make_time("20:45").unwrap());
        assert_eq!(report.reconciled[1].created[0].date, make_date("2025-06-11"));
        assert_eq!(report.reconciled[1].created[0].start, make_time("06:00").unwrap());
        assert_eq!(report.reconciled[1].created[0].end, make_time("06:30").unwrap());

        let second = repo.attendance(report.split.continuation().unwrap()).unwrap();
        assert_eq!(second.planned_shift_id, Some(plan_continuation));
        assert_eq!(second.end_time, make_time("06:00"));
    }

    #[test]
    fn test_delete_attendance_resets_transferred() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        let plan_id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;
        let plan = repo.planned_shift(plan_id).unwrap();

        let first = AttendanceRecord::from_plan(&plan);
        let first_id = first.id;
        record_attendance(&mut repo, &catalog, first, ReconcileOptions::default()).unwrap();

        // A second record on the same plan, e.g. a split-up working day.
        let mut second = AttendanceRecord::from_plan(&plan);
        second.start_time = make_time("10:00");
        second.end_time = make_time("12:00");
        let second_id = second.id;
        let mut changes = ChangeSet::new();
        changes.insert_attendance(second);
        repo.commit(changes).unwrap();

        assert!(!delete_attendance(&mut repo, first_id).unwrap());
        assert!(repo.planned_shift(plan_id).unwrap().transferred);

        assert!(delete_attendance(&mut repo, second_id).unwrap());
        assert!(!repo.planned_shift(plan_id).unwrap().transferred);
    }

    #[test]
    fn test_record_attendance_on_split_plan_covers_both_days() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(NIGHT), None, None);
        let plan = create_planned_shift(&mut repo, &catalog, shift).unwrap();
        let plan_continuation = plan.split.continuation().unwrap();
        let first_half = repo.planned_shift(plan.shift_id).unwrap();

        let report = record_attendance(
            &mut repo,
            &catalog,
            AttendanceRecord::from_plan(&first_half),
            ReconcileOptions::default(),
        )
        .unwrap();

        let second_id = report.split.continuation().unwrap();
        let second = repo.attendance(second_id).unwrap();
        assert_eq!(second.date, make_date("2025-06-11"));
        assert_eq!(second.start_time, make_time("00:00"));
        assert_eq!(second.end_time, make_time("06:00"));
        assert_eq!(second.planned_shift_id, Some(plan_continuation));
        assert!(repo.planned_shift(plan_continuation).unwrap().transferred);
        assert_eq!(report.reconciled.len(), 2);
        assert!(report.reconciled.iter().all(|outcome| outcome.is_noop()));
    }

    #[test]
    fn test_record_attendance_clears_missing_attendance_flag() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-02"), Some(DAY), None, None);
        let plan_id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;
        let flagged = crate::reconciliation::flag_missing_attendance(
            &mut repo,
            "emp_001",
            make_date("2025-06-01"),
            make_date("2025-06-30"),
            make_date("2025-06-15"),
        )
        .unwrap();
        assert_eq!(flagged, vec![plan_id]);

        let plan = repo.planned_shift(plan_id).unwrap();
        record_attendance(
            &mut repo,
            &catalog,
            AttendanceRecord::from_plan(&plan),
            ReconcileOptions::default(),
        )
        .unwrap();

        let plan = repo.planned_shift(plan_id).unwrap();
        assert!(!plan.is_changed);
        assert!(!plan.note.contains("Missing attendance"));
        assert!(plan.transferred);
    }

    #[test]
    fn test_night_attendance_on_last_calendar_day_is_not_recorded() {
        let (mut repo, catalog) = setup();
        // The shipped catalog ends on 2035-12-31.
        let attendance = AttendanceRecord::new(
            "emp_001",
            make_date("2035-12-31"),
            Some(NIGHT),
            make_time("21:00"),
            make_time("06:00"),
        );

        let result = record_attendance(&mut repo, &catalog, attendance, ReconcileOptions::default());
        assert_eq!(
            result,
            Err(EngineError::MissingCalendarDay {
                date: make_date("2036-01-01")
            })
        );
        assert_eq!(repo.attendance_count(), 0);

        let shift = PlannedShift::new("emp_001", make_date("2035-12-31"), Some(NIGHT), None, None);
        assert!(matches!(
            create_planned_shift(&mut repo, &catalog, shift),
            Err(EngineError::MissingCalendarDay { .. })
        ));
        assert_eq!(repo.planned_count(), 0);
    }

    #[test]
    fn test_record_attendance_for_hidden_plan_fails() {
        let (mut repo, catalog) = setup();
        let shift = PlannedShift::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None);
        let plan_id = create_planned_shift(&mut repo, &catalog, shift).unwrap().shift_id;
        hide_planned_shift(&mut repo, plan_id).unwrap();

        let attendance = AttendanceRecord::new("emp_001", make_date("2025-06-10"), Some(DAY), None, None)
            .linked_to(plan_id);
        assert!(matches!(
            record_attendance(&mut repo, &catalog, attendance, ReconcileOptions::default()),
            Err(EngineError::RecordNotFound { .. })
        ));
        assert_eq!(repo.attendance_count(), 0);
    }
}
