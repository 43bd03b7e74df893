//! Plan versus actual reconciliation.
//!
//! The committed planned shift is the source of truth for fund-neutral hours.
//! Time an employee worked outside it becomes a separate "other activity"
//! planned shift and attendance pair; time missing from it shrinks the plan,
//! which requires a change reason.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::resolve_interval;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, ChangeReasonId, PlannedShift, ShiftTypeId, describe_times,
};
use crate::repository::{ChangeSet, ShiftRepository};

/// Note added to carve-outs created without a change reason.
pub const REASON_REQUIRED_NOTE: &str = "Change reason required";

/// Options for a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Justification attached to carve-outs and plan shrinks.
    pub change_reason: Option<ChangeReasonId>,
    /// Fill missing clock times from the planned shift and shift type. Bulk
    /// passes that must keep the stored times exactly as they are turn this off.
    pub fill_defaults: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            change_reason: None,
            fill_defaults: true,
        }
    }
}

impl ReconcileOptions {
    /// Options carrying a change reason.
    pub fn with_reason(change_reason: ChangeReasonId) -> Self {
        Self {
            change_reason: Some(change_reason),
            ..Self::default()
        }
    }
}

/// A synthetic planned shift and attendance pair covering work outside the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarveOut {
    /// The synthetic planned shift.
    pub planned_shift_id: Uuid,
    /// The synthetic attendance record, linked to the planned shift.
    pub attendance_id: Uuid,
    /// The date of the pair.
    pub date: NaiveDate,
    /// Start of the carved-out time.
    pub start: NaiveTime,
    /// End of the carved-out time.
    pub end: NaiveTime,
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Carve-outs created in this pass.
    pub created: Vec<CarveOut>,
    /// Whether the primary attendance was clamped to the plan.
    pub primary_clamped: bool,
    /// Whether the planned shift was shrunk to the attendance.
    pub plan_shrunk: bool,
}

impl ReconcileOutcome {
    /// Returns true when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && !self.primary_clamped && !self.plan_shrunk
    }
}

/// Reconciles an attendance record against its originating planned shift.
///
/// Per boundary:
/// - early arrival or late departure creates an "other activity" carve-out for
///   the time outside the plan and clamps the attendance to the plan;
/// - late arrival or early departure shrinks the plan to the attendance, which
///   fails with [`EngineError::MissingChangeReason`] when no reason is given.
///
/// The plan is marked transferred and loses any missing-attendance flag. Nothing is persisted unless the whole pass
/// succeeds, and a second pass over an unchanged pair is a no-op.
///
/// # Errors
///
/// - [`EngineError::UnlinkedAttendance`] when the attendance has no plan
/// - [`EngineError::MissingChangeReason`] for a shrink without a reason
/// - [`EngineError::InvalidInterval`] when either interval cannot be resolved
///   or the attendance does not overlap the plan at all
pub fn reconcile<S>(
    repo: &mut S,
    attendance_id: Uuid,
    options: ReconcileOptions,
) -> EngineResult<ReconcileOutcome>
where
    S: ShiftRepository + ?Sized,
{
    let mut attendance = repo.attendance(attendance_id)?;
    let plan_id = attendance
        .planned_shift_id
        .ok_or(EngineError::UnlinkedAttendance { attendance_id })?;
    let mut plan = repo.planned_shift(plan_id)?;
    if let Some(reason) = options.change_reason {
        repo.change_reason(reason)?;
    }
    let other_type_id = repo.other_activity_type()?.id;

    let mut plan_dirty = false;
    let mut attendance_dirty = false;

    let plan_type = repo.shift_type_for(plan.shift_type_id)?;
    let attendance_type = repo
        .shift_type_for(attendance.shift_type_id)?
        .or(plan_type);

    if options.fill_defaults {
        let before = (plan.start_time, plan.end_time);
        if let Some(shift_type) = plan_type {
            plan.fill_default_times(shift_type);
        }
        plan_dirty |= before != (plan.start_time, plan.end_time);

        if attendance.start_time.is_none() {
            attendance.start_time = plan.start_time;
            attendance_dirty = true;
        }
        if attendance.end_time.is_none() {
            attendance.end_time = plan.end_time;
            attendance_dirty = true;
        }
    }

    let planned = resolve_interval(plan.date, plan.start_time, plan.end_time, plan_type)?;
    let actual = resolve_interval(
        attendance.date,
        attendance.start_time,
        attendance.end_time,
        attendance_type,
    )?;

    if !actual.overlaps(&planned) {
        return Err(EngineError::InvalidInterval {
            date: attendance.date,
            start: attendance.start_time,
            end: attendance.end_time,
            message: format!(
                "attendance does not overlap its planned shift {}",
                describe_times(plan.start_time, plan.end_time)
            ),
        });
    }

    let mut outcome = ReconcileOutcome::default();
    let mut changes = ChangeSet::new();

    // Shrinks first: a missing reason must reject the pass before anything is staged.
    let shrunk_start = planned.start.max(actual.start);
    let shrunk_end = planned.end.min(actual.end);
    if (shrunk_start, shrunk_end) != (planned.start, planned.end) {
        plan.retime(shrunk_start.time(), shrunk_end.time(), options.change_reason)?;
        plan.append_note("Shrunk to match reported attendance");
        outcome.plan_shrunk = true;
        plan_dirty = true;
        info!(
            employee_id = %plan.employee_id,
            date = %plan.date,
            shift_id = %plan.id,
            "Shrunk planned shift to attendance"
        );
    }

    let mut boundaries: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::new();
    if actual.start < planned.start {
        boundaries.push((actual.start, planned.start));
        attendance.start_time = Some(planned.start.time());
    }
    if actual.end > planned.end {
        boundaries.push((planned.end, actual.end));
        attendance.end_time = Some(planned.end.time());
    }
    if !boundaries.is_empty() {
        outcome.primary_clamped = true;
        attendance_dirty = true;
    }

    let planned_times = describe_times(
        Some(planned.start.time()),
        Some(planned.end.time()),
    );
    for (start, end) in boundaries {
        let date = start.date();
        let (start, end) = (start.time(), end.time());
        match ensure_new_carve_out(&*repo, &attendance.employee_id, date, start, end, other_type_id) {
            Ok(()) => {}
            Err(EngineError::DuplicateSyntheticRecord { .. }) => {
                warn!(
                    employee_id = %attendance.employee_id,
                    date = %date,
                    start = %start,
                    end = %end,
                    "Carve-out already exists, skipping"
                );
                continue;
            }
            Err(err) => return Err(err),
        }

        let (carve_plan, carve_attendance) = carve_out(
            &attendance.employee_id,
            date,
            start,
            end,
            other_type_id,
            options.change_reason,
            &planned_times,
        );
        info!(
            employee_id = %attendance.employee_id,
            date = %date,
            shift_id = %carve_plan.id,
            start = %start,
            end = %end,
            reason_pending = carve_plan.reason_pending,
            "Created carve-out for work outside planned shift"
        );
        outcome.created.push(CarveOut {
            planned_shift_id: carve_plan.id,
            attendance_id: carve_attendance.id,
            date,
            start,
            end,
        });
        changes.insert_planned(carve_plan);
        changes.insert_attendance(carve_attendance);
    }

    if !plan.transferred {
        plan.transferred = true;
        plan_dirty = true;
    }
    plan_dirty |= plan.clear_missing_attendance();

    if plan_dirty {
        changes.update_planned(plan);
    }
    if attendance_dirty {
        changes.update_attendance(attendance);
    }
    repo.commit(changes)?;

    Ok(outcome)
}

/// Fails with [`EngineError::DuplicateSyntheticRecord`] when an identical
/// carve-out is already stored.
fn ensure_new_carve_out<S>(
    repo: &S,
    employee_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    other_type_id: ShiftTypeId,
) -> EngineResult<()>
where
    S: ShiftRepository + ?Sized,
{
    let exists = repo
        .planned_shifts_in_range(employee_id, date, date)?
        .iter()
        .any(|s| {
            !s.hidden
                && s.shift_type_id == Some(other_type_id)
                && s.start_time == Some(start)
                && s.end_time == Some(end)
        });
    if exists {
        return Err(EngineError::DuplicateSyntheticRecord {
            employee_id: employee_id.to_string(),
            date,
            start,
            end,
        });
    }
    Ok(())
}

fn carve_out(
    employee_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    other_type_id: ShiftTypeId,
    change_reason: Option<ChangeReasonId>,
    planned_times: &str,
) -> (PlannedShift, AttendanceRecord) {
    let note = format!("Work outside planned shift {}", planned_times);

    let mut plan = PlannedShift::new(employee_id, date, Some(other_type_id), Some(start), Some(end));
    plan.transferred = true;
    plan.is_changed = true;
    plan.change_reason_id = change_reason;
    plan.reason_pending = change_reason.is_none();
    plan.append_note(&note);
    if plan.reason_pending {
        plan.append_note(REASON_REQUIRED_NOTE);
    }

    let mut attendance =
        AttendanceRecord::new(employee_id, date, Some(other_type_id), Some(start), Some(end))
            .linked_to(plan.id);
    attendance.note = note;

    (plan, attendance)
}
