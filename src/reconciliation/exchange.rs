//! Taking over a colleague's planned shift.
//!
//! The taker reports attendance for the colleague's shift. The colleague's plan
//! is hidden and the taker receives a replacement plan that still awaits a
//! change reason from a manager.

use tracing::info;
use uuid::Uuid;

use crate::calculation::{resolve_record, validate_no_conflict};
use crate::calendar::CalendarCatalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, PlannedShift};
use crate::repository::{ChangeSet, ShiftRepository};

use super::night_split::{ShiftRecordRef, SplitOutcome, ensure_continuation_day, split_night_shift};
use super::reconcile::REASON_REQUIRED_NOTE;

/// Result of a shift exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeReport {
    /// The taker's attendance.
    pub attendance_id: Uuid,
    /// The replacement plan created for the taker.
    pub planned_shift_id: Uuid,
    /// The colleague's plan, now hidden.
    pub hidden_shift_id: Uuid,
    /// Whether the replacement plan was split at midnight.
    pub plan_split: SplitOutcome,
    /// Whether the attendance was split at midnight.
    pub attendance_split: SplitOutcome,
}

/// Exchanges a colleague's planned shift for the taker's attendance.
///
/// The attendance must belong to another employee than the target shift, fall
/// on the same date and carry the same shift type. Missing clock times are
/// taken from the target. In one commit the taker gets a transferred, changed
/// plan with the attendance's times and a reason-required note, the target is
/// hidden and the attendance records the exchange in `exchanged_with_id`.
/// Night records are split at midnight afterwards.
///
/// # Errors
///
/// - [`EngineError::RecordNotFound`] when the target is missing or hidden, or
///   the taker is not a known employee
/// - [`EngineError::InvalidExchange`] for a self-exchange, a date or type
///   mismatch, or an attendance already linked to a plan
/// - [`EngineError::ScheduleConflict`] when the replacement plan collides with
///   the taker's own schedule
pub fn exchange_shift<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    mut attendance: AttendanceRecord,
    target_shift_id: Uuid,
) -> EngineResult<ExchangeReport>
where
    S: ShiftRepository + ?Sized,
{
    let mut target = repo.planned_shift(target_shift_id)?;
    if target.hidden {
        return Err(EngineError::RecordNotFound {
            kind: "planned shift",
            id: target_shift_id.to_string(),
        });
    }
    repo.employee(&attendance.employee_id)?;
    let reject = |message: &str| EngineError::InvalidExchange {
        shift_id: target_shift_id,
        message: message.to_string(),
    };
    if attendance.employee_id == target.employee_id {
        return Err(reject("cannot exchange a shift with yourself"));
    }
    if attendance.date != target.date || attendance.shift_type_id != target.shift_type_id {
        return Err(reject("the exchanged shift must have the same date and type"));
    }
    if attendance.planned_shift_id.is_some() {
        return Err(reject("attendance is already linked to a planned shift"));
    }

    catalog.ensure(attendance.date)?;
    attendance.start_time = attendance.start_time.or(target.start_time);
    attendance.end_time = attendance.end_time.or(target.end_time);
    resolve_record(&*repo, &attendance)?;
    ensure_continuation_day(&*repo, catalog, &attendance)?;

    let colleague = repo.employee(&target.employee_id)?;
    let colleague = if colleague.name.is_empty() {
        colleague.id.clone()
    } else {
        colleague.name.clone()
    };

    let mut replacement = PlannedShift::new(
        attendance.employee_id.clone(),
        attendance.date,
        attendance.shift_type_id,
        attendance.start_time,
        attendance.end_time,
    );
    replacement.transferred = true;
    replacement.is_changed = true;
    replacement.reason_pending = true;
    replacement.append_note(&format!("Shift exchanged with {}", colleague));
    replacement.append_note(REASON_REQUIRED_NOTE);

    let interval = resolve_record(&*repo, &replacement)?;
    validate_no_conflict(
        &*repo,
        catalog,
        &replacement.employee_id,
        replacement.date,
        &interval,
        Some(replacement.id),
    )?;

    if attendance.note.is_empty() {
        attendance.note = format!("Taking over shift from {}", colleague);
    }
    attendance.exchanged_with_id = Some(replacement.id);
    target.hide();

    let attendance_id = attendance.id;
    let planned_shift_id = replacement.id;
    info!(
        employee_id = %attendance.employee_id,
        colleague_id = %target.employee_id,
        date = %attendance.date,
        shift_id = %planned_shift_id,
        hidden_shift_id = %target_shift_id,
        "Exchanged planned shift"
    );
    let mut changes = ChangeSet::new();
    changes.insert_planned(replacement);
    changes.update_planned(target);
    changes.insert_attendance(attendance);
    repo.commit(changes)?;

    let plan_split = split_night_shift(repo, catalog, ShiftRecordRef::Planned(planned_shift_id))?;
    let attendance_split =
        split_night_shift(repo, catalog, ShiftRecordRef::Attendance(attendance_id))?;

    Ok(ExchangeReport {
        attendance_id,
        planned_shift_id,
        hidden_shift_id: target_shift_id,
        plan_split,
        attendance_split,
    })
}

/// Takes over a colleague's shift with attendance copied from it.
///
/// Builds the taker's attendance from the target's date, type and times and
/// hands it to [`exchange_shift`].
pub fn take_over_shift<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    taker_id: &str,
    target_shift_id: Uuid,
    note: Option<String>,
) -> EngineResult<ExchangeReport>
where
    S: ShiftRepository + ?Sized,
{
    let target = repo.planned_shift(target_shift_id)?;
    let mut attendance = AttendanceRecord::new(
        taker_id,
        target.date,
        target.shift_type_id,
        target.start_time,
        target.end_time,
    );
    attendance.note = note.unwrap_or_default();
    exchange_shift(repo, catalog, attendance, target_shift_id)
}
