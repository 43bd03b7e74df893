//! Flagging planned shifts that were never reported.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{MISSING_ATTENDANCE_NOTE, PlannedShift, ShiftCategory, describe_times};
use crate::repository::{ChangeSet, ShiftRepository};

/// Marks past plans nobody reported attendance for.
///
/// A visible plan dated before `today` within `from..=to` is flagged when it is
/// untransferred, not yet changed, not an absence and has no linked attendance.
/// Flagged plans get `is_changed` and an explanatory note so a manager can
/// either record the attendance or justify the gap. Returns the flagged ids.
pub fn flag_missing_attendance<S>(
    repo: &mut S,
    employee_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> EngineResult<Vec<Uuid>>
where
    S: ShiftRepository + ?Sized,
{
    let mut changes = ChangeSet::new();
    let mut flagged = Vec::new();

    for mut shift in repo.planned_shifts_in_range(employee_id, from, to)? {
        if !is_candidate(&*repo, &shift, today)? {
            continue;
        }
        if !repo.attendance_for_plan(shift.id)?.is_empty() {
            continue;
        }
        shift.is_changed = true;
        shift.append_note(&format!(
            "{}: no attendance reported for planned shift {}",
            MISSING_ATTENDANCE_NOTE,
            describe_times(shift.start_time, shift.end_time)
        ));
        flagged.push(shift.id);
        changes.update_planned(shift);
    }

    repo.commit(changes)?;
    if !flagged.is_empty() {
        info!(
            employee_id = %employee_id,
            from = %from,
            to = %to,
            flagged = flagged.len(),
            "Flagged planned shifts with missing attendance"
        );
    }
    Ok(flagged)
}

fn is_candidate<S>(repo: &S, shift: &PlannedShift, today: NaiveDate) -> EngineResult<bool>
where
    S: ShiftRepository + ?Sized,
{
    if shift.hidden || shift.transferred || shift.is_changed || shift.date >= today {
        return Ok(false);
    }
    let absence = repo
        .shift_type_for(shift.shift_type_id)?
        .is_some_and(|t| t.category == ShiftCategory::Absence);
    Ok(!absence)
}
