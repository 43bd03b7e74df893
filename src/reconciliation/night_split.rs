//! Night shift splitting.
//!
//! A night-category record whose clock times cross midnight is stored as two
//! records, one per calendar day: the original is truncated to end at 00:00 and
//! a continuation starting at 00:00 is created on the following day.

use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::resolve_record;
use crate::calendar::CalendarCatalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, PlannedShift, ShiftTypeId, TimedRecord};
use crate::repository::{ChangeSet, ShiftRepository};

/// Note carried by every continuation half.
pub const CONTINUATION_NOTE: &str = "continuation of night shift";

/// Identifies the record to split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftRecordRef {
    /// A planned shift.
    Planned(Uuid),
    /// An attendance record.
    Attendance(Uuid),
}

/// What a split did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The record is not a midnight-crossing night record.
    Unchanged,
    /// The record was truncated at midnight.
    Split {
        /// The truncated first half.
        first: Uuid,
        /// The second half on the following day.
        continuation: Uuid,
        /// False when a matching second half already existed.
        continuation_created: bool,
    },
}

impl SplitOutcome {
    /// The second half, when the record was split.
    pub fn continuation(&self) -> Option<Uuid> {
        match self {
            SplitOutcome::Split { continuation, .. } => Some(*continuation),
            SplitOutcome::Unchanged => None,
        }
    }
}

/// Splits a midnight-crossing night record into two calendar-day records.
///
/// Only records whose shift type is night-classified are touched. A record that
/// already ends at 00:00 is left alone, so running the split twice is a no-op.
/// When a second half with the same employee, date, 00:00 start and shift type
/// already exists, the original is truncated and no new record is created.
///
/// For attendance, the second half links to the visible night plan starting at
/// 00:00 on the following day, and that plan is marked transferred. The second
/// half always ends at the attendance's own end time.
///
/// A linked night attendance that ends at 00:00 because its plan was already
/// split still gets its second half: it is derived from the plan's
/// continuation, provided that continuation has no attendance yet.
///
/// All changes are committed as one change set.
pub fn split_night_shift<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    record: ShiftRecordRef,
) -> EngineResult<SplitOutcome>
where
    S: ShiftRepository + ?Sized,
{
    match record {
        ShiftRecordRef::Planned(id) => split_planned(repo, catalog, id),
        ShiftRecordRef::Attendance(id) => split_attendance(repo, catalog, id),
    }
}

fn split_planned<S>(repo: &mut S, catalog: &CalendarCatalog, id: Uuid) -> EngineResult<SplitOutcome>
where
    S: ShiftRepository + ?Sized,
{
    let mut plan = repo.planned_shift(id)?;
    if plan.hidden {
        return Ok(SplitOutcome::Unchanged);
    }
    let Some(original_end) = crossing_end(&*repo, &plan)? else {
        return Ok(SplitOutcome::Unchanged);
    };
    let next = next_day(&plan, catalog)?;

    let mut changes = ChangeSet::new();
    let existing = planned_continuation(&*repo, &plan.employee_id, next, plan.shift_type_id)?;
    let (continuation, created) = match existing {
        Some(existing) => (existing.id, false),
        None => {
            let mut second = PlannedShift::new(
                plan.employee_id.clone(),
                next,
                plan.shift_type_id,
                Some(NaiveTime::MIN),
                Some(original_end),
            );
            second.note = CONTINUATION_NOTE.to_string();
            second.is_changed = plan.is_changed;
            second.change_reason_id = plan.change_reason_id;
            let second_id = second.id;
            changes.insert_planned(second);
            (second_id, true)
        }
    };

    plan.end_time = Some(NaiveTime::MIN);
    let employee_id = plan.employee_id.clone();
    let date = plan.date;
    changes.update_planned(plan);
    repo.commit(changes)?;

    info!(
        employee_id = %employee_id,
        date = %date,
        shift_id = %id,
        continuation = %continuation,
        created,
        "Split night planned shift at midnight"
    );
    Ok(SplitOutcome::Split {
        first: id,
        continuation,
        continuation_created: created,
    })
}

fn split_attendance<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    id: Uuid,
) -> EngineResult<SplitOutcome>
where
    S: ShiftRepository + ?Sized,
{
    let mut attendance = repo.attendance(id)?;
    let Some(original_end) = crossing_end(&*repo, &attendance)? else {
        return continue_from_plan(repo, catalog, &attendance);
    };
    let next = next_day(&attendance, catalog)?;

    let mut changes = ChangeSet::new();
    let existing = attendance_continuation(&*repo, &attendance, next)?;

    let (continuation, created) = match existing {
        Some(existing) => (existing.id, false),
        None => {
            let mut second = AttendanceRecord::new(
                attendance.employee_id.clone(),
                next,
                attendance.shift_type_id,
                Some(NaiveTime::MIN),
                Some(original_end),
            );
            second.note = CONTINUATION_NOTE.to_string();

            if attendance.planned_shift_id.is_some() {
                let plan = planned_continuation(
                    &*repo,
                    &attendance.employee_id,
                    next,
                    attendance.shift_type_id,
                )?;
                if let Some(mut plan) = plan {
                    second.planned_shift_id = Some(plan.id);
                    let cleared = plan.clear_missing_attendance();
                    if !plan.transferred || cleared {
                        plan.transferred = true;
                        changes.update_planned(plan);
                    }
                }
            }

            let second_id = second.id;
            changes.insert_attendance(second);
            (second_id, true)
        }
    };

    attendance.end_time = Some(NaiveTime::MIN);
    let employee_id = attendance.employee_id.clone();
    let date = attendance.date;
    changes.update_attendance(attendance);
    repo.commit(changes)?;

    info!(
        employee_id = %employee_id,
        date = %date,
        attendance_id = %id,
        continuation = %continuation,
        created,
        "Split night attendance at midnight"
    );
    Ok(SplitOutcome::Split {
        first: id,
        continuation,
        continuation_created: created,
    })
}

/// Derives the second half of a first-half attendance from the plan's continuation.
fn continue_from_plan<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    attendance: &AttendanceRecord,
) -> EngineResult<SplitOutcome>
where
    S: ShiftRepository + ?Sized,
{
    let Some(plan_id) = attendance.planned_shift_id else {
        return Ok(SplitOutcome::Unchanged);
    };
    let first_half = attendance.start_time.is_some_and(|t| t != NaiveTime::MIN)
        && attendance.end_time == Some(NaiveTime::MIN);
    if !first_half || !is_night(&*repo, attendance)? {
        return Ok(SplitOutcome::Unchanged);
    }
    if repo.planned_shift(plan_id)?.end_time != Some(NaiveTime::MIN) {
        return Ok(SplitOutcome::Unchanged);
    }
    let next = next_day(attendance, catalog)?;
    if attendance_continuation(&*repo, attendance, next)?.is_some() {
        return Ok(SplitOutcome::Unchanged);
    }

    let continuation_plan =
        planned_continuation(&*repo, &attendance.employee_id, next, attendance.shift_type_id)?;
    let Some(mut plan) = continuation_plan else {
        return Ok(SplitOutcome::Unchanged);
    };
    if plan.end_time.is_none() || !repo.attendance_for_plan(plan.id)?.is_empty() {
        return Ok(SplitOutcome::Unchanged);
    }

    let mut second = AttendanceRecord::new(
        attendance.employee_id.clone(),
        next,
        attendance.shift_type_id,
        Some(NaiveTime::MIN),
        plan.end_time,
    )
    .linked_to(plan.id);
    second.note = CONTINUATION_NOTE.to_string();
    let continuation = second.id;

    plan.transferred = true;
    plan.clear_missing_attendance();
    let plan_id = plan.id;
    let mut changes = ChangeSet::new();
    changes.update_planned(plan);
    changes.insert_attendance(second);
    repo.commit(changes)?;

    info!(
        employee_id = %attendance.employee_id,
        date = %attendance.date,
        attendance_id = %attendance.id,
        continuation = %continuation,
        shift_id = %plan_id,
        "Derived night attendance continuation from plan"
    );
    Ok(SplitOutcome::Split {
        first: attendance.id,
        continuation,
        continuation_created: true,
    })
}

/// The attendance of the same type starting at 00:00 on `next`.
fn attendance_continuation<S>(
    repo: &S,
    attendance: &AttendanceRecord,
    next: NaiveDate,
) -> EngineResult<Option<AttendanceRecord>>
where
    S: ShiftRepository + ?Sized,
{
    Ok(repo
        .attendance_in_range(&attendance.employee_id, next, next)?
        .into_iter()
        .find(|r| {
            r.id != attendance.id
                && r.start_time == Some(NaiveTime::MIN)
                && r.shift_type_id == attendance.shift_type_id
        }))
}

fn is_night<S, R>(repo: &S, record: &R) -> EngineResult<bool>
where
    S: ShiftRepository + ?Sized,
    R: TimedRecord,
{
    Ok(repo
        .shift_type_for(record.shift_type_id())?
        .is_some_and(|t| t.is_night()))
}

/// Fails when a night record could not be continued on the following day.
///
/// Callers run this before their first commit so a record is never stored
/// without the calendar day its second half needs.
pub(crate) fn ensure_continuation_day<S, R>(
    repo: &S,
    catalog: &CalendarCatalog,
    record: &R,
) -> EngineResult<()>
where
    S: ShiftRepository + ?Sized,
    R: TimedRecord,
{
    if is_night(repo, record)? {
        next_day(record, catalog)?;
    }
    Ok(())
}

/// The pre-truncation end time of a night record that crosses midnight.
fn crossing_end<S, R>(repo: &S, record: &R) -> EngineResult<Option<NaiveTime>>
where
    S: ShiftRepository + ?Sized,
    R: TimedRecord,
{
    if !is_night(repo, record)? {
        return Ok(None);
    }
    resolve_record(repo, record)?;

    match (record.start_time(), record.end_time()) {
        (Some(start), Some(end)) if end != NaiveTime::MIN && end < start => Ok(Some(end)),
        _ => {
            debug!(
                employee_id = record.employee_id(),
                record_id = %record.record_id(),
                "Night record does not cross midnight"
            );
            Ok(None)
        }
    }
}

fn next_day<R: TimedRecord>(record: &R, catalog: &CalendarCatalog) -> EngineResult<NaiveDate> {
    let next = record
        .date()
        .checked_add_days(Days::new(1))
        .ok_or_else(|| EngineError::InvalidInterval {
            date: record.date(),
            start: record.start_time(),
            end: record.end_time(),
            message: "continuation date out of range".to_string(),
        })?;
    catalog.ensure(next)?;
    Ok(next)
}

/// The visible planned shift of the same type starting at 00:00 on `date`.
pub(crate) fn planned_continuation<S>(
    repo: &S,
    employee_id: &str,
    date: NaiveDate,
    shift_type_id: Option<ShiftTypeId>,
) -> EngineResult<Option<PlannedShift>>
where
    S: ShiftRepository + ?Sized,
{
    Ok(repo
        .planned_shifts_in_range(employee_id, date, date)?
        .into_iter()
        .find(|s| {
            !s.hidden && s.start_time == Some(NaiveTime::MIN) && s.shift_type_id == shift_type_id
        }))
}
