//! Schedule conflict detection.
//!
//! A candidate planned shift may not overlap any other visible planned shift of
//! the same employee. Neighbours from the previous and following day are
//! included so that midnight-crossing shifts are caught. Intervals that merely
//! touch do not conflict.

use chrono::{Days, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::calendar::CalendarCatalog;
use crate::error::{EngineError, EngineResult};
use crate::repository::ShiftRepository;

use super::interval::{ResolvedInterval, resolve_record};

/// Checks a candidate interval against the employee's committed shifts.
///
/// # Arguments
///
/// * `repo` - The repository holding committed shifts
/// * `catalog` - The calendar catalog; the candidate date must be present
/// * `employee_id` - The employee the candidate belongs to
/// * `date` - The candidate's date
/// * `candidate` - The candidate's resolved interval
/// * `exclude_id` - The candidate's own id when it is an update
///
/// # Returns
///
/// `Ok(())` when nothing overlaps, or [`EngineError::ScheduleConflict`]
/// describing the first colliding shift.
pub fn validate_no_conflict<S>(
    repo: &S,
    catalog: &CalendarCatalog,
    employee_id: &str,
    date: NaiveDate,
    candidate: &ResolvedInterval,
    exclude_id: Option<Uuid>,
) -> EngineResult<()>
where
    S: ShiftRepository + ?Sized,
{
    catalog.ensure(date)?;

    let from = date.checked_sub_days(Days::new(1)).unwrap_or(date);
    let to = date.checked_add_days(Days::new(1)).unwrap_or(date);

    let neighbours = repo.planned_shifts_in_range(employee_id, from, to)?;
    for other in neighbours
        .iter()
        .filter(|s| !s.hidden && Some(s.id) != exclude_id)
    {
        let resolved = resolve_record(repo, other)?;
        if candidate.overlaps(&resolved) {
            let shift_type = repo
                .shift_type_for(other.shift_type_id)?
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "untyped".to_string());
            debug!(
                employee_id,
                date = %date,
                conflicting_shift = %other.id,
                "Schedule conflict detected"
            );
            return Err(EngineError::ScheduleConflict {
                conflicting_shift: other.id,
                shift_type,
                date: other.date,
                start: resolved.start,
                end: resolved.end,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::resolve_interval;
    use crate::config::ConfigLoader;
    use crate::models::PlannedShift;
    use crate::repository::{ChangeSet, InMemoryRepository};
    use chrono::NaiveTime;

    const FLEXIBLE: u32 = 24;
    const NIGHT: u32 = 20;

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

    fn seed(repo: &mut InMemoryRepository, shift: PlannedShift) -> Uuid {
        let id = shift.id;
        let mut changes = ChangeSet::new();
        changes.insert_planned(shift);
        repo.commit(changes).unwrap();
        id
    }

    fn candidate(date: &str, start: &str, end: &str) -> ResolvedInterval {
        resolve_interval(make_date(date), make_time(start), make_time(end), None).unwrap()
    }

    #[test]
    fn test_adjacent_shifts_do_not_conflict() {
        let (mut repo, catalog) = setup();
        seed(
            &mut repo,
            PlannedShift::new("emp_001", make_date("2025-06-10"), Some(FLEXIBLE), make_time("08:00"), make_time("16:00")),
        );

        let result = validate_no_conflict(
            &repo,
            &catalog,
            "emp_001",
            make_date("2025-06-10"),
            &candidate("2025-06-10", "16:00", "20:00"),
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_one_minute_overlap_conflicts() {
        let (mut repo, catalog) = setup();
        let existing = seed(
            &mut repo,
            PlannedShift::new("emp_001", make_date("2025-06-10"), Some(FLEXIBLE), make_time("08:00"), make_time("16:01")),
        );

        match validate_no_conflict(
            &repo,
            &catalog,
            "emp_001",
            make_date("2025-06-10"),
            &candidate("2025-06-10", "16:00", "20:00"),
            None,
        ) {
            Err(EngineError::ScheduleConflict {
                conflicting_shift,
                shift_type,
                ..
            }) => {
                assert_eq!(conflicting_shift, existing);
                assert_eq!(shift_type, "Flexible");
            }
            other => panic!("Expected ScheduleConflict, got {:?}", other),
        }
    }

    #[test]
    fn test_previous_night_shift_is_checked() {
        let (mut repo, catalog) = setup();
        seed(
            &mut repo,
            PlannedShift::new("emp_001", make_date("2025-06-09"), Some(FLEXIBLE), make_time("22:00"), make_time("06:00")),
        );

        let result = validate_no_conflict(
            &repo,
            &catalog,
            "emp_001",
            make_date("2025-06-10"),
            &candidate("2025-06-10", "05:00", "13:00"),
            None,
        );
        assert!(matches!(result, Err(EngineError::ScheduleConflict { .. })));
    }

    #[test]
    fn test_hidden_and_excluded_shifts_are_ignored() {
        let (mut repo, catalog) = setup();
        let mut hidden = PlannedShift::new(
            "emp_001",
            make_date("2025-06-10"),
            Some(FLEXIBLE),
            make_time("08:00"),
            make_time("16:00"),
        );
        hidden.hide();
        seed(&mut repo, hidden);
        let own = seed(
            &mut repo,
            PlannedShift::new("emp_001", make_date("2025-06-10"), Some(NIGHT), make_time("10:00"), make_time("12:00")),
        );

        let result = validate_no_conflict(
            &repo,
            &catalog,
            "emp_001",
            make_date("2025-06-10"),
            &candidate("2025-06-10", "09:00", "13:00"),
            Some(own),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_other_employees_are_ignored() {
        let (mut repo, catalog) = setup();
        seed(
            &mut repo,
            PlannedShift::new("emp_002", make_date("2025-06-10"), Some(FLEXIBLE), make_time("08:00"), make_time("16:00")),
        );

        let result = validate_no_conflict(
            &repo,
            &catalog,
            "emp_001",
            make_date("2025-06-10"),
            &candidate("2025-06-10", "08:00", "16:00"),
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_date_outside_catalog_fails() {
        let (repo, catalog) = setup();
        let result = validate_no_conflict(
            &repo,
            &catalog,
            "emp_001",
            make_date("2040-06-10"),
            &candidate("2040-06-10", "08:00", "16:00"),
            None,
        );
        assert!(matches!(result, Err(EngineError::MissingCalendarDay { .. })));
    }
}
