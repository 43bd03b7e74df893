//! Copying a month of planned shifts into another month.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{resolve_record, validate_no_conflict};
use crate::calendar::{CalendarCatalog, month_bounds};
use crate::error::{EngineError, EngineResult};
use crate::models::{PlannedShift, ShiftCategory};
use crate::repository::{ChangeSet, ShiftRepository};

/// Result of a plan copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Ids of the newly created planned shifts.
    pub copied: Vec<Uuid>,
    /// Source dates whose plans were not copied.
    pub skipped: Vec<NaiveDate>,
}

/// Copies an employee's plans from one month into another, day-of-month to
/// day-of-month.
///
/// Hidden plans and carve-outs are not copied. A plan is skipped when its day
/// does not exist in the target month, when the target day already held a
/// visible plan before the copy, or when the copy would overlap a shift on a
/// neighbouring day. Copies start out untransferred and unchanged. All copies
/// are committed together.
pub fn copy_monthly_plan<S>(
    repo: &mut S,
    catalog: &CalendarCatalog,
    employee_id: &str,
    from: (i32, u32),
    to: (i32, u32),
) -> EngineResult<CopyReport>
where
    S: ShiftRepository + ?Sized,
{
    repo.employee(employee_id)?;
    let (source_first, source_last) = month_bounds(from.0, from.1)?;
    let (target_first, target_last) = month_bounds(to.0, to.1)?;
    catalog.ensure(target_first)?;
    catalog.ensure(target_last)?;

    let occupied: HashSet<NaiveDate> = repo
        .planned_shifts_in_range(employee_id, target_first, target_last)?
        .into_iter()
        .filter(|s| !s.hidden)
        .map(|s| s.date)
        .collect();

    let mut report = CopyReport::default();
    let mut changes = ChangeSet::new();

    for source in repo.planned_shifts_in_range(employee_id, source_first, source_last)? {
        if source.hidden || is_carve_out(&*repo, &source)? {
            continue;
        }
        let Some(date) = NaiveDate::from_ymd_opt(to.0, to.1, source.date.day()) else {
            report.skipped.push(source.date);
            continue;
        };
        if occupied.contains(&date) {
            report.skipped.push(source.date);
            continue;
        }

        let mut copy = PlannedShift::new(
            source.employee_id.clone(),
            date,
            source.shift_type_id,
            source.start_time,
            source.end_time,
        );
        copy.note = source.note.clone();

        let interval = resolve_record(&*repo, &copy)?;
        match validate_no_conflict(&*repo, catalog, employee_id, date, &interval, None) {
            Ok(()) => {}
            Err(err @ EngineError::ScheduleConflict { .. }) => {
                warn!(
                    employee_id = %employee_id,
                    date = %date,
                    error = %err,
                    "Skipping copied shift that conflicts with an existing one"
                );
                report.skipped.push(source.date);
                continue;
            }
            Err(err) => return Err(err),
        }

        report.copied.push(copy.id);
        changes.insert_planned(copy);
    }

    repo.commit(changes)?;
    info!(
        employee_id = %employee_id,
        from = %format!("{}-{:02}", from.0, from.1),
        to = %format!("{}-{:02}", to.0, to.1),
        copied = report.copied.len(),
        skipped = report.skipped.len(),
        "Copied monthly plan"
    );
    Ok(report)
}

fn is_carve_out<S>(repo: &S, shift: &PlannedShift) -> EngineResult<bool>
where
    S: ShiftRepository + ?Sized,
{
    Ok(repo
        .shift_type_for(shift.shift_type_id)?
        .is_some_and(|t| t.category == ShiftCategory::Other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::Employee;
    use crate::repository::InMemoryRepository;
    use chrono::NaiveTime;

    const DAY: u32 = 3;
    const NIGHT: u32 = 20;
    const OTHER: u32 = 22;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_time(time_str: &str) -> Option<NaiveTime> {
        Some(NaiveTime::parse_from_str(time_str, "%H:%M").unwrap())
    }

    fn setup() -> (InMemoryRepository, CalendarCatalog) {
        let loader = ConfigLoader::load("./config/worktrack").expect("Failed to load config");
        let catalog = CalendarCatalog::from_config(loader.config()).unwrap();
        let mut repo = InMemoryRepository::from_config(loader.config());
        repo.add_employee(Employee::new("emp_001", "Jana Novakova"));
        (repo, catalog)
    }

    fn seed(repo: &mut InMemoryRepository, shifts: Vec<PlannedShift>) {
        let mut changes = ChangeSet::new();
        for shift in shifts {
            changes.insert_planned(shift);
        }
        repo.commit(changes).unwrap();
    }

    fn day_plan(date: &str) -> PlannedShift {
        PlannedShift::new("emp_001", make_date(date), Some(DAY), make_time("08:00"), make_time("16:00"))
    }

    #[test]
    fn test_copies_to_same_day_of_month() {
        let (mut repo, catalog) = setup();
        let mut transferred = day_plan("2025-01-06");
        transferred.transferred = true;
        transferred.is_changed = true;
        seed(&mut repo, vec![transferred, day_plan("2025-01-07")]);

        let report = copy_monthly_plan(&mut repo, &catalog, "emp_001", (2025, 1), (2025, 3)).unwrap();
        assert_eq!(report.copied.len(), 2);
        assert!(report.skipped.is_empty());

        let copies = repo
            .planned_shifts_in_range("emp_001", make_date("2025-03-01"), make_date("2025-03-31"))
            .unwrap();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].date, make_date("2025-03-06"));
        assert_eq!(copies[1].date, make_date("2025-03-07"));
        assert!(!copies[0].transferred);
        assert!(!copies[0].is_changed);
    }

    #[test]
    fn test_skips_missing_days_and_occupied_days() {
        let (mut repo, catalog) = setup();
        seed(
            &mut repo,
            vec![
                day_plan("2025-01-10"),
                day_plan("2025-01-30"),
                PlannedShift::new("emp_001", make_date("2025-02-10"), Some(NIGHT), make_time("21:00"), make_time("00:00")),
            ],
        );

        let report = copy_monthly_plan(&mut repo, &catalog, "emp_001", (2025, 1), (2025, 2)).unwrap();
        assert!(report.copied.is_empty());
        assert_eq!(
            report.skipped,
            vec![make_date("2025-01-10"), make_date("2025-01-30")]
        );
    }

    #[test]
    fn test_skips_hidden_and_carve_outs() {
        let (mut repo, catalog) = setup();
        let mut hidden = day_plan("2025-01-08");
        hidden.hide();
        let carve_out =
            PlannedShift::new("emp_001", make_date("2025-01-09"), Some(OTHER), make_time("16:00"), make_time("17:00"));
        seed(&mut repo, vec![hidden, carve_out, day_plan("2025-01-09")]);

        let report = copy_monthly_plan(&mut repo, &catalog, "emp_001", (2025, 1), (2025, 4)).unwrap();
        assert_eq!(report.copied.len(), 1);
        let copy = repo.planned_shift(report.copied[0]).unwrap();
        assert_eq!(copy.date, make_date("2025-04-09"));
        assert_eq!(copy.shift_type_id, Some(DAY));
    }

    #[test]
    fn test_skips_copy_overlapping_neighbouring_shift() {
        let (mut repo, catalog) = setup();
        seed(
            &mut repo,
            vec![
                PlannedShift::new("emp_001", make_date("2025-01-05"), Some(24), make_time("00:00"), make_time("04:00")),
                // Target month: a flexible shift running past midnight into the 5th.
                PlannedShift::new("emp_001", make_date("2025-03-04"), Some(24), make_time("20:00"), make_time("02:00")),
            ],
        );

        let report = copy_monthly_plan(&mut repo, &catalog, "emp_001", (2025, 1), (2025, 3)).unwrap();
        assert!(report.copied.is_empty());
        assert_eq!(report.skipped, vec![make_date("2025-01-05")]);
    }

    #[test]
    fn test_unknown_employee_and_uncatalogued_month_fail() {
        let (mut repo, catalog) = setup();
        assert!(matches!(
            copy_monthly_plan(&mut repo, &catalog, "nobody", (2025, 1), (2025, 2)),
            Err(EngineError::RecordNotFound { .. })
        ));
        assert!(matches!(
            copy_monthly_plan(&mut repo, &catalog, "emp_001", (2025, 1), (2040, 2)),
            Err(EngineError::MissingCalendarDay { .. })
        ));
    }
}
