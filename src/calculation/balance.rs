//! Monthly statistics and running balance.
//!
//! The fund of a month is its working days times the standard daily hours.
//! Worked hours are attributed to the month a shift is dated in; weekend,
//! holiday and night hours are attributed to the month they physically fall
//! in, by clipping every interval to the month.

use std::collections::HashMap;

use chrono::{Days, Weekday};
use rust_decimal::Decimal;
use tracing::debug;

use crate::calendar::{CalendarCatalog, month_bounds, month_of, next_month};
use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::models::{MonthStats, YearOverview};
use crate::repository::ShiftRepository;

use super::interval::{resolve_interval, seconds_to_hours};
use super::segmentation::{MonthClip, night_overlap_seconds, segment};

/// Contractual hours expected in a month.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::working_fund;
/// use worktrack_engine::calendar::{CalendarCatalog, HolidayRules};
/// use rust_decimal::Decimal;
///
/// let catalog = CalendarCatalog::generate(2025, 2025, &HolidayRules::default()).unwrap();
/// // February 2025 has 20 weekdays
/// let fund = working_fund(&catalog, 2025, 2, Decimal::new(7, 0)).unwrap();
/// assert_eq!(fund, Decimal::new(140, 0));
/// ```
pub fn working_fund(
    catalog: &CalendarCatalog,
    year: i32,
    month: u32,
    standard_hours_per_day: Decimal,
) -> EngineResult<Decimal> {
    let working_days = catalog
        .month(year, month)?
        .into_iter()
        .filter(|day| day.is_working_day())
        .count();
    Ok(Decimal::from(working_days) * standard_hours_per_day)
}

#[derive(Default)]
struct SecondTotals {
    weekend: i64,
    saturday: i64,
    sunday: i64,
    holiday: i64,
    night: i64,
}

/// Computes the hour totals of one employee for one month.
///
/// Hidden shifts are ignored. Shifts of absence types count toward worked
/// hours only.
pub fn month_stats<S>(
    repo: &S,
    catalog: &CalendarCatalog,
    settings: &EngineSettings,
    employee_id: &str,
    year: i32,
    month: u32,
) -> EngineResult<MonthStats>
where
    S: ShiftRepository + ?Sized,
{
    let (first, last) = month_bounds(year, month)?;
    let clip = MonthClip::for_month(year, month)?;
    let fund = working_fund(catalog, year, month, settings.standard_hours_per_day)?;

    let from = first.checked_sub_days(Days::new(1)).unwrap_or(first);
    let to = last.checked_add_days(Days::new(1)).unwrap_or(last);
    let shifts = repo.planned_shifts_in_range(employee_id, from, to)?;

    let mut worked = Decimal::ZERO;
    let mut totals = SecondTotals::default();

    for shift in shifts.iter().filter(|s| !s.hidden) {
        let shift_type = repo.shift_type_for(shift.shift_type_id)?;
        let interval =
            resolve_interval(shift.date, shift.start_time, shift.end_time, shift_type)?;

        if shift.date >= first && shift.date <= last {
            worked += interval.duration_hours;
        }

        if shift_type.is_some_and(|t| !t.category.counts_toward_premiums()) {
            continue;
        }

        for slice in segment(interval.start, interval.end, Some(&clip), catalog)? {
            if slice.is_weekend {
                totals.weekend += slice.seconds;
                match slice.weekday {
                    Weekday::Sat => totals.saturday += slice.seconds,
                    Weekday::Sun => totals.sunday += slice.seconds,
                    _ => {}
                }
            }
            if slice.is_holiday {
                totals.holiday += slice.seconds;
            }
        }
        totals.night +=
            night_overlap_seconds(interval.start, interval.end, Some(&clip), &settings.night_window);
    }

    let mut stats = MonthStats::new(year, month, fund);
    stats.worked = worked.round_dp(2);
    stats.weekend = seconds_to_hours(totals.weekend).round_dp(2);
    stats.saturday = seconds_to_hours(totals.saturday).round_dp(2);
    stats.sunday = seconds_to_hours(totals.sunday).round_dp(2);
    stats.holiday = seconds_to_hours(totals.holiday).round_dp(2);
    stats.night = seconds_to_hours(totals.night).round_dp(2);
    stats.diff = stats.worked - fund;

    debug!(
        employee_id,
        year,
        month,
        worked = %stats.worked,
        fund = %stats.fund,
        "Computed month stats"
    );
    Ok(stats)
}

/// Month stats with a per-(employee, month) cache and running balance walks.
///
/// The cache must be invalidated for an employee whenever their shifts change.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::BalanceCalculator;
/// use worktrack_engine::calendar::CalendarCatalog;
/// use worktrack_engine::config::ConfigLoader;
/// use worktrack_engine::models::Employee;
/// use worktrack_engine::repository::InMemoryRepository;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/worktrack").unwrap();
/// let catalog = CalendarCatalog::from_config(loader.config()).unwrap();
/// let mut repo = InMemoryRepository::from_config(loader.config());
/// repo.add_employee(Employee::new("emp_001", "Jana Novakova").with_initial_balance(Decimal::new(5, 0)));
///
/// let mut balances = BalanceCalculator::new(&catalog, loader.config().settings());
/// // No shifts yet: the balance is the carried-in balance.
/// assert_eq!(balances.balance_at(&repo, "emp_001", 2025, 6).unwrap(), Decimal::new(5, 0));
/// ```
pub struct BalanceCalculator<'a> {
    catalog: &'a CalendarCatalog,
    settings: &'a EngineSettings,
    cache: HashMap<(String, i32, u32), MonthStats>,
}

impl<'a> BalanceCalculator<'a> {
    /// Creates a calculator with an empty cache.
    pub fn new(catalog: &'a CalendarCatalog, settings: &'a EngineSettings) -> Self {
        Self {
            catalog,
            settings,
            cache: HashMap::new(),
        }
    }

    /// Month stats, served from the cache when available.
    pub fn month_stats<S>(
        &mut self,
        repo: &S,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthStats>
    where
        S: ShiftRepository + ?Sized,
    {
        let key = (employee_id.to_string(), year, month);
        if let Some(stats) = self.cache.get(&key) {
            return Ok(stats.clone());
        }
        let stats = month_stats(repo, self.catalog, self.settings, employee_id, year, month)?;
        self.cache.insert(key, stats.clone());
        Ok(stats)
    }

    /// The balance carried into the target month.
    ///
    /// Starts from the employee's initial balance and adds the diff of every
    /// month from the month of their first shift up to, but excluding, the
    /// target month.
    pub fn balance_at<S>(
        &mut self,
        repo: &S,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Decimal>
    where
        S: ShiftRepository + ?Sized,
    {
        month_bounds(year, month)?;
        let mut balance = repo.employee(employee_id)?.initial_balance;

        let Some(first) = repo.first_shift_date(employee_id)? else {
            return Ok(balance);
        };

        let mut cursor = month_of(first);
        while cursor < (year, month) {
            balance += self.month_stats(repo, employee_id, cursor.0, cursor.1)?.diff;
            cursor = next_month(cursor.0, cursor.1);
        }

        Ok(balance)
    }

    /// Twelve months of stats framed by the opening and closing balance.
    pub fn year_overview<S>(
        &mut self,
        repo: &S,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<YearOverview>
    where
        S: ShiftRepository + ?Sized,
    {
        let opening_balance = self.balance_at(repo, employee_id, year, 1)?;
        let months = (1..=12)
            .map(|month| self.month_stats(repo, employee_id, year, month))
            .collect::<EngineResult<Vec<_>>>()?;
        let closing_balance = self.balance_at(repo, employee_id, year + 1, 1)?;

        Ok(YearOverview {
            employee_id: employee_id.to_string(),
            year,
            opening_balance,
            months,
            closing_balance,
        })
    }

    /// Drops every cached month of an employee.
    pub fn invalidate(&mut self, employee_id: &str) {
        self.cache.retain(|(cached, _, _), _| cached != employee_id);
    }

    /// Number of cached months.
    pub fn cached_months(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for BalanceCalculator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceCalculator")
            .field("cached_months", &self.cache.len())
            .finish()
    }
}
