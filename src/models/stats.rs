//! Derived balance figures.
//!
//! These values are computed on demand from the planned shifts and the
//! calendar, and are never persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hour totals for one employee and one calendar month.
///
/// # Example
///
/// ```
/// use worktrack_engine::models::MonthStats;
/// use rust_decimal::Decimal;
///
/// let stats = MonthStats::new(2025, 2, Decimal::new(140, 0));
/// assert_eq!(stats.diff, Decimal::new(-140, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStats {
    /// The year.
    pub year: i32,
    /// The month number (1-12).
    pub month: u32,
    /// Contractual hours expected in the month.
    pub fund: Decimal,
    /// Hours of shifts that start in the month.
    pub worked: Decimal,
    /// Hours falling on Saturdays and Sundays within the month.
    pub weekend: Decimal,
    /// Hours falling on Saturdays within the month.
    pub saturday: Decimal,
    /// Hours falling on Sundays within the month.
    pub sunday: Decimal,
    /// Hours falling on public holidays within the month.
    pub holiday: Decimal,
    /// Hours inside the night window within the month.
    pub night: Decimal,
    /// `worked - fund`.
    pub diff: Decimal,
}

impl MonthStats {
    /// Creates empty stats for a month with the given fund.
    pub fn new(year: i32, month: u32, fund: Decimal) -> Self {
        Self {
            year,
            month,
            fund,
            worked: Decimal::ZERO,
            weekend: Decimal::ZERO,
            saturday: Decimal::ZERO,
            sunday: Decimal::ZERO,
            holiday: Decimal::ZERO,
            night: Decimal::ZERO,
            diff: -fund,
        }
    }
}

/// A year of month stats framed by the running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearOverview {
    /// The employee.
    pub employee_id: String,
    /// The year.
    pub year: i32,
    /// Balance carried into January.
    pub opening_balance: Decimal,
    /// Stats for January through December.
    pub months: Vec<MonthStats>,
    /// Balance carried out of December.
    pub closing_balance: Decimal,
}

impl YearOverview {
    /// Total hours worked over the year.
    pub fn total_worked(&self) -> Decimal {
        self.months.iter().map(|m| m.worked).sum()
    }

    /// Total fund over the year.
    pub fn total_fund(&self) -> Decimal {
        self.months.iter().map(|m| m.fund).sum()
    }
}
