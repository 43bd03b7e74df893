//! Pure time-accounting calculations.
//!
//! This module contains interval resolution with the midnight-crossing rule,
//! per-day segmentation with weekend/holiday classification and night-window
//! overlap, schedule conflict detection, and the monthly fund/balance rollup.

mod balance;
mod conflict;
mod interval;
mod segmentation;

pub use balance::{BalanceCalculator, month_stats, working_fund};
pub use conflict::validate_no_conflict;
pub use interval::{ResolvedInterval, resolve_interval, resolve_record, seconds_to_hours};
pub use segmentation::{DaySegment, MonthClip, night_overlap_seconds, segment, split_by_day};
