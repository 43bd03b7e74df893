//! Core data models for the WorkTrack engine.
//!
//! This module contains the reference data, the persisted shift records and
//! the derived balance figures used throughout the engine.

mod attendance;
mod calendar_day;
mod change_reason;
mod employee;
mod planned_shift;
mod record;
mod shift_type;
mod stats;

pub use attendance::AttendanceRecord;
pub use calendar_day::CalendarDay;
pub use change_reason::{ChangeReason, ChangeReasonCategory, ChangeReasonId};
pub use employee::Employee;
pub use planned_shift::{MISSING_ATTENDANCE_NOTE, PlannedShift};
pub(crate) use planned_shift::describe_times;
pub use record::TimedRecord;
pub use shift_type::{ShiftCategory, ShiftType, ShiftTypeId};
pub use stats::{MonthStats, YearOverview};
