//! Side-effecting record maintenance.
//!
//! Every operation here reads through a [`ShiftRepository`](crate::repository::ShiftRepository)
//! and writes its mutations as one change set. The calculations they rely on
//! live in [`calculation`](crate::calculation) and never write anything.

mod exchange;
mod lifecycle;
mod missing_attendance;
mod night_split;
mod plan_copy;
mod reconcile;

pub use exchange::{ExchangeReport, exchange_shift, take_over_shift};
pub use lifecycle::{
    AttendanceReport, PlanReport, create_planned_shift, delete_attendance, hide_planned_shift,
    record_attendance, retime_planned_shift,
};
pub use missing_attendance::flag_missing_attendance;
pub use night_split::{CONTINUATION_NOTE, ShiftRecordRef, SplitOutcome, split_night_shift};
pub use plan_copy::{CopyReport, copy_monthly_plan};
pub use reconcile::{
    CarveOut, REASON_REQUIRED_NOTE, ReconcileOptions, ReconcileOutcome, reconcile,
};
