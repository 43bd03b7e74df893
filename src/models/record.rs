//! Shared view over timed shift records.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::ShiftTypeId;

/// A record carrying an employee, a date, an optional shift type and raw
/// clock times. Implemented by both planned shifts and attendance records so
/// interval resolution and night splitting can treat them alike.
pub trait TimedRecord {
    /// The record identifier.
    fn record_id(&self) -> Uuid;
    /// The owning employee.
    fn employee_id(&self) -> &str;
    /// The calendar date the record is anchored to.
    fn date(&self) -> NaiveDate;
    /// The shift type, if any.
    fn shift_type_id(&self) -> Option<ShiftTypeId>;
    /// Raw start time.
    fn start_time(&self) -> Option<NaiveTime>;
    /// Raw end time.
    fn end_time(&self) -> Option<NaiveTime>;
}
