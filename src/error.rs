//! Error types for the WorkTrack time-accounting engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every rejected operation. None of them are fatal: each one hands
//! control back to the caller, which decides whether to retry with corrected
//! input or surface the problem to a human.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

/// Formats an optional time-of-day for error messages.
fn show_time(time: &Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// The main error type for the engine.
///
/// # Example
///
/// ```
/// use worktrack_engine::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::MissingCalendarDay {
///     date: NaiveDate::from_ymd_opt(2031, 1, 1).unwrap(),
/// };
/// assert_eq!(error.to_string(), "No calendar day entry for 2031-01-01");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A resolved interval was malformed or had a non-positive duration.
    #[error(
        "Invalid interval on {date} ({}-{}): {message}",
        show_time(start),
        show_time(end)
    )]
    InvalidInterval {
        /// The date the interval is anchored to.
        date: NaiveDate,
        /// The raw start time, if one was supplied.
        start: Option<NaiveTime>,
        /// The raw end time, if one was supplied.
        end: Option<NaiveTime>,
        /// What made the interval invalid.
        message: String,
    },

    /// A referenced date has no entry in the calendar catalog.
    #[error("No calendar day entry for {date}")]
    MissingCalendarDay {
        /// The date that was looked up.
        date: NaiveDate,
    },

    /// A candidate shift overlaps an existing committed shift.
    #[error("Schedule conflict with shift {conflicting_shift} ({shift_type}) on {date}: {start} - {end}")]
    ScheduleConflict {
        /// The id of the shift that collides with the candidate.
        conflicting_shift: Uuid,
        /// Display name of the colliding shift's type.
        shift_type: String,
        /// The date of the colliding shift.
        date: NaiveDate,
        /// Resolved start of the colliding shift.
        start: NaiveDateTime,
        /// Resolved end of the colliding shift.
        end: NaiveDateTime,
    },

    /// A committed schedule was altered without a justification.
    #[error("Change reason required for record {record_id}: {message}")]
    MissingChangeReason {
        /// The record whose change was rejected.
        record_id: Uuid,
        /// A description of the attempted change.
        message: String,
    },

    /// An identical carve-out already exists. Never surfaced to callers.
    #[error("Synthetic record already exists for employee '{employee_id}' on {date}: {start} - {end}")]
    DuplicateSyntheticRecord {
        /// The employee owning the carve-out.
        employee_id: String,
        /// The date of the carve-out.
        date: NaiveDate,
        /// Start of the carve-out.
        start: NaiveTime,
        /// End of the carve-out.
        end: NaiveTime,
    },

    /// The storage unique constraint on (employee, date, start, end) was violated.
    #[error(
        "Duplicate {kind} for employee '{employee_id}' on {date} ({}-{})",
        show_time(start),
        show_time(end)
    )]
    DuplicateRecord {
        /// The kind of record ("planned shift" or "attendance").
        kind: &'static str,
        /// The employee owning the record.
        employee_id: String,
        /// The record date.
        date: NaiveDate,
        /// The record start time.
        start: Option<NaiveTime>,
        /// The record end time.
        end: Option<NaiveTime>,
    },

    /// A record or reference-data entry was not found.
    #[error("{kind} not found: {id}")]
    RecordNotFound {
        /// The kind of record that was looked up.
        kind: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// An attendance record has no originating planned shift to reconcile against.
    #[error("Attendance {attendance_id} is not linked to a planned shift")]
    UnlinkedAttendance {
        /// The attendance record.
        attendance_id: Uuid,
    },

    /// A shift exchange between two employees was rejected.
    #[error("Invalid exchange of shift {shift_id}: {message}")]
    InvalidExchange {
        /// The colleague's planned shift being taken over.
        shift_id: Uuid,
        /// Why the exchange was rejected.
        message: String,
    },

    /// A year/month pair does not denote a calendar month.
    #[error("Invalid month {year}-{month}")]
    InvalidMonth {
        /// The year.
        year: i32,
        /// The month number.
        month: u32,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is semantically inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
