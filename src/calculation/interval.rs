//! Interval resolution.
//!
//! Turns a date plus raw clock times into a canonical `[start, end)` datetime
//! pair and an elapsed duration in hours, applying the midnight-crossing rule
//! and the fixed-duration rule of the shift type.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ShiftType, TimedRecord};
use crate::repository::ShiftRepository;

const SECONDS_PER_HOUR: i64 = 3600;

/// Converts whole seconds to decimal hours.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::seconds_to_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(seconds_to_hours(5400), Decimal::new(15, 1));
/// ```
pub fn seconds_to_hours(seconds: i64) -> Decimal {
    Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
}

/// A shift interval anchored to its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInterval {
    /// The date the record is anchored to.
    pub date: NaiveDate,
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
    /// Accounted duration in hours. Equals the elapsed time unless the shift
    /// type has a fixed duration.
    pub duration_hours: Decimal,
}

impl ResolvedInterval {
    /// Elapsed seconds between start and end.
    pub fn elapsed_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Returns true when the two intervals share any time. Touching intervals
    /// do not overlap.
    pub fn overlaps(&self, other: &ResolvedInterval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Resolves raw clock times into a canonical interval.
///
/// Missing times fall back to the shift type's nominal times. When the end is
/// not after the start the shift crosses midnight and the end moves to the next
/// day; an end of exactly 00:00 always belongs to the next day. A shift type
/// with a fixed duration keeps its nominal duration regardless of clock times,
/// and a record with no times at all is placed at 00:00 for that duration.
///
/// # Arguments
///
/// * `date` - The date the record is anchored to
/// * `start` - Raw start time
/// * `end` - Raw end time
/// * `shift_type` - The record's shift type, if any
///
/// # Returns
///
/// The resolved interval, or [`EngineError::InvalidInterval`] when the times
/// are missing or the elapsed time is not positive.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::resolve_interval;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
/// let interval = resolve_interval(
///     date,
///     NaiveTime::from_hms_opt(22, 0, 0),
///     NaiveTime::from_hms_opt(6, 0, 0),
///     None,
/// ).unwrap();
///
/// assert_eq!(interval.duration_hours, Decimal::new(8, 0));
/// assert_eq!(interval.end.date(), NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
/// ```
pub fn resolve_interval(
    date: NaiveDate,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    shift_type: Option<&ShiftType>,
) -> EngineResult<ResolvedInterval> {
    let start = start.or_else(|| shift_type.and_then(|t| t.start_time));
    let end = end.or_else(|| shift_type.and_then(|t| t.end_time));
    let fixed = shift_type.and_then(ShiftType::fixed_duration);

    let invalid = |message: &str| EngineError::InvalidInterval {
        date,
        start,
        end,
        message: message.to_string(),
    };

    let (start_dt, end_dt) = match (start, end) {
        (Some(start_time), Some(end_time)) => {
            let start_dt = date.and_time(start_time);
            let crosses_midnight = end_time < start_time || end_time == NaiveTime::MIN;
            if end_time == start_time && end_time != NaiveTime::MIN {
                return Err(invalid("start and end are equal"));
            }
            let end_date = if crosses_midnight {
                date.checked_add_days(Days::new(1))
                    .ok_or_else(|| invalid("date out of range"))?
            } else {
                date
            };
            (start_dt, end_date.and_time(end_time))
        }
        (None, None) => match fixed {
            Some(hours) => {
                let start_dt = date.and_time(NaiveTime::MIN);
                let seconds = (hours * Decimal::from(SECONDS_PER_HOUR))
                    .trunc()
                    .to_i64()
                    .ok_or_else(|| invalid("fixed duration out of range"))?;
                (start_dt, start_dt + chrono::Duration::seconds(seconds))
            }
            None => return Err(invalid("start and end time are required")),
        },
        (None, Some(_)) => return Err(invalid("start time is required")),
        (Some(_), None) => return Err(invalid("end time is required")),
    };

    let elapsed = (end_dt - start_dt).num_seconds();
    if elapsed <= 0 {
        return Err(invalid("duration must be positive"));
    }

    Ok(ResolvedInterval {
        date,
        start: start_dt,
        end: end_dt,
        duration_hours: fixed.unwrap_or_else(|| seconds_to_hours(elapsed)),
    })
}

/// Resolves a stored record, looking up its shift type in the repository.
pub fn resolve_record<S, R>(repo: &S, record: &R) -> EngineResult<ResolvedInterval>
where
    S: ShiftRepository + ?Sized,
    R: TimedRecord,
{
    let shift_type = repo.shift_type_for(record.shift_type_id())?;
    resolve_interval(
        record.date(),
        record.start_time(),
        record.end_time(),
        shift_type,
    )
}
