//! Day segmentation and night overlap.
//!
//! This module splits an interval at midnight boundaries into per-calendar-day
//! slices, classifies each slice against the calendar catalog, and measures how
//! much of an interval falls inside the night window. Both operations accept an
//! optional [`MonthClip`] so that an interval crossing a month boundary is
//! attributed to each month exactly once.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarCatalog, month_bounds};
use crate::config::NightWindow;
use crate::error::{EngineError, EngineResult};

/// A `[start, end)` window intervals are intersected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthClip {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
}

impl MonthClip {
    /// The clip covering a whole calendar month.
    ///
    /// # Example
    ///
    /// ```
    /// use worktrack_engine::calculation::MonthClip;
    /// use chrono::NaiveDate;
    ///
    /// let clip = MonthClip::for_month(2025, 5).unwrap();
    /// assert_eq!(clip.start, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
    /// assert_eq!(clip.end, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
    /// ```
    pub fn for_month(year: i32, month: u32) -> EngineResult<Self> {
        let (first, last) = month_bounds(year, month)?;
        let after = last
            .checked_add_days(Days::new(1))
            .ok_or(EngineError::InvalidMonth { year, month })?;
        Ok(Self {
            start: first.and_time(NaiveTime::MIN),
            end: after.and_time(NaiveTime::MIN),
        })
    }

    /// Intersects `[start, end)` with the clip; `None` when nothing remains.
    pub fn intersect(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        intersect(start, end, self.start, self.end)
    }
}

/// The part of an interval that falls on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySegment {
    /// The calendar date of the slice.
    pub date: NaiveDate,
    /// Slice start.
    pub start: NaiveDateTime,
    /// Slice end (at most the following midnight).
    pub end: NaiveDateTime,
    /// Length of the slice in seconds.
    pub seconds: i64,
    /// Weekday of the slice's date.
    pub weekday: Weekday,
    /// Whether the date is a Saturday or Sunday.
    pub is_weekend: bool,
    /// Whether the date is a public holiday.
    pub is_holiday: bool,
}

fn intersect(
    start: NaiveDateTime,
    end: NaiveDateTime,
    other_start: NaiveDateTime,
    other_end: NaiveDateTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let lo = start.max(other_start);
    let hi = end.min(other_end);
    (lo < hi).then_some((lo, hi))
}

/// Splits `[start, end)` at every midnight it crosses.
///
/// Returns chronologically ordered, non-overlapping slices whose lengths sum
/// to the full interval. An empty or reversed interval yields no slices.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::split_by_day;
/// use chrono::NaiveDateTime;
///
/// let start = NaiveDateTime::parse_from_str("2025-06-10 21:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let end = NaiveDateTime::parse_from_str("2025-06-11 06:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// let slices = split_by_day(start, end);
/// assert_eq!(slices.len(), 2);
/// assert_eq!((slices[0].1 - slices[0].0).num_hours(), 3);
/// assert_eq!((slices[1].1 - slices[1].0).num_hours(), 6);
/// ```
pub fn split_by_day(start: NaiveDateTime, end: NaiveDateTime) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut slices = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let next_midnight = match cursor.date().checked_add_days(Days::new(1)) {
            Some(next) => next.and_time(NaiveTime::MIN),
            None => end,
        };
        let slice_end = next_midnight.min(end);
        slices.push((cursor, slice_end));
        cursor = slice_end;
    }

    slices
}

/// Segments an interval by calendar day and classifies every slice.
///
/// # Arguments
///
/// * `start` - Interval start
/// * `end` - Interval end (exclusive)
/// * `clip` - Optional month clip applied before splitting
/// * `catalog` - The calendar catalog used for weekend and holiday flags
///
/// # Returns
///
/// The classified slices, or [`EngineError::MissingCalendarDay`] if any
/// touched date is absent from the catalog.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::segment;
/// use worktrack_engine::calendar::{CalendarCatalog, HolidayRules};
/// use chrono::NaiveDateTime;
///
/// let catalog = CalendarCatalog::generate(2025, 2025, &HolidayRules::default()).unwrap();
/// // Saturday evening into Sunday morning
/// let start = NaiveDateTime::parse_from_str("2025-06-14 22:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let end = NaiveDateTime::parse_from_str("2025-06-15 06:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// let segments = segment(start, end, None, &catalog).unwrap();
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].seconds, 2 * 3600);
/// assert!(segments[1].is_weekend);
/// ```
pub fn segment(
    start: NaiveDateTime,
    end: NaiveDateTime,
    clip: Option<&MonthClip>,
    catalog: &CalendarCatalog,
) -> EngineResult<Vec<DaySegment>> {
    let (start, end) = match clip {
        Some(clip) => match clip.intersect(start, end) {
            Some(bounds) => bounds,
            None => return Ok(Vec::new()),
        },
        None => (start, end),
    };

    split_by_day(start, end)
        .into_iter()
        .map(|(slice_start, slice_end)| {
            let day = catalog.day(slice_start.date())?;
            Ok(DaySegment {
                date: day.date,
                start: slice_start,
                end: slice_end,
                seconds: (slice_end - slice_start).num_seconds(),
                weekday: day.date.weekday(),
                is_weekend: day.is_weekend,
                is_holiday: day.is_holiday,
            })
        })
        .collect()
}

/// Seconds of `[start, end)` that fall inside the night window.
///
/// Every window opening on a date from the day before `start` through the day
/// of `end` is intersected with the interval (and with `clip`, when given) and
/// the overlaps are summed.
///
/// # Example
///
/// ```
/// use worktrack_engine::calculation::night_overlap_seconds;
/// use worktrack_engine::config::NightWindow;
/// use chrono::NaiveDateTime;
///
/// let start = NaiveDateTime::parse_from_str("2025-06-10 20:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let end = NaiveDateTime::parse_from_str("2025-06-11 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// assert_eq!(night_overlap_seconds(start, end, None, &NightWindow::default()), 8 * 3600);
/// ```
pub fn night_overlap_seconds(
    start: NaiveDateTime,
    end: NaiveDateTime,
    clip: Option<&MonthClip>,
    window: &NightWindow,
) -> i64 {
    let (start, end) = match clip {
        Some(clip) => match clip.intersect(start, end) {
            Some(bounds) => bounds,
            None => return 0,
        },
        None => (start, end),
    };
    if start >= end {
        return 0;
    }

    let mut total = 0;
    let mut date = start.date().pred_opt().unwrap_or(start.date());
    let last = end.date();

    while date <= last {
        let (window_start, window_end) = window.on(date);
        if let Some((lo, hi)) = intersect(start, end, window_start, window_end) {
            total += (hi - lo).num_seconds();
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    total
}
