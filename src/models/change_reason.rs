//! Change reason reference data.

use serde::{Deserialize, Serialize};

/// Identifier of a change reason.
pub type ChangeReasonId = u32;

/// Category of a change reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReasonCategory {
    /// The employee was absent or the shift was rescheduled.
    AbsenceOrReschedule,
    /// The employee performed other work outside the plan.
    OtherActivity,
}

/// A human-readable justification for altering a committed schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReason {
    /// Unique identifier.
    pub id: ChangeReasonId,
    /// The category of the reason.
    pub category: ChangeReasonCategory,
    /// Description shown to managers.
    pub description: String,
}
