//! Error types for realign-core.
//!
//! Two tiers: [`PlanError`] aborts a computation, [`ResolveError`] only drops
//! the single anchor or event it was raised for.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal input error. Returned by plan validation and `compute_plan`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A plan-level zone id is not in the IANA database.
    #[error("unknown time zone: {zone}")]
    UnknownZone { zone: String },

    /// Sleep duration outside (0, 24] hours.
    #[error("invalid sleep duration: {hours}h (must be > 0 and <= 24)")]
    InvalidSleepHours { hours: f64 },

    /// Negative or non-finite per-day shift cap.
    #[error("invalid max {direction} shift: {hours}h/day (must be finite and >= 0)")]
    InvalidShiftCap { direction: &'static str, hours: f64 },

    /// The start-of-sleep stamp could not be turned into an instant.
    #[error("invalid start of sleep: {0}")]
    InvalidStartSleep(#[source] ResolveError),

    /// The date range driven by anchor dates is larger than allowed.
    #[error("schedule range of {days} days exceeds the limit of {max} days")]
    RangeTooLong { days: i64, max: i64 },
}

/// Per-item resolution error. Logged and recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid time '{0}' (expected HH:MM or HH:MM:SS)")]
    InvalidTime(String),

    #[error("unknown time zone: {0}")]
    UnknownZone(String),

    /// Local time falls into a DST gap.
    #[error("local time {local} does not exist in {zone}")]
    NonexistentLocalTime { local: String, zone: String },

    #[error("event ends before it starts")]
    EndBeforeStart,

    /// The stamp, or the wake it implies, is too close to the limits of
    /// the supported calendar.
    #[error("{0} is outside the supported date range")]
    OutOfRange(String),
}

/// What a [`Diagnostic`] is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticItem {
    Anchor { id: String },
    Event { id: String },
    /// The shift strategy itself, e.g. a shift that can never complete.
    Strategy,
}

/// A recoverable problem noticed during computation. The item it names was
/// left out of the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub item: DiagnosticItem,
    pub reason: String,
}
