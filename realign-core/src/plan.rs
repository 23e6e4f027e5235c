//! Plan data model: parameters, anchors and events as supplied by the caller.
//!
//! Field names serialize as camelCase so a stored plan can be fed back in
//! unchanged.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, ResolveError};
use crate::time;

/// A wall-clock reading in a named zone. Kept as text until resolved so that
/// a single bad stamp can be dropped instead of failing the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalStamp {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    /// IANA zone id
    pub zone: String,
}

impl LocalStamp {
    pub fn new(date: impl Into<String>, time: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            zone: zone.into(),
        }
    }

    pub fn to_utc(&self) -> Result<DateTime<Utc>, ResolveError> {
        time::parse_local_to_utc(&self.date, &self.time, &self.zone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    /// The stamp is a wake time.
    Wake,
    /// The stamp is a bedtime; the wake follows after the sleep duration.
    Sleep,
}

/// A user checkpoint pinning the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorPoint {
    pub id: String,
    pub kind: AnchorKind,
    pub at: LocalStamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AnchorPoint {
    pub fn wake(id: impl Into<String>, at: LocalStamp) -> Self {
        Self {
            id: id.into(),
            kind: AnchorKind::Wake,
            at,
            note: None,
        }
    }

    pub fn sleep(id: impl Into<String>, at: LocalStamp) -> Self {
        Self {
            id: id.into(),
            kind: AnchorKind::Sleep,
            at,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// When an event happens. Start and end carry their own zones, e.g. a flight
/// departing in one zone and landing in another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum EventTiming {
    Point { start: LocalStamp },
    Span { start: LocalStamp, end: LocalStamp },
}

/// A user activity shown alongside the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    pub id: String,
    pub title: String,
    pub timing: EventTiming,
}

/// Traveller-level parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParams {
    pub home_zone: String,
    pub target_zone: String,
    pub start_sleep: LocalStamp,
    pub sleep_hours: f64,
    /// Max hours/day the wake time may move later.
    pub max_later_per_day: f64,
    /// Max hours/day the wake time may move earlier.
    pub max_earlier_per_day: f64,
}

/// Everything the engine needs; the unit that is stored and shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorePlan {
    pub params: PlanParams,
    #[serde(default)]
    pub anchors: Vec<AnchorPoint>,
    #[serde(default)]
    pub events: Vec<EventItem>,
}

/// [`PlanParams`] after validation: zones parsed, start resolved, durations
/// in minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedParams {
    pub home: Tz,
    pub target: Tz,
    pub start_sleep: DateTime<Utc>,
    pub sleep_minutes: i64,
    pub max_later_minutes: f64,
    pub max_earlier_minutes: f64,
}

impl PlanParams {
    /// Reject malformed parameters before any computation starts.
    pub fn validate(&self) -> Result<ValidatedParams, PlanError> {
        let home = parse_plan_zone(&self.home_zone)?;
        let target = parse_plan_zone(&self.target_zone)?;

        if !(self.sleep_hours.is_finite() && self.sleep_hours > 0.0 && self.sleep_hours <= 24.0) {
            return Err(PlanError::InvalidSleepHours {
                hours: self.sleep_hours,
            });
        }
        for (direction, hours) in [
            ("later", self.max_later_per_day),
            ("earlier", self.max_earlier_per_day),
        ] {
            if !(hours.is_finite() && hours >= 0.0) {
                return Err(PlanError::InvalidShiftCap { direction, hours });
            }
        }

        let start_sleep = match self.start_sleep.to_utc() {
            Ok(instant) => instant,
            Err(ResolveError::UnknownZone(zone)) => return Err(PlanError::UnknownZone { zone }),
            Err(e) => return Err(PlanError::InvalidStartSleep(e)),
        };
        if !time::is_schedulable(start_sleep) {
            return Err(PlanError::InvalidStartSleep(ResolveError::OutOfRange(format!(
                "{} {}",
                self.start_sleep.date, self.start_sleep.time
            ))));
        }

        Ok(ValidatedParams {
            home,
            target,
            start_sleep,
            sleep_minutes: (self.sleep_hours * 60.0).round() as i64,
            max_later_minutes: self.max_later_per_day * 60.0,
            max_earlier_minutes: self.max_earlier_per_day * 60.0,
        })
    }
}

fn parse_plan_zone(zone: &str) -> Result<Tz, PlanError> {
    time::parse_zone(zone).map_err(|_| PlanError::UnknownZone {
        zone: zone.to_string(),
    })
}
