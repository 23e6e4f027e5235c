//! Projection of canonical instants into a display zone.
//!
//! Renderers consume these values as-is: they never redo zone arithmetic,
//! and cross-midnight spans come with a precomputed day delta.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::anchor::ResolvedAnchor;
use crate::daily::DailyView;
use crate::error::ResolveError;
use crate::plan::{
    AnchorKind, AnchorPoint, EventItem, EventTiming, LocalStamp, ValidatedParams,
};
use crate::time;

/// Which of the plan's two zones a view is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    Home,
    #[default]
    Target,
}

impl DisplayZone {
    pub fn zone(self, params: &ValidatedParams) -> Tz {
        match self {
            DisplayZone::Home => params.home,
            DisplayZone::Target => params.target,
        }
    }
}

impl FromStr for DisplayZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(DisplayZone::Home),
            "target" | "destination" => Ok(DisplayZone::Target),
            other => Err(format!("unknown display zone '{other}' (expected home or target)")),
        }
    }
}

/// An instant together with its wall-clock reading in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalView {
    pub instant: DateTime<Utc>,
    pub zone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Minutes east of UTC at this instant.
    pub offset_minutes: i64,
}

impl LocalView {
    /// `HH:MM` wall-clock label.
    pub fn hhmm(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

pub fn project(instant: DateTime<Utc>, zone: Tz) -> LocalView {
    let local = instant.with_timezone(&zone);
    LocalView {
        instant,
        zone: zone.name().to_string(),
        date: local.date_naive(),
        time: local.time(),
        offset_minutes: time::offset_minutes(instant, zone),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedSpan {
    pub start: LocalView,
    pub end: LocalView,
    /// Local end date minus local start date; `1` renders as "+1 day".
    pub day_delta: i64,
}

pub fn project_span(start: DateTime<Utc>, end: DateTime<Utc>, zone: Tz) -> ProjectedSpan {
    let start = project(start, zone);
    let end = project(end, zone);
    let day_delta = (end.date - start.date).num_days();
    ProjectedSpan {
        start,
        end,
        day_delta,
    }
}

/// One scheduled day's windows in the display zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedDay {
    /// Target-zone date the day is keyed by.
    pub date: NaiveDate,
    /// Sleep start to wake.
    pub sleep: ProjectedSpan,
    /// `None` when the bright-light window collapsed.
    pub bright: Option<ProjectedSpan>,
}

pub fn project_day(day: &DailyView, zone: Tz) -> ProjectedDay {
    ProjectedDay {
        date: day.date,
        sleep: project_span(day.sleep_start, day.wake, zone),
        bright: (!day.bright_collapsed)
            .then(|| project_span(day.bright_start, day.bright_end, zone)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedAnchor {
    pub id: String,
    pub kind: AnchorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The anchor's own stamp.
    pub at: LocalView,
    /// The wake it implies.
    pub wake: LocalView,
}

pub fn project_anchor(
    anchor: &AnchorPoint,
    resolved: &ResolvedAnchor,
    zone: Tz,
) -> ProjectedAnchor {
    ProjectedAnchor {
        id: anchor.id.clone(),
        kind: anchor.kind,
        note: anchor.note.clone(),
        at: project(resolved.at, zone),
        wake: project(resolved.wake, zone),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ProjectedTiming {
    Point { start: LocalView },
    Span(ProjectedSpan),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedEvent {
    pub id: String,
    pub title: String,
    pub timing: ProjectedTiming,
}

fn schedulable_instant(stamp: &LocalStamp) -> Result<DateTime<Utc>, ResolveError> {
    let instant = stamp.to_utc()?;
    if !time::is_schedulable(instant) {
        return Err(ResolveError::OutOfRange(format!("{} {}", stamp.date, stamp.time)));
    }
    Ok(instant)
}

pub fn project_event(event: &EventItem, zone: Tz) -> Result<ProjectedEvent, ResolveError> {
    let timing = match &event.timing {
        EventTiming::Point { start } => ProjectedTiming::Point {
            start: project(schedulable_instant(start)?, zone),
        },
        EventTiming::Span { start, end } => {
            let start = schedulable_instant(start)?;
            let end = schedulable_instant(end)?;
            if end < start {
                return Err(ResolveError::EndBeforeStart);
            }
            ProjectedTiming::Span(project_span(start, end, zone))
        }
    };
    Ok(ProjectedEvent {
        id: event.id.clone(),
        title: event.title.clone(),
        timing,
    })
}
