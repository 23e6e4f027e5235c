//! realign-core: circadian realignment planning engine.
//!
//! Given home and destination zones, a first night of sleep and per-day
//! shift caps, computes a day-by-day wake/sleep/bright-light schedule that
//! moves the sleeper onto destination time.

pub mod anchor;
pub mod compute;
pub mod daily;
pub mod error;
pub mod plan;
pub mod projection;
pub mod schedule;
pub mod strategy;
pub mod time;

pub use anchor::{AnchorSource, ResolvedAnchor, resolve_anchor};
pub use compute::{ComputeOptions, ComputedView, PlanMeta, compute_plan, compute_plan_with};
pub use daily::{DailyView, LightPolicy};
pub use error::{Diagnostic, DiagnosticItem, PlanError, ResolveError};
pub use plan::{AnchorKind, AnchorPoint, CorePlan, EventItem, EventTiming, LocalStamp, PlanParams};
pub use projection::{
    DisplayZone, LocalView, ProjectedAnchor, ProjectedDay, ProjectedEvent, ProjectedSpan,
    ProjectedTiming, project, project_day, project_span,
};
pub use schedule::{DateRange, ShiftCaps, WakeSchedule, build_wake_schedule};
pub use strategy::{DaysNeeded, ShiftDirection, ShiftStrategy, resolve_strategy};
