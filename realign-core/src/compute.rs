//! Plan -> view entry point.
//!
//! `compute_plan` is pure: the same plan always yields the same view, so
//! callers may re-run it on every edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::anchor::{self, AnchorSource, ResolvedAnchor};
use crate::daily::{self, DailyView, LightPolicy};
use crate::error::{Diagnostic, DiagnosticItem, PlanError};
use crate::plan::CorePlan;
use crate::projection::{self, DisplayZone, ProjectedAnchor, ProjectedDay, ProjectedEvent};
use crate::schedule::{self, DateRange, ShiftCaps, DEFAULT_MAX_RANGE_DAYS};
use crate::strategy::{self, DaysNeeded, ShiftDirection};
use crate::time;

/// Knobs that are not part of the plan itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeOptions {
    pub display: DisplayZone,
    pub light: LightPolicy,
    /// Upper bound on the number of scheduled dates.
    pub max_range_days: i64,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            display: DisplayZone::Target,
            light: LightPolicy::default(),
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    /// Destination offset minus home offset at the start of sleep.
    pub total_delta_hours: f64,
    pub direction: ShiftDirection,
    pub shift_hours: f64,
    pub days_needed: DaysNeeded,
    /// `None` when the shift can never complete.
    pub aligned_wake: Option<DateTime<Utc>>,
    /// One entry per day; the first is always zero.
    pub per_day_shifts: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedView {
    pub display_zone: DisplayZone,
    /// IANA id of the display zone.
    pub zone: String,
    pub days: Vec<DailyView>,
    /// `days` in the display zone, index for index.
    pub projected_days: Vec<ProjectedDay>,
    pub projected_anchors: Vec<ProjectedAnchor>,
    pub projected_events: Vec<ProjectedEvent>,
    pub meta: PlanMeta,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute the full view, displayed in the target zone.
pub fn compute_plan(plan: &CorePlan) -> Result<ComputedView, PlanError> {
    compute_plan_with(plan, &ComputeOptions::default())
}

/// Compute the full view with explicit display and light options.
pub fn compute_plan_with(
    plan: &CorePlan,
    options: &ComputeOptions,
) -> Result<ComputedView, PlanError> {
    let params = plan.params.validate()?;
    let display = options.display.zone(&params);
    let mut diagnostics = Vec::new();

    let strategy = strategy::resolve_strategy(&params);
    // A finite shift spans at least `days + 1` dates; refuse it before any
    // instant is built that far out.
    if let Some(days) = strategy.days_needed.finite() {
        let spanned = i64::from(days) + 1;
        if spanned > options.max_range_days {
            return Err(PlanError::RangeTooLong {
                days: spanned,
                max: options.max_range_days,
            });
        }
    }
    let aligned_wake = strategy.aligned_wake(&params);

    // Synthesized anchors are local to this call; the caller's list is not touched.
    let initial_wake = time::add_minutes(params.start_sleep, params.sleep_minutes);
    let mut anchors = vec![ResolvedAnchor::synthesized(
        AnchorSource::InitialWake,
        initial_wake,
        params.sleep_minutes,
    )];
    match aligned_wake {
        Some(wake) => anchors.push(ResolvedAnchor::synthesized(
            AnchorSource::AlignedWake,
            wake,
            params.sleep_minutes,
        )),
        None => {
            warn!(
                home = %params.home.name(),
                target = %params.target.name(),
                "shift can never complete with the configured caps"
            );
            diagnostics.push(Diagnostic {
                item: DiagnosticItem::Strategy,
                reason: format!(
                    "a {:+.2}h shift cannot complete at the configured per-day cap; \
                     no aligned wake was added",
                    strategy.shift_hours()
                ),
            });
        }
    }

    let mut projected_anchors = Vec::with_capacity(plan.anchors.len());
    for point in &plan.anchors {
        if let Some(resolved) =
            anchor::resolve_anchor(point, params.target, params.sleep_minutes, &mut diagnostics)
        {
            projected_anchors.push(projection::project_anchor(point, &resolved, display));
            anchors.push(resolved);
        }
    }

    let mut projected_events = Vec::with_capacity(plan.events.len());
    for event in &plan.events {
        match projection::project_event(event, display) {
            Ok(p) => projected_events.push(p),
            Err(e) => {
                warn!(event = %event.id, error = %e, "dropping unresolvable event");
                diagnostics.push(Diagnostic {
                    item: DiagnosticItem::Event {
                        id: event.id.clone(),
                    },
                    reason: e.to_string(),
                });
            }
        }
    }

    let start_date = time::local_date(params.start_sleep, params.target);
    let end_date = anchors
        .iter()
        .map(|a| a.date_in(params.target))
        .max()
        .unwrap_or(start_date);
    let range = DateRange::bounded(start_date, end_date, options.max_range_days)?;

    let caps = ShiftCaps {
        max_later_minutes: params.max_later_minutes,
        max_earlier_minutes: params.max_earlier_minutes,
    };
    let wakes = schedule::build_wake_schedule(&anchors, range, caps, params.target);
    let days =
        daily::build_daily_views(&wakes, params.sleep_minutes, params.target, &options.light);
    debug!(
        days = days.len(),
        anchors = anchors.len(),
        dropped = diagnostics.len(),
        "computed plan"
    );

    Ok(ComputedView {
        display_zone: options.display,
        zone: display.name().to_string(),
        meta: PlanMeta {
            total_delta_hours: strategy.delta_hours,
            direction: strategy.direction,
            shift_hours: strategy.shift_hours(),
            days_needed: strategy.days_needed,
            aligned_wake,
            per_day_shifts: days.iter().map(|d| d.shift_hours).collect(),
        },
        projected_days: days.iter().map(|d| projection::project_day(d, display)).collect(),
        days,
        projected_anchors,
        projected_events,
        diagnostics,
    })
}
