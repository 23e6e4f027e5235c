//! Anchor resolution: turn checkpoints into canonical wake instants.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Diagnostic, DiagnosticItem, ResolveError};
use crate::plan::{AnchorKind, AnchorPoint};
use crate::time;

/// Where a resolved anchor came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum AnchorSource {
    /// Caller-owned checkpoint, referenced by id.
    User { id: String },
    /// Wake at the end of the first night.
    InitialWake,
    /// Wake once the schedule has fully shifted to the target zone.
    AlignedWake,
}

impl AnchorSource {
    pub fn is_user(&self) -> bool {
        matches!(self, AnchorSource::User { .. })
    }
}

/// An anchor reduced to the instants the engine works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub source: AnchorSource,
    /// Instant of the anchor's own stamp (a bedtime for sleep anchors).
    pub at: DateTime<Utc>,
    pub wake: DateTime<Utc>,
}

impl ResolvedAnchor {
    /// Core-owned anchor defined by its wake; `at` is the bedtime before it.
    pub fn synthesized(source: AnchorSource, wake: DateTime<Utc>, sleep_minutes: i64) -> Self {
        Self {
            source,
            at: time::add_minutes(wake, -sleep_minutes),
            wake,
        }
    }

    /// Calendar date this anchor pins, in the target zone.
    pub fn date_in(&self, target: Tz) -> NaiveDate {
        time::local_date(self.wake, target)
    }
}

/// Resolve one anchor without side effects.
///
/// Instants are zone-independent, so expressing the result in the
/// destination zone is left to the projection layer.
pub fn try_resolve(
    anchor: &AnchorPoint,
    sleep_minutes: i64,
) -> Result<ResolvedAnchor, ResolveError> {
    let at = anchor.at.to_utc()?;
    let wake = match anchor.kind {
        AnchorKind::Wake => Some(at),
        AnchorKind::Sleep => time::checked_add_minutes(at, sleep_minutes),
    }
    .filter(|wake| time::is_schedulable(at) && time::is_schedulable(*wake))
    .ok_or_else(|| {
        ResolveError::OutOfRange(format!("{} {}", anchor.at.date, anchor.at.time))
    })?;
    Ok(ResolvedAnchor {
        source: AnchorSource::User {
            id: anchor.id.clone(),
        },
        at,
        wake,
    })
}

/// Resolve one anchor; a failure is logged, recorded in `diagnostics`, and
/// the anchor is left out.
pub fn resolve_anchor(
    anchor: &AnchorPoint,
    target: Tz,
    sleep_minutes: i64,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedAnchor> {
    match try_resolve(anchor, sleep_minutes) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            warn!(
                anchor = %anchor.id,
                target = %target.name(),
                error = %e,
                "dropping unresolvable anchor"
            );
            diagnostics.push(Diagnostic {
                item: DiagnosticItem::Anchor {
                    id: anchor.id.clone(),
                },
                reason: e.to_string(),
            });
            None
        }
    }
}
