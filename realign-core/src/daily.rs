//! Per-day view derived from the wake schedule.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::schedule::WakeSchedule;
use crate::time;

/// Offsets that shape the bright-light window around a wake time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightPolicy {
    /// Window opens this long after waking.
    pub wake_offset_minutes: i64,
    /// Window closes this long before the next sleep.
    pub pre_sleep_buffer_minutes: i64,
    /// Where a collapsed window is placed, relative to the wake.
    pub fallback_offset_minutes: i64,
}

impl Default for LightPolicy {
    fn default() -> Self {
        Self {
            wake_offset_minutes: 30,
            pre_sleep_buffer_minutes: 3 * 60,
            fallback_offset_minutes: 3 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyView {
    pub date: NaiveDate,
    pub sleep_start: DateTime<Utc>,
    pub wake: DateTime<Utc>,
    pub bright_start: DateTime<Utc>,
    pub bright_end: DateTime<Utc>,
    /// No usable window: start and end are the same fallback instant.
    pub bright_collapsed: bool,
    /// Sleep start relative to the previous day's + 24h, in hours.
    pub shift_hours: f64,
}

/// Bright-light window for one day, collapsed to a single instant when the
/// clamped bounds cross.
pub fn bright_window(
    wake: DateTime<Utc>,
    next_sleep_start: DateTime<Utc>,
    day: (DateTime<Utc>, DateTime<Utc>),
    policy: &LightPolicy,
) -> (DateTime<Utc>, DateTime<Utc>, bool) {
    let (day_start, day_end) = day;
    let start = day_start.max(time::add_minutes(wake, policy.wake_offset_minutes));
    let end = day_end.min(time::add_minutes(next_sleep_start, -policy.pre_sleep_buffer_minutes));
    if end <= start {
        let fallback = time::add_minutes(wake, policy.fallback_offset_minutes);
        return (fallback, fallback, true);
    }
    (start, end, false)
}

/// Derive one [`DailyView`] per scheduled date, in date order.
pub fn build_daily_views(
    schedule: &WakeSchedule,
    sleep_minutes: i64,
    target: Tz,
    policy: &LightPolicy,
) -> Vec<DailyView> {
    let wakes: Vec<(NaiveDate, DateTime<Utc>)> = schedule.iter().map(|(d, w)| (*d, *w)).collect();
    let mut out = Vec::with_capacity(wakes.len());
    let mut previous_sleep_start: Option<DateTime<Utc>> = None;

    for (i, &(date, wake)) in wakes.iter().enumerate() {
        let sleep_start = time::add_minutes(wake, -sleep_minutes);
        let next_wake = wakes
            .get(i + 1)
            .map_or_else(|| time::add_days(wake, 1), |&(_, w)| w);
        let next_sleep_start = time::add_minutes(next_wake, -sleep_minutes);

        let (bright_start, bright_end, bright_collapsed) =
            bright_window(wake, next_sleep_start, time::day_bounds(date, target), policy);

        let shift_hours = previous_sleep_start
            .map_or(0.0, |prev| time::hours_between(time::add_days(prev, 1), sleep_start));
        previous_sleep_start = Some(sleep_start);

        out.push(DailyView {
            date,
            sleep_start,
            wake,
            bright_start,
            bright_end,
            bright_collapsed,
            shift_hours,
        });
    }

    out
}
