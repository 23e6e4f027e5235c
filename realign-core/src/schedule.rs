//! Wake schedule interpolation.
//!
//! Produces exactly one wake instant per target-zone calendar date. Anchors
//! pin their own dates exactly; the dates in between follow a straight path
//! whose per-day drift is clamped to the shift caps.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::anchor::ResolvedAnchor;
use crate::error::PlanError;
use crate::time::{self, MINUTES_PER_DAY};

/// Date -> wake instant, one entry per date in range.
pub type WakeSchedule = BTreeMap<NaiveDate, DateTime<Utc>>;

pub const DEFAULT_MAX_RANGE_DAYS: i64 = 400;

/// Per-day drift limits, in minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftCaps {
    pub max_later_minutes: f64,
    pub max_earlier_minutes: f64,
}

impl ShiftCaps {
    pub fn clamp(&self, per_day_minutes: f64) -> f64 {
        per_day_minutes.clamp(-self.max_earlier_minutes, self.max_later_minutes)
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, refusing anything longer than `max_days` dates.
    pub fn bounded(start: NaiveDate, end: NaiveDate, max_days: i64) -> Result<Self, PlanError> {
        let end = end.max(start);
        let days = (end - start).num_days() + 1;
        if days > max_days {
            return Err(PlanError::RangeTooLong { days, max: max_days });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The part of `self` that also lies in `[start, end]`, if any.
    fn clip(&self, start: NaiveDate, end: NaiveDate) -> Option<Self> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start <= end).then_some(Self { start, end })
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// `wake` moved `days` days along a line drifting `step_minutes` per day.
/// `None` if the result leaves chrono's range.
fn offset_by_days(wake: DateTime<Utc>, days: i64, step_minutes: f64) -> Option<DateTime<Utc>> {
    let minutes = days as f64 * (MINUTES_PER_DAY as f64 + step_minutes);
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    wake.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

/// Pick the anchor that owns each date.
///
/// Anchors are walked in wake order; the first one on a date keeps it,
/// except that a user anchor always displaces a synthesized one.
fn date_winners(anchors: &[ResolvedAnchor], target: Tz) -> BTreeMap<NaiveDate, &ResolvedAnchor> {
    let mut sorted: Vec<&ResolvedAnchor> = anchors.iter().collect();
    sorted.sort_by_key(|a| a.wake);

    let mut winners: BTreeMap<NaiveDate, &ResolvedAnchor> = BTreeMap::new();
    for anchor in sorted {
        let date = anchor.date_in(target);
        match winners.get(&date) {
            None => {
                winners.insert(date, anchor);
            }
            Some(current) if !current.source.is_user() && anchor.source.is_user() => {
                winners.insert(date, anchor);
            }
            Some(_) => {}
        }
    }
    winners
}

/// Build the wake schedule for `range` from resolved anchors.
pub fn build_wake_schedule(
    anchors: &[ResolvedAnchor],
    range: DateRange,
    caps: ShiftCaps,
    target: Tz,
) -> WakeSchedule {
    let winners = date_winners(anchors, target);
    let mut schedule = WakeSchedule::new();

    for (date, anchor) in &winners {
        if range.contains(*date) {
            schedule.insert(*date, anchor.wake);
        }
    }

    let pinned: Vec<(NaiveDate, &ResolvedAnchor)> = winners.into_iter().collect();
    for pair in pinned.windows(2) {
        let (left_date, left) = pair[0];
        let (right_date, right) = pair[1];
        let intervals = (right_date - left_date).num_days();
        if intervals < 2 {
            continue;
        }

        // Whole seconds keep the drift exact for anchors far apart.
        let shift_seconds = (right.wake - left.wake).num_seconds() - intervals * 86_400;
        let raw = shift_seconds as f64 / 60.0 / intervals as f64;
        let step = caps.clamp(raw);
        debug!(%left_date, %right_date, intervals, raw, step, "interpolating segment");

        // Only the dates strictly inside the segment that are also in range.
        let (first, last) = (left_date + Duration::days(1), right_date - Duration::days(1));
        let Some(inner) = range.clip(first, last) else {
            continue;
        };
        for date in inner.dates() {
            if schedule.contains_key(&date) {
                continue;
            }
            let i = (date - left_date).num_days();
            if let Some(wake) = offset_by_days(left.wake, i, step) {
                schedule.insert(date, wake);
            }
        }
    }

    if schedule.is_empty() {
        // Every anchor lies outside the range; extend the nearest one.
        let nearest = pinned
            .iter()
            .rev()
            .find(|(date, _)| *date < range.start)
            .or_else(|| pinned.first());
        let Some((date, anchor)) = nearest else {
            return schedule;
        };
        let days = (range.start - *date).num_days();
        schedule.insert(range.start, time::add_days(anchor.wake, days));
    }

    // Forward-fill gaps from the previous day.
    let mut previous: Option<DateTime<Utc>> = None;
    for date in range.dates() {
        match schedule.get(&date) {
            Some(wake) => previous = Some(*wake),
            None => {
                if let Some(prev) = previous {
                    let wake = time::add_days(prev, 1);
                    schedule.insert(date, wake);
                    previous = Some(wake);
                }
            }
        }
    }

    // Back-fill any leading dates from the first assigned one.
    if let Some((&first_date, &first_wake)) = schedule.iter().next() {
        let mut date = first_date;
        let mut wake = first_wake;
        while date > range.start {
            date = date.pred_opt().unwrap_or(range.start);
            wake = time::add_days(wake, -1);
            schedule.insert(date, wake);
        }
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorSource;
    use chrono::TimeZone;

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn user(id: &str, wake: DateTime<Utc>) -> ResolvedAnchor {
        ResolvedAnchor {
            source: AnchorSource::User { id: id.into() },
            at: wake,
            wake,
        }
    }

    fn caps(later_h: f64, earlier_h: f64) -> ShiftCaps {
        ShiftCaps {
            max_later_minutes: later_h * 60.0,
            max_earlier_minutes: earlier_h * 60.0,
        }
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::bounded(date(start), date(end), DEFAULT_MAX_RANGE_DAYS).unwrap()
    }

    #[test]
    fn interpolates_within_cap() {
        let anchors = vec![user("a", utc(1, 7, 0)), user("b", utc(5, 11, 0))];
        let s = build_wake_schedule(&anchors, range(1, 5), caps(2.0, 2.0), Tz::UTC);
        assert_eq!(s.len(), 5);
        assert_eq!(s[&date(2)], utc(2, 8, 0));
        assert_eq!(s[&date(3)], utc(3, 9, 0));
        assert_eq!(s[&date(4)], utc(4, 10, 0));
        assert_eq!(s[&date(5)], utc(5, 11, 0));
    }

    #[test]
    fn clamps_step_but_keeps_right_anchor_exact() {
        let anchors = vec![user("a", utc(1, 7, 0)), user("b", utc(5, 15, 0))];
        let s = build_wake_schedule(&anchors, range(1, 5), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s[&date(2)], utc(2, 8, 0));
        assert_eq!(s[&date(3)], utc(3, 9, 0));
        assert_eq!(s[&date(4)], utc(4, 10, 0));
        assert_eq!(s[&date(5)], utc(5, 15, 0));
    }

    #[test]
    fn clamps_earlier_drift() {
        let anchors = vec![user("a", utc(1, 9, 0)), user("b", utc(4, 3, 0))];
        let s = build_wake_schedule(&anchors, range(1, 4), caps(3.0, 0.5), Tz::UTC);
        assert_eq!(s[&date(2)], utc(2, 8, 30));
        assert_eq!(s[&date(3)], utc(3, 8, 0));
        assert_eq!(s[&date(4)], utc(4, 3, 0));
    }

    #[test]
    fn fractional_steps_are_rounded_consistently() {
        // 1h over 3 intervals = 20 min/day.
        let anchors = vec![user("a", utc(1, 7, 0)), user("b", utc(4, 8, 0))];
        let s = build_wake_schedule(&anchors, range(1, 4), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s[&date(2)], utc(2, 7, 20));
        assert_eq!(s[&date(3)], utc(3, 7, 40));
    }

    #[test]
    fn same_date_first_sorted_user_anchor_wins() {
        let anchors = vec![
            user("late", utc(1, 9, 0)),
            user("early", utc(1, 6, 0)),
            user("end", utc(3, 6, 0)),
        ];
        let s = build_wake_schedule(&anchors, range(1, 3), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s[&date(1)], utc(1, 6, 0));
        assert_eq!(s[&date(2)], utc(2, 6, 0));
    }

    #[test]
    fn user_anchor_displaces_synthesized_on_same_date() {
        let anchors = vec![
            ResolvedAnchor::synthesized(AnchorSource::InitialWake, utc(1, 7, 0), 480),
            user("u", utc(1, 10, 0)),
        ];
        let s = build_wake_schedule(&anchors, range(1, 1), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s[&date(1)], utc(1, 10, 0));
    }

    #[test]
    fn back_fills_leading_dates() {
        let anchors = vec![user("a", utc(3, 7, 0)), user("b", utc(4, 7, 30))];
        let s = build_wake_schedule(&anchors, range(1, 4), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s.len(), 4);
        assert_eq!(s[&date(1)], utc(1, 7, 0));
        assert_eq!(s[&date(2)], utc(2, 7, 0));
    }

    #[test]
    fn forward_fills_trailing_dates() {
        let anchors = vec![user("a", utc(1, 7, 0))];
        let s = build_wake_schedule(&anchors, range(1, 3), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s[&date(3)], utc(3, 7, 0));
    }

    #[test]
    fn anchors_before_range_are_extended() {
        let anchors = vec![user("a", utc(1, 7, 0))];
        let s = build_wake_schedule(&anchors, range(4, 5), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s.len(), 2);
        assert_eq!(s[&date(4)], utc(4, 7, 0));
        assert_eq!(s[&date(5)], utc(5, 7, 0));
    }

    #[test]
    fn out_of_range_anchor_still_shapes_interpolation() {
        let anchors = vec![user("a", utc(1, 7, 0)), user("b", utc(5, 11, 0))];
        let s = build_wake_schedule(&anchors, range(3, 5), caps(2.0, 2.0), Tz::UTC);
        assert_eq!(s.len(), 3);
        assert_eq!(s[&date(3)], utc(3, 9, 0));
    }

    #[test]
    fn distant_left_anchor_only_fills_dates_in_range() {
        let ancient = NaiveDate::from_ymd_opt(-200_000, 1, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
            .and_utc();
        let anchors = vec![user("ancient", ancient), user("b", utc(5, 7, 0))];
        let s = build_wake_schedule(&anchors, range(3, 5), caps(1.0, 1.0), Tz::UTC);
        assert_eq!(s.len(), 3);
        assert_eq!(s[&date(3)], utc(3, 7, 0));
        assert_eq!(s[&date(4)], utc(4, 7, 0));
        assert_eq!(s[&date(5)], utc(5, 7, 0));
    }

    #[test]
    fn segment_clipping() {
        let r = range(3, 6);
        assert_eq!(r.clip(date(1), date(4)), Some(range(3, 4)));
        assert_eq!(r.clip(date(5), date(9)), Some(range(5, 6)));
        assert_eq!(r.clip(date(7), date(9)), None);
    }

    #[test]
    fn no_anchors_yields_empty_schedule() {
        let s = build_wake_schedule(&[], range(1, 3), caps(1.0, 1.0), Tz::UTC);
        assert!(s.is_empty());
    }

    #[test]
    fn dates_follow_target_zone() {
        // 22:00 UTC is already the next day in Tokyo.
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        let anchors = vec![user("a", utc(1, 22, 0)), user("b", utc(3, 22, 0))];
        let s = build_wake_schedule(
            &anchors,
            DateRange::bounded(date(2), date(4), 10).unwrap(),
            caps(1.0, 1.0),
            tokyo,
        );
        assert_eq!(s[&date(2)], utc(1, 22, 0));
        assert_eq!(s[&date(3)], utc(2, 22, 0));
        assert_eq!(s[&date(4)], utc(3, 22, 0));
    }

    #[test]
    fn rebuild_is_identical() {
        let anchors = vec![
            user("a", utc(1, 7, 0)),
            user("b", utc(9, 13, 17)),
            user("c", utc(5, 2, 0)),
        ];
        let a = build_wake_schedule(&anchors, range(1, 9), caps(1.5, 0.75), Tz::UTC);
        let b = build_wake_schedule(&anchors, range(1, 9), caps(1.5, 0.75), Tz::UTC);
        assert_eq!(a, b);
    }

    #[test]
    fn range_guard() {
        let err = DateRange::bounded(date(1), date(31), 10).unwrap_err();
        assert_eq!(err, PlanError::RangeTooLong { days: 31, max: 10 });
        assert_eq!(range(1, 3).dates().count(), 3);
    }
}
