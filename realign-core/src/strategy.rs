//! Shift strategy: which way to move the wake time, how far, and for how long.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plan::ValidatedParams;
use crate::time::{self, MINUTES_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftDirection {
    Later,
    Earlier,
}

/// Days needed to complete a shift. `Unbounded` when the shift is non-zero
/// but the cap for its direction is zero, or so small that the day count
/// does not fit in a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DaysNeeded {
    Finite(u32),
    Unbounded,
}

impl DaysNeeded {
    pub fn finite(self) -> Option<u32> {
        match self {
            DaysNeeded::Finite(days) => Some(days),
            DaysNeeded::Unbounded => None,
        }
    }

    /// Days to move `shift_minutes` at `cap_minutes` per day.
    pub fn for_shift(shift_minutes: i64, cap_minutes: f64) -> Self {
        if shift_minutes == 0 {
            return DaysNeeded::Finite(0);
        }
        if cap_minutes <= 0.0 {
            return DaysNeeded::Unbounded;
        }
        let days = (shift_minutes.unsigned_abs() as f64 / cap_minutes).ceil();
        if days.is_finite() && days <= f64::from(u32::MAX) {
            DaysNeeded::Finite(days as u32)
        } else {
            DaysNeeded::Unbounded
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStrategy {
    /// Destination offset minus home offset, in hours.
    pub delta_hours: f64,
    pub direction: ShiftDirection,
    /// Signed wake-time move in minutes (positive = later).
    pub shift_minutes: i64,
    pub days_needed: DaysNeeded,
}

impl ShiftStrategy {
    pub fn shift_hours(&self) -> f64 {
        self.shift_minutes as f64 / 60.0
    }

    /// Wake instant once the shift is complete:
    /// `start_sleep + days_needed days + shift + sleep`.
    ///
    /// `None` when the shift never completes or the instant would fall
    /// outside chrono's range.
    pub fn aligned_wake(&self, params: &ValidatedParams) -> Option<DateTime<Utc>> {
        let days = self.days_needed.finite()?;
        let at = time::checked_add_days(params.start_sleep, i64::from(days))?;
        time::checked_add_minutes(at, self.shift_minutes + params.sleep_minutes)
            .filter(|wake| time::is_schedulable(*wake))
    }
}

/// Pick the cheaper of the two ways round the clock. Ties go to `Later`.
pub fn resolve_strategy(params: &ValidatedParams) -> ShiftStrategy {
    let start = params.start_sleep;
    let delta_minutes =
        time::offset_minutes(start, params.target) - time::offset_minutes(start, params.home);

    let later = (-delta_minutes).rem_euclid(MINUTES_PER_DAY);
    let earlier = if later == 0 { 0 } else { later - MINUTES_PER_DAY };

    let later_days = DaysNeeded::for_shift(later, params.max_later_minutes);
    let earlier_days = DaysNeeded::for_shift(earlier, params.max_earlier_minutes);

    let (direction, shift_minutes, days_needed) = if earlier_days < later_days {
        (ShiftDirection::Earlier, earlier, earlier_days)
    } else {
        (ShiftDirection::Later, later, later_days)
    };

    debug!(
        delta_minutes,
        ?direction,
        shift_minutes,
        ?days_needed,
        "resolved shift strategy"
    );

    ShiftStrategy {
        delta_hours: delta_minutes as f64 / 60.0,
        direction,
        shift_minutes,
        days_needed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{LocalStamp, PlanParams};

    fn validated(home: &str, target: &str, later: f64, earlier: f64) -> ValidatedParams {
        PlanParams {
            home_zone: home.into(),
            target_zone: target.into(),
            start_sleep: LocalStamp::new("2026-01-10", "23:00", home),
            sleep_hours: 8.0,
            max_later_per_day: later,
            max_earlier_per_day: earlier,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn westward_nine_hours_goes_later() {
        // Etc/GMT+9 is nine hours behind UTC (POSIX sign convention).
        let p = validated("UTC", "Etc/GMT+9", 1.0, 1.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.delta_hours, -9.0);
        assert_eq!(s.direction, ShiftDirection::Later);
        assert_eq!(s.shift_hours(), 9.0);
        assert_eq!(s.days_needed, DaysNeeded::Finite(9));
    }

    #[test]
    fn eastward_nine_hours_goes_earlier() {
        let p = validated("UTC", "Asia/Tokyo", 1.0, 1.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.delta_hours, 9.0);
        assert_eq!(s.direction, ShiftDirection::Earlier);
        assert_eq!(s.shift_minutes, -9 * 60);
        assert_eq!(s.days_needed, DaysNeeded::Finite(9));
    }

    #[test]
    fn aligned_wake_matches_target_local_wake() {
        let p = validated("UTC", "Asia/Tokyo", 1.0, 1.0);
        let s = resolve_strategy(&p);
        let aligned = s.aligned_wake(&p).unwrap();
        // Home wake 07:00 UTC; aligned wake is 07:00 Tokyo nine days on.
        assert_eq!(time::format_local(aligned, p.target), "2026-01-20 07:00 JST");
    }

    #[test]
    fn equal_cost_ties_resolve_later() {
        // 12h either way at 1h/day.
        let p = validated("UTC", "Etc/GMT-12", 1.0, 1.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.direction, ShiftDirection::Later);
        assert_eq!(s.shift_hours(), 12.0);
        assert_eq!(s.days_needed, DaysNeeded::Finite(12));
    }

    #[test]
    fn asymmetric_caps_change_the_choice() {
        // 9h earlier at 0.5h/day = 18 days; 15h later at 2h/day = 8 days.
        let p = validated("UTC", "Asia/Tokyo", 2.0, 0.5);
        let s = resolve_strategy(&p);
        assert_eq!(s.direction, ShiftDirection::Later);
        assert_eq!(s.shift_hours(), 15.0);
        assert_eq!(s.days_needed, DaysNeeded::Finite(8));
    }

    #[test]
    fn same_zone_needs_no_days() {
        let p = validated("Europe/Paris", "Europe/Berlin", 0.0, 0.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.shift_minutes, 0);
        assert_eq!(s.direction, ShiftDirection::Later);
        assert_eq!(s.days_needed, DaysNeeded::Finite(0));
    }

    #[test]
    fn zero_caps_with_shift_are_unbounded() {
        let p = validated("UTC", "Asia/Tokyo", 0.0, 0.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.days_needed, DaysNeeded::Unbounded);
        assert_eq!(s.direction, ShiftDirection::Later);
        assert!(s.aligned_wake(&p).is_none());
    }

    #[test]
    fn one_sided_zero_cap_forces_other_direction() {
        let p = validated("UTC", "Asia/Tokyo", 1.0, 0.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.direction, ShiftDirection::Later);
        assert_eq!(s.days_needed, DaysNeeded::Finite(15));
    }

    #[test]
    fn vanishing_caps_do_not_saturate() {
        // 9h at 1e-9 h/day is 9e9 days, past u32::MAX.
        let p = validated("UTC", "Asia/Tokyo", 1e-9, 1e-9);
        let s = resolve_strategy(&p);
        assert_eq!(s.days_needed, DaysNeeded::Unbounded);
        assert!(s.aligned_wake(&p).is_none());

        // Fits in a u32, but lands millions of years past chrono's calendar.
        let p = validated("UTC", "Asia/Tokyo", 1e-8, 1e-8);
        let s = resolve_strategy(&p);
        assert!(matches!(s.days_needed, DaysNeeded::Finite(n) if n > 800_000_000));
        assert!(s.aligned_wake(&p).is_none());
    }

    #[test]
    fn fractional_offsets_round_days_up() {
        // Kolkata is UTC+5:30 -> 5.5h earlier at 1h/day = 6 days.
        let p = validated("UTC", "Asia/Kolkata", 1.0, 1.0);
        let s = resolve_strategy(&p);
        assert_eq!(s.direction, ShiftDirection::Earlier);
        assert_eq!(s.shift_minutes, -330);
        assert_eq!(s.days_needed, DaysNeeded::Finite(6));
    }
}
