//! Time utilities: zone-aware instant arithmetic.
//!
//! Instants are `DateTime<Utc>`. Zone offsets are always looked up at the
//! instant in question, so arithmetic across a DST transition stays correct.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::ResolveError;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parse an IANA zone id like "America/Chicago".
pub fn parse_zone(zone: &str) -> Result<Tz, ResolveError> {
    zone.trim()
        .parse::<Tz>()
        .map_err(|_| ResolveError::UnknownZone(zone.to_string()))
}

/// Parse a local date in `YYYY-MM-DD` form.
pub fn parse_local_date(date: &str) -> Result<NaiveDate, ResolveError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ResolveError::InvalidDate(date.to_string()))
}

/// Parse a local wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_local_time(time: &str) -> Result<NaiveTime, ResolveError> {
    let t = time.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .map_err(|_| ResolveError::InvalidTime(time.to_string()))
}

/// Map a wall-clock time in `tz` to an instant.
///
/// A time inside a DST gap is an error; a time inside a DST fold resolves to
/// the earlier of the two candidate instants.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, ResolveError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ResolveError::NonexistentLocalTime {
            local: local.format("%Y-%m-%d %H:%M").to_string(),
            zone: tz.name().to_string(),
        }),
    }
}

/// Parse "2026-02-20" + "23:59" in an IANA zone like "America/Chicago",
/// returning UTC.
pub fn parse_local_to_utc(
    date: &str,
    time: &str,
    zone: &str,
) -> Result<DateTime<Utc>, ResolveError> {
    let tz = parse_zone(zone)?;
    let date = parse_local_date(date)?;
    let time = parse_local_time(time)?;
    local_to_utc(date.and_time(time), tz)
}

/// UTC offset of `tz` at `instant`, in minutes east of UTC.
pub fn offset_minutes(instant: DateTime<Utc>, tz: Tz) -> i64 {
    let seconds = tz
        .offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc();
    i64::from(seconds) / 60
}

/// Calendar date of `instant` as seen in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Signed minute arithmetic on an instant.
pub fn add_minutes(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    instant + Duration::minutes(minutes)
}

/// Signed day arithmetic on an instant. A day is exactly 24h here.
pub fn add_days(instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    instant + Duration::days(days)
}

/// Like [`add_minutes`], but `None` instead of leaving chrono's range.
pub fn checked_add_minutes(instant: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    instant.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Like [`add_days`], but `None` instead of leaving chrono's range.
pub fn checked_add_days(instant: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    instant.checked_add_signed(Duration::try_days(days)?)
}

/// Days of headroom an instant needs from chrono's limits before the engine
/// will step a whole day around it in either zone.
const EDGE_MARGIN_DAYS: i64 = 2;

/// Whether `instant` is far enough from the representable range that day
/// steps and zone conversions around it cannot overflow.
pub fn is_schedulable(instant: DateTime<Utc>) -> bool {
    checked_add_days(instant, EDGE_MARGIN_DAYS).is_some()
        && checked_add_days(instant, -EDGE_MARGIN_DAYS).is_some()
}

/// First instant of `date` in `tz`.
///
/// Some zones skip local midnight on DST days; the day then starts at the
/// first wall-clock time that exists.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut probe = midnight;
    // DST gaps are at most a couple of hours.
    for _ in 0..16 {
        if let Ok(utc) = local_to_utc(probe, tz) {
            return utc;
        }
        probe += Duration::minutes(15);
    }
    Utc.from_utc_datetime(&midnight)
}

/// Half-open bounds `[start, end)` of a local calendar day in `tz`.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date, tz);
    let end = date
        .succ_opt()
        .map_or_else(|| add_days(start, 1), |next| start_of_day(next, tz));
    (start, end)
}

/// Exact difference `later - earlier` in fractional hours.
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// Helper: format an instant as local wall-clock text in `tz`.
pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

/// Helper: format a UTC time into RFC3339.
pub fn to_rfc3339_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chicago_local() {
        // Feb is CST (UTC-6)
        let utc = parse_local_to_utc("2026-02-20", "23:59", "America/Chicago").unwrap();
        assert_eq!(to_rfc3339_utc(utc), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn test_seconds_are_accepted() {
        let utc = parse_local_to_utc("2026-02-20", "06:30:15", "UTC").unwrap();
        assert_eq!(to_rfc3339_utc(utc), "2026-02-20T06:30:15+00:00");
    }

    #[test]
    fn test_unknown_zone() {
        let err = parse_local_to_utc("2026-02-20", "23:59", "Mars/Olympus").unwrap_err();
        assert_eq!(err, ResolveError::UnknownZone("Mars/Olympus".into()));
    }

    #[test]
    fn test_bad_date_and_time() {
        assert!(matches!(
            parse_local_to_utc("2026-02-30", "10:00", "UTC"),
            Err(ResolveError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_local_to_utc("2026-02-20", "25:00", "UTC"),
            Err(ResolveError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_dst_gap_is_rejected() {
        // 2026-03-08 02:30 does not exist in Chicago (spring forward).
        let err = parse_local_to_utc("2026-03-08", "02:30", "America/Chicago").unwrap_err();
        assert!(matches!(err, ResolveError::NonexistentLocalTime { .. }));
    }

    #[test]
    fn test_dst_fold_picks_earlier() {
        // 2026-11-01 01:30 happens twice in Chicago; CDT (UTC-5) comes first.
        let utc = parse_local_to_utc("2026-11-01", "01:30", "America/Chicago").unwrap();
        assert_eq!(to_rfc3339_utc(utc), "2026-11-01T06:30:00+00:00");
    }

    #[test]
    fn test_offset_is_read_per_instant() {
        let tz = parse_zone("America/Chicago").unwrap();
        let before = parse_local_to_utc("2026-03-07", "12:00", "America/Chicago").unwrap();
        assert_eq!(offset_minutes(before, tz), -360);
        let after = add_days(before, 2);
        assert_eq!(offset_minutes(after, tz), -300);
    }

    #[test]
    fn test_checked_arithmetic_stops_at_chrono_limits() {
        let top = DateTime::<Utc>::MAX_UTC;
        assert!(checked_add_minutes(top, 1).is_none());
        assert!(checked_add_days(top, -1).is_some());
        assert!(!is_schedulable(top));
        assert!(!is_schedulable(DateTime::<Utc>::MIN_UTC));
        let now = parse_local_to_utc("2026-02-20", "06:30", "UTC").unwrap();
        assert!(is_schedulable(now));
        assert_eq!(checked_add_days(now, 1), Some(add_days(now, 1)));
    }

    #[test]
    fn test_day_bounds_on_short_day() {
        let tz = parse_zone("America/Chicago").unwrap();
        let date = parse_local_date("2026-03-08").unwrap();
        let (start, end) = day_bounds(date, tz);
        assert_eq!(hours_between(start, end), 23.0);
    }

    #[test]
    fn test_format_local() {
        let tz = parse_zone("Asia/Tokyo").unwrap();
        let utc = parse_local_to_utc("2026-05-01", "22:00", "UTC").unwrap();
        assert_eq!(format_local(utc, tz), "2026-05-02 07:00 JST");
    }
}
