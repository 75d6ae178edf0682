//! Wall-clock matching primitives used by the scheduler.
//!
//! All functions here are pure. Times are compared at minute precision and
//! never wrap across midnight: `23:59` and `00:00` are not adjacent.

use chrono::{Datelike, Timelike};
use wallboard_core::ClockTime;
use wallboard_core::constants::TIME_MATCH_TOLERANCE_MINUTES;

/// Check whether `current` falls inside the ±1 minute window around `scheduled`.
///
/// `scheduled` must be an exact `"HH:MM"` string; anything else never matches.
/// Seconds of `current` are ignored.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use wallboard_schedule::time::is_time_match;
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 30).unwrap();
///
/// assert!(is_time_match(&at(7, 59), "08:00"));
/// assert!(is_time_match(&at(8, 0), "08:00"));
/// assert!(is_time_match(&at(8, 1), "08:00"));
/// assert!(!is_time_match(&at(8, 2), "08:00"));
/// assert!(!is_time_match(&at(23, 59), "00:00"));
/// assert!(!is_time_match(&at(8, 0), "8:00"));
/// ```
pub fn is_time_match<T: Timelike>(current: &T, scheduled: &str) -> bool {
    match scheduled.parse::<ClockTime>() {
        Ok(target) => matches_clock_time(current, target),
        Err(_) => false,
    }
}

/// [`is_time_match`] for an already parsed target.
pub fn matches_clock_time<T: Timelike>(current: &T, target: ClockTime) -> bool {
    minute_of_day(current).abs_diff(target.minutes_of_day()) <= TIME_MATCH_TOLERANCE_MINUTES
}

/// First minute of the day at which [`matches_clock_time`] returns true for `target`.
///
/// This is `target - 1` except at midnight, where the window is clamped to
/// `00:00` because there is no tolerance across the day boundary.
pub fn first_matching_minute(target: ClockTime) -> u32 {
    target
        .minutes_of_day()
        .saturating_sub(TIME_MATCH_TOLERANCE_MINUTES)
}

/// Check whether a weekday is enabled.
///
/// `None` or an empty list means every day.
///
/// # Examples
///
/// ```
/// use wallboard_schedule::time::is_active_day;
///
/// assert!(is_active_day(None, 3));
/// assert!(is_active_day(Some(&[]), 3));
/// assert!(is_active_day(Some(&[1, 3, 5]), 3));
/// assert!(!is_active_day(Some(&[0, 6]), 3));
/// ```
pub fn is_active_day(days: Option<&[u8]>, weekday: u8) -> bool {
    match days {
        None => true,
        Some([]) => true,
        Some(days) => days.contains(&weekday),
    }
}

/// Weekday number with Sunday as 0 and Saturday as 6.
pub fn weekday_number<D: Datelike>(date: &D) -> u8 {
    // num_days_from_sunday is always 0..=6
    date.weekday().num_days_from_sunday() as u8
}

/// Render a countdown as `"Ns"` or `"Mm Ss"`.
///
/// There is no hours unit; long countdowns accumulate minutes.
///
/// # Examples
///
/// ```
/// use wallboard_schedule::time::format_time_remaining;
///
/// assert_eq!(format_time_remaining(45), "45s");
/// assert_eq!(format_time_remaining(120), "2m 0s");
/// assert_eq!(format_time_remaining(3661), "61m 1s");
/// ```
pub fn format_time_remaining(total_seconds: u64) -> String {
    if total_seconds < 60 {
        return format!("{total_seconds}s");
    }

    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}m {seconds}s")
}

fn minute_of_day<T: Timelike>(time: &T) -> u32 {
    time.hour() * 60 + time.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rstest::rstest;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[rstest]
    #[case(at(12, 29), "12:30", true)]
    #[case(at(12, 30), "12:30", true)]
    #[case(at(12, 31), "12:30", true)]
    #[case(at(12, 28), "12:30", false)]
    #[case(at(12, 32), "12:30", false)]
    #[case(at(0, 0), "00:00", true)]
    #[case(at(0, 1), "00:00", true)]
    #[case(at(23, 59), "00:00", false)]
    #[case(at(23, 58), "23:59", true)]
    #[case(at(23, 59), "23:59", true)]
    #[case(at(0, 0), "23:59", false)]
    #[case(at(9, 59), "10:00", true)]
    #[case(at(11, 0), "10:59", true)]
    fn test_is_time_match(#[case] now: NaiveTime, #[case] scheduled: &str, #[case] expected: bool) {
        assert_eq!(is_time_match(&now, scheduled), expected);
    }

    #[test]
    fn test_is_time_match_ignores_seconds() {
        let late = NaiveTime::from_hms_opt(8, 1, 59).unwrap();
        assert!(is_time_match(&late, "08:00"));
    }

    #[rstest]
    #[case("")]
    #[case("8:00")]
    #[case("25:00")]
    #[case("noon")]
    fn test_invalid_schedule_time_never_matches(#[case] scheduled: &str) {
        for hour in 0..24 {
            assert!(!is_time_match(&at(hour, 0), scheduled));
        }
    }

    #[test]
    fn test_first_matching_minute() {
        assert_eq!(first_matching_minute("08:00".parse().unwrap()), 479);
        assert_eq!(first_matching_minute("00:00".parse().unwrap()), 0);
        assert_eq!(first_matching_minute("00:01".parse().unwrap()), 0);
    }

    #[test]
    fn test_is_active_day_all_weekdays() {
        let weekend: &[u8] = &[0, 6];
        for day in 0..=6u8 {
            assert!(is_active_day(None, day));
            assert!(is_active_day(Some(&[]), day));
            assert_eq!(is_active_day(Some(weekend), day), weekend.contains(&day));
        }
    }

    #[test]
    fn test_weekday_number() {
        // 2025-06-01 was a Sunday
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(weekday_number(&sunday), 0);
        assert_eq!(weekday_number(&sunday.succ_opt().unwrap()), 1);
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        assert_eq!(weekday_number(&saturday), 6);
    }

    #[rstest]
    #[case(0, "0s")]
    #[case(45, "45s")]
    #[case(59, "59s")]
    #[case(60, "1m 0s")]
    #[case(90, "1m 30s")]
    #[case(120, "2m 0s")]
    #[case(3661, "61m 1s")]
    fn test_format_time_remaining(#[case] seconds: u64, #[case] expected: &str) {
        assert_eq!(format_time_remaining(seconds), expected);
    }
}
