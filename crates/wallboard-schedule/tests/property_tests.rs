//! Property-based tests for schedule time matching and serialization.
//!
//! These tests use proptest to generate arbitrary clock times, weekday sets
//! and schedule documents, and check that the matching rules and the JSON
//! representation hold for all of them.

use chrono::{NaiveDate, NaiveTime};
use proptest::prelude::*;
use wallboard_schedule::{
    ScheduleConfig, ScheduleInput, ScreenSequence, TimeSpecificNavigation, evaluate,
    is_active_day, is_time_match,
};

/// Strategy for minutes since midnight.
fn minute_of_day() -> impl Strategy<Value = u32> {
    0u32..1440
}

/// Strategy for screen identifiers.
fn screen_id() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{3,10}").expect("Failed to create screen id regex strategy")
}

fn sequence() -> impl Strategy<Value = ScreenSequence> {
    (
        prop::string::string_regex("[a-f0-9]{8}").expect("Failed to create id regex strategy"),
        ".{0,20}",
        any::<bool>(),
        prop::collection::vec(screen_id(), 1..5),
        1u32..3600,
        0u32..3600,
    )
        .prop_map(|(id, name, enabled, screens, interval, pause)| ScreenSequence {
            id,
            name,
            enabled,
            screens,
            interval_seconds: interval,
            pause_on_interaction_seconds: pause,
        })
}

fn time_specific() -> impl Strategy<Value = TimeSpecificNavigation> {
    (
        prop::string::string_regex("[a-f0-9]{8}").expect("Failed to create id regex strategy"),
        any::<bool>(),
        screen_id(),
        minute_of_day(),
        1u32..600,
        prop::option::of(prop::collection::vec(0u8..=6, 0..7)),
    )
        .prop_map(
            |(id, enabled, screen, minute, duration, days)| TimeSpecificNavigation {
                id,
                enabled,
                screen,
                time: format!("{:02}:{:02}", minute / 60, minute % 60),
                duration_minutes: duration,
                days,
            },
        )
}

fn clock(minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap()
}

proptest! {
    /// Property: a scheduled time matches exactly the minutes within one
    /// minute of it on the same day.
    #[test]
    fn prop_time_match_is_one_minute_window(scheduled in minute_of_day(), current in minute_of_day()) {
        let text = format!("{:02}:{:02}", scheduled / 60, scheduled % 60);
        let expected = scheduled.abs_diff(current) <= 1;
        prop_assert_eq!(is_time_match(&clock(current), &text), expected);
    }

    /// Property: an empty or absent day set enables every weekday; otherwise
    /// the result is set membership.
    #[test]
    fn prop_active_day_is_membership(days in prop::collection::vec(0u8..=6, 0..7), day in 0u8..=6) {
        prop_assert!(is_active_day(None, day));
        let expected = days.is_empty() || days.contains(&day);
        prop_assert_eq!(is_active_day(Some(days.as_slice()), day), expected);
    }

    /// Property: any schedule survives a JSON round trip unchanged.
    #[test]
    fn prop_schedule_json_roundtrip(
        sequences in prop::collection::vec(sequence(), 0..4),
        overrides in prop::collection::vec(time_specific(), 0..4),
    ) {
        let config = ScheduleConfig { sequences, time_specific: overrides };
        let json = serde_json::to_string(&config).unwrap();
        let restored: ScheduleConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, config);
    }

    /// Property: a selected screen always comes from the schedule.
    #[test]
    fn prop_selection_comes_from_schedule(
        sequences in prop::collection::vec(sequence(), 0..4),
        overrides in prop::collection::vec(time_specific(), 0..4),
        minute in minute_of_day(),
        elapsed in 0i64..100_000,
    ) {
        let config = ScheduleConfig { sequences, time_specific: overrides };
        let now = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap().and_time(clock(minute));
        let input = ScheduleInput {
            rotation_started_at: now - chrono::TimeDelta::seconds(elapsed),
            ..ScheduleInput::at(now)
        };

        if let Some(screen) = evaluate(&config, &input).screen {
            let known = config.sequences.iter().any(|s| s.screens.contains(&screen))
                || config.time_specific.iter().any(|t| t.screen == screen);
            prop_assert!(known);
        }
    }
}
