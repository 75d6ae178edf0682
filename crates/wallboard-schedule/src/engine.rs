//! Pure screen selection.
//!
//! [`evaluate`] decides which screen the kiosk shows from the schedule, the
//! current wall-clock time and the transient interaction state. It performs
//! no I/O and owns no state, so callers drive it from whatever tick they like.
//!
//! # Priority
//!
//! 1. An active time-specific override (first in list order wins).
//! 2. An interaction pause: the displayed screen is kept.
//! 3. Rotation of the active sequence.
//! 4. Idle: nothing to show.
//!
//! # Override Windows
//!
//! An override opens at the first minute [`is_time_match`] accepts for its
//! time (one minute early, clamped to midnight) and stays open for
//! `durationMinutes`. Windows may run past midnight; the weekday filter is
//! applied to the day the window opened.
//!
//! [`is_time_match`]: crate::time::is_time_match

use chrono::{Days, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use wallboard_core::constants::MINUTES_PER_DAY;

use crate::model::{ScheduleConfig, TimeSpecificNavigation};
use crate::time::{first_matching_minute, weekday_number};

/// Longest look-back, in days, when searching for an override window that
/// opened before today.
const MAX_LOOKBACK_DAYS: u64 = 7;

/// Everything [`evaluate`] needs besides the schedule itself.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleInput<'a> {
    /// Local wall-clock time.
    pub now: NaiveDateTime,

    /// When the current rotation started.
    pub rotation_started_at: NaiveDateTime,

    /// Most recent user interaction, if any.
    pub last_interaction_at: Option<NaiveDateTime>,

    /// Screen currently on display, used to hold position during a pause.
    pub displayed_screen: Option<&'a str>,
}

impl<'a> ScheduleInput<'a> {
    /// Input for a rotation that starts at `now` with no interaction history.
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            rotation_started_at: now,
            last_interaction_at: None,
            displayed_screen: None,
        }
    }
}

/// Why a screen was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionSource {
    Override {
        id: String,
        remaining_seconds: u64,
    },
    Paused {
        sequence_id: String,
        remaining_seconds: u64,
    },
    Rotation {
        sequence_id: String,
        index: usize,
        next_change_in_seconds: u64,
    },
    Idle,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenSelection {
    /// Screen to display, `None` when idle.
    pub screen: Option<String>,
    pub source: SelectionSource,
}

impl ScreenSelection {
    fn idle() -> Self {
        Self {
            screen: None,
            source: SelectionSource::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.source, SelectionSource::Idle)
    }

    pub fn is_override(&self) -> bool {
        matches!(self.source, SelectionSource::Override { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.source, SelectionSource::Paused { .. })
    }
}

/// Select the screen to display.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wallboard_schedule::{ScheduleConfig, ScheduleInput, evaluate};
///
/// let config = ScheduleConfig::default_config();
/// let now = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();
///
/// let selection = evaluate(&config, &ScheduleInput::at(now));
/// assert_eq!(selection.screen.as_deref(), Some("calendar"));
/// ```
pub fn evaluate(config: &ScheduleConfig, input: &ScheduleInput<'_>) -> ScreenSelection {
    if let Some((entry, remaining_seconds)) = active_override(config, input.now) {
        return ScreenSelection {
            screen: Some(entry.screen.clone()),
            source: SelectionSource::Override {
                id: entry.id.clone(),
                remaining_seconds,
            },
        };
    }

    let Some(sequence) = config.active_sequence() else {
        return ScreenSelection::idle();
    };

    if let (Some(displayed), Some(remaining_seconds)) = (
        input.displayed_screen,
        pause_remaining(
            sequence.pause_on_interaction_seconds,
            input.last_interaction_at,
            input.now,
        ),
    ) {
        return ScreenSelection {
            screen: Some(displayed.to_string()),
            source: SelectionSource::Paused {
                sequence_id: sequence.id.clone(),
                remaining_seconds,
            },
        };
    }

    let interval = u64::from(sequence.interval_seconds);
    let elapsed = seconds_between(input.rotation_started_at, input.now);
    let index = ((elapsed / interval) % sequence.screens.len() as u64) as usize;

    ScreenSelection {
        screen: Some(sequence.screens[index].clone()),
        source: SelectionSource::Rotation {
            sequence_id: sequence.id.clone(),
            index,
            next_change_in_seconds: interval - elapsed % interval,
        },
    }
}

/// First enabled override whose window contains `now`, with the seconds left
/// in its window.
pub fn active_override(
    config: &ScheduleConfig,
    now: NaiveDateTime,
) -> Option<(&TimeSpecificNavigation, u64)> {
    config
        .time_specific
        .iter()
        .find_map(|entry| override_remaining(entry, now).map(|remaining| (entry, remaining)))
}

/// Seconds left in `entry`'s window at `now`, `None` if the window is closed
/// or the entry can never trigger.
pub fn override_remaining(entry: &TimeSpecificNavigation, now: NaiveDateTime) -> Option<u64> {
    if !entry.enabled || entry.screen.is_empty() || entry.duration_minutes == 0 {
        return None;
    }

    let target = entry.clock_time()?;
    let start_minute = first_matching_minute(target);
    let opens_at = NaiveTime::from_num_seconds_from_midnight_opt(start_minute * 60, 0)?;
    let duration = TimeDelta::minutes(i64::from(entry.duration_minutes));

    let span_minutes = u64::from(start_minute) + u64::from(entry.duration_minutes);
    let lookback = (span_minutes / u64::from(MINUTES_PER_DAY)).min(MAX_LOOKBACK_DAYS);

    (0..=lookback).find_map(|days_back| {
        let date = now.date().checked_sub_days(Days::new(days_back))?;
        if !entry.runs_on(weekday_number(&date)) {
            return None;
        }

        let start = date.and_time(opens_at);
        let end = start + duration;
        (start <= now && now < end).then(|| ceil_seconds(end - now))
    })
}

/// Seconds left in an interaction pause, `None` when rotation is free to run.
pub fn pause_remaining(
    pause_seconds: u32,
    last_interaction_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Option<u64> {
    let last = last_interaction_at?;
    let pause = u64::from(pause_seconds);
    let elapsed = seconds_between(last, now);
    (elapsed < pause).then(|| pause - elapsed)
}

/// Whole seconds from `start` to `end`, zero if `end` is earlier.
fn seconds_between(start: NaiveDateTime, end: NaiveDateTime) -> u64 {
    u64::try_from((end - start).num_seconds()).unwrap_or(0)
}

fn ceil_seconds(delta: TimeDelta) -> u64 {
    let millis = delta.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
