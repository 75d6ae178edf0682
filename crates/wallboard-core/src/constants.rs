//! Core constants shared by the scheduler and the PIN guard.
//!
//! Everything tunable at runtime (attempt limits, lockout length) has a
//! configuration struct that defaults to the values below. Constants that
//! describe a data format (PIN length, time syntax, weekday range) are fixed.
//!
//! # Usage
//!
//! ```
//! use wallboard_core::constants::*;
//!
//! assert_eq!(MAX_PIN_ATTEMPTS, 5);
//! assert!(MIN_PIN_LENGTH <= MAX_PIN_LENGTH);
//!
//! use std::time::Duration;
//! let lockout = Duration::from_secs(PIN_LOCKOUT_SECONDS);
//! assert_eq!(lockout.as_secs(), 300);
//! ```

// ============================================================================
// PIN Format
// ============================================================================

/// Minimum number of digits in a profile PIN.
pub const MIN_PIN_LENGTH: usize = 4;

/// Maximum number of digits in a profile PIN.
pub const MAX_PIN_LENGTH: usize = 6;

// ============================================================================
// PIN Lockout
// ============================================================================

/// Consecutive failed verifications that lock a profile.
///
/// The attempt that reaches this count is answered with a lockout, not with
/// "0 attempts remaining".
pub const MAX_PIN_ATTEMPTS: u32 = 5;

/// How long a profile stays locked once [`MAX_PIN_ATTEMPTS`] is reached.
///
/// Fixed duration: the lockout does not grow with repeated lockouts.
pub const PIN_LOCKOUT_SECONDS: u64 = 300;

/// How many times the guard re-reads and re-decides after losing a
/// compare-and-swap race before giving up with a retryable conflict.
pub const DEFAULT_CAS_RETRIES: u32 = 3;

/// Upper bound for a single persistence call made by the guard.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Window over which PIN status reports past lockouts.
pub const LOCKOUT_HISTORY_HOURS: i64 = 24;

// ============================================================================
// Screen Schedule
// ============================================================================

/// Default dwell time for each screen of a sequence.
pub const DEFAULT_INTERVAL_SECONDS: u32 = 60;

/// Default freeze after a user touches the kiosk.
pub const DEFAULT_PAUSE_ON_INTERACTION_SECONDS: u32 = 120;

/// Default duration of a time-specific override.
pub const DEFAULT_OVERRIDE_DURATION_MINUTES: u32 = 30;

/// Default trigger time for a freshly created override.
pub const DEFAULT_OVERRIDE_TIME: &str = "08:00";

/// Screen used by freshly created sequences and overrides.
pub const DEFAULT_SCREEN: &str = "calendar";

/// Tolerance, in minutes, on either side of a scheduled time.
///
/// The kiosk tick is not guaranteed to land on the target minute, so a
/// scheduled `HH:MM` matches `HH:MM-1`, `HH:MM` and `HH:MM+1`. The window never
/// wraps across midnight.
pub const TIME_MATCH_TOLERANCE_MINUTES: u32 = 1;

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Highest weekday number (Saturday). Sunday is 0.
pub const MAX_WEEKDAY: u8 = 6;

/// Settings key under which the schedule document is stored.
pub const SCHEDULE_SETTINGS_KEY: &str = "screenSchedule";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_pin_length_range_is_consistent() {
        assert!(MIN_PIN_LENGTH >= 4);
        assert!(MIN_PIN_LENGTH <= MAX_PIN_LENGTH);
    }

    #[test]
    fn test_default_override_time_is_valid() {
        let parsed: crate::ClockTime = DEFAULT_OVERRIDE_TIME.parse().unwrap();
        assert_eq!(parsed.to_string(), DEFAULT_OVERRIDE_TIME);
    }
}
