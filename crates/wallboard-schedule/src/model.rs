//! Schedule data model.
//!
//! The model mirrors the JSON document the kiosk persists under a single
//! settings key (camelCase field names, `days` omitted when absent). Every
//! field that older documents may lack carries a serde default so legacy
//! shapes load instead of failing.
//!
//! # Example Document
//!
//! ```json
//! {
//!   "sequences": [
//!     { "id": "…", "name": "Daytime", "enabled": true,
//!       "screens": ["calendar", "tasks"], "intervalSeconds": 60,
//!       "pauseOnInteractionSeconds": 120 }
//!   ],
//!   "timeSpecific": [
//!     { "id": "…", "enabled": true, "screen": "tasks",
//!       "time": "07:30", "durationMinutes": 20, "days": [1, 2, 3, 4, 5] }
//!   ]
//! }
//! ```

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use wallboard_core::constants::{
    DEFAULT_INTERVAL_SECONDS, DEFAULT_OVERRIDE_DURATION_MINUTES, DEFAULT_OVERRIDE_TIME,
    DEFAULT_PAUSE_ON_INTERACTION_SECONDS, DEFAULT_SCREEN,
};
use wallboard_core::{ClockTime, Error, Result, validate_weekday};

use crate::time::is_active_day;

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u32 {
    DEFAULT_INTERVAL_SECONDS
}

fn default_pause_seconds() -> u32 {
    DEFAULT_PAUSE_ON_INTERACTION_SECONDS
}

fn default_duration_minutes() -> u32 {
    DEFAULT_OVERRIDE_DURATION_MINUTES
}

/// List element that either decodes or is dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Malformed(IgnoredAny),
}

/// Decode a list, dropping elements of the wrong shape instead of failing the
/// whole document.
fn skip_malformed<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Vec::<Lenient<T>>::deserialize(deserializer)?;
    let total = entries.len();
    let valid: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Lenient::Valid(value) => Some(value),
            Lenient::Malformed(_) => None,
        })
        .collect();

    if valid.len() < total {
        tracing::warn!(
            skipped = total - valid.len(),
            "Dropped malformed schedule entries"
        );
    }
    Ok(valid)
}

/// A named, rotating playlist of screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSequence {
    /// Stable identifier, generated at creation.
    #[serde(default = "generate_id")]
    pub id: String,

    /// Display label.
    #[serde(default)]
    pub name: String,

    /// Disabled sequences are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Screen identifiers in rotation order.
    #[serde(default)]
    pub screens: Vec<String>,

    /// Seconds each screen is shown before advancing.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,

    /// Seconds rotation stays frozen after a user interaction.
    #[serde(default = "default_pause_seconds")]
    pub pause_on_interaction_seconds: u32,
}

impl ScreenSequence {
    /// Whether the sequence can drive rotation.
    ///
    /// Enabled sequences with no screens or a zero interval are treated as
    /// disabled instead of stalling the kiosk.
    pub fn is_rotatable(&self) -> bool {
        self.enabled && !self.screens.is_empty() && self.interval_seconds > 0
    }

    /// Position of `screen` in the rotation, if present.
    pub fn position_of(&self, screen: &str) -> Option<usize> {
        self.screens.iter().position(|s| s == screen)
    }

    /// Check the structural invariants.
    ///
    /// # Errors
    /// Returns `Error::InvalidSchedule` naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidSchedule("sequence id must not be empty".into()));
        }
        if self.screens.is_empty() {
            return Err(Error::InvalidSchedule(format!(
                "sequence {} must list at least one screen",
                self.id
            )));
        }
        if self.screens.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidSchedule(format!(
                "sequence {} contains an empty screen id",
                self.id
            )));
        }
        if self.interval_seconds == 0 {
            return Err(Error::InvalidSchedule(format!(
                "sequence {} interval must be positive",
                self.id
            )));
        }
        Ok(())
    }
}

/// Forces a screen at a wall-clock time, optionally on selected weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpecificNavigation {
    #[serde(default = "generate_id")]
    pub id: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Screen forced while the override is active.
    #[serde(default)]
    pub screen: String,

    /// Trigger time as `"HH:MM"` (24-hour). Kept as text so a malformed value
    /// survives a load/save cycle; it simply never triggers.
    #[serde(default)]
    pub time: String,

    /// Minutes the screen stays forced once triggered.
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    /// Weekdays (0 = Sunday) the override applies to. Absent or empty means
    /// every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u8>>,
}

impl TimeSpecificNavigation {
    /// Parsed trigger time, `None` if `time` is malformed.
    pub fn clock_time(&self) -> Option<ClockTime> {
        self.time.parse().ok()
    }

    /// Whether the override is allowed to trigger on `weekday`.
    pub fn runs_on(&self, weekday: u8) -> bool {
        is_active_day(self.days.as_deref(), weekday)
    }

    /// Check the structural invariants.
    ///
    /// # Errors
    /// Returns `Error::InvalidTime`, `Error::InvalidWeekday` or
    /// `Error::InvalidSchedule` for the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidSchedule("override id must not be empty".into()));
        }
        if self.screen.trim().is_empty() {
            return Err(Error::InvalidSchedule(format!(
                "override {} must name a screen",
                self.id
            )));
        }
        self.time.parse::<ClockTime>()?;
        if self.duration_minutes == 0 {
            return Err(Error::InvalidSchedule(format!(
                "override {} duration must be positive",
                self.id
            )));
        }
        for day in self.days.iter().flatten() {
            validate_weekday(*day)?;
        }
        Ok(())
    }
}

/// Root aggregate of the screen schedule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Entries of the wrong shape are dropped on load.
    #[serde(default, deserialize_with = "skip_malformed")]
    pub sequences: Vec<ScreenSequence>,

    #[serde(default, deserialize_with = "skip_malformed")]
    pub time_specific: Vec<TimeSpecificNavigation>,
}

impl ScheduleConfig {
    /// Configuration used on first run and whenever the stored document is
    /// missing or unreadable: one enabled sequence rotating the calendar and
    /// task screens, no overrides.
    pub fn default_config() -> Self {
        let mut sequence = create_default_sequence();
        sequence.name = "Default".to_string();
        sequence.screens = vec![DEFAULT_SCREEN.to_string(), "tasks".to_string()];

        Self {
            sequences: vec![sequence],
            time_specific: Vec::new(),
        }
    }

    /// The sequence that drives rotation: the first rotatable one in list order.
    pub fn active_sequence(&self) -> Option<&ScreenSequence> {
        self.sequences.iter().find(|s| s.is_rotatable())
    }

    /// Validate every entry and reject duplicate ids.
    ///
    /// # Errors
    /// Returns the first invariant violation found.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();

        for sequence in &self.sequences {
            sequence.validate()?;
            if !seen.insert(sequence.id.as_str()) {
                return Err(Error::InvalidSchedule(format!(
                    "duplicate id {}",
                    sequence.id
                )));
            }
        }

        for entry in &self.time_specific {
            entry.validate()?;
            if !seen.insert(entry.id.as_str()) {
                return Err(Error::InvalidSchedule(format!("duplicate id {}", entry.id)));
            }
        }

        Ok(())
    }
}

/// A new enabled sequence with one screen and default timings.
pub fn create_default_sequence() -> ScreenSequence {
    ScreenSequence {
        id: generate_id(),
        name: "New Sequence".to_string(),
        enabled: true,
        screens: vec![DEFAULT_SCREEN.to_string()],
        interval_seconds: DEFAULT_INTERVAL_SECONDS,
        pause_on_interaction_seconds: DEFAULT_PAUSE_ON_INTERACTION_SECONDS,
    }
}

/// A new enabled override for every day at the default time.
pub fn create_default_time_specific() -> TimeSpecificNavigation {
    TimeSpecificNavigation {
        id: generate_id(),
        enabled: true,
        screen: DEFAULT_SCREEN.to_string(),
        time: DEFAULT_OVERRIDE_TIME.to_string(),
        duration_minutes: DEFAULT_OVERRIDE_DURATION_MINUTES,
        days: None,
    }
}
