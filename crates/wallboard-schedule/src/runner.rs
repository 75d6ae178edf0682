//! Stateful tick driver around [`evaluate`].
//!
//! The kiosk calls [`ScheduleRunner::tick`] on a fixed interval and forwards
//! touches to [`ScheduleRunner::record_interaction`]. The runner keeps the
//! inputs [`evaluate`] needs between ticks (rotation anchor, last interaction,
//! displayed screen) and a bounded history of screen changes.
//!
//! # Resuming Rotation
//!
//! When a pause or an override ends, rotation is re-anchored so it continues
//! from the screen on display if that screen belongs to the active sequence,
//! and restarts from the first screen otherwise. Without this the kiosk would
//! jump to wherever the free-running rotation happened to be.
//!
//! # Examples
//!
//! ```
//! use chrono::{NaiveDate, TimeDelta};
//! use wallboard_schedule::{ScheduleConfig, ScheduleRunner};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let mut runner = ScheduleRunner::new(ScheduleConfig::default_config(), start);
//!
//! assert_eq!(runner.tick(start).screen.as_deref(), Some("calendar"));
//! assert_eq!(runner.tick(start + TimeDelta::seconds(60)).screen.as_deref(), Some("tasks"));
//!
//! runner.record_interaction(start + TimeDelta::seconds(61));
//! assert!(runner.tick(start + TimeDelta::seconds(130)).is_paused());
//! ```
//!
//! [`evaluate`]: crate::engine::evaluate

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::engine::{ScheduleInput, ScreenSelection, SelectionSource, evaluate, pause_remaining};
use crate::model::ScheduleConfig;

/// Maximum number of screen changes kept in history.
///
/// At one change per minute this covers well over an hour of rotation.
const MAX_HISTORY_SIZE: usize = 100;

/// A change of the displayed screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenChange {
    pub from: Option<String>,
    pub to: Option<String>,
    pub at: NaiveDateTime,
    pub source: SelectionSource,
}

/// Owns the transient scheduling state of one kiosk.
///
/// Not synchronized; wrap in a mutex if ticks and interactions
/// arrive from different tasks.
#[derive(Debug)]
pub struct ScheduleRunner {
    config: Arc<ScheduleConfig>,
    rotation_started_at: NaiveDateTime,
    last_interaction_at: Option<NaiveDateTime>,
    displayed_screen: Option<String>,
    last_source: Option<SelectionSource>,
    history: VecDeque<ScreenChange>,
}

impl ScheduleRunner {
    /// Create a runner whose rotation starts at `now`.
    pub fn new(config: impl Into<Arc<ScheduleConfig>>, now: NaiveDateTime) -> Self {
        Self::builder(config).with_rotation_start(now).build()
    }

    /// Builder for restoring a runner mid-rotation.
    pub fn builder(config: impl Into<Arc<ScheduleConfig>>) -> ScheduleRunnerBuilder {
        ScheduleRunnerBuilder {
            config: config.into(),
            rotation_started_at: None,
            displayed_screen: None,
        }
    }

    /// Evaluate the schedule at `now` and update the displayed screen.
    pub fn tick(&mut self, now: NaiveDateTime) -> ScreenSelection {
        let mut selection = self.evaluate_at(now);

        let resuming = matches!(selection.source, SelectionSource::Rotation { .. })
            && matches!(
                self.last_source,
                Some(SelectionSource::Paused { .. } | SelectionSource::Override { .. })
            );

        if resuming {
            self.reanchor(now);
            selection = self.evaluate_at(now);
        }

        if selection.screen != self.displayed_screen {
            self.record_change(&selection, now);
        }

        self.displayed_screen = selection.screen.clone();
        self.last_source = Some(selection.source.clone());
        selection
    }

    /// Note a user interaction; rotation freezes for the active sequence's
    /// pause duration.
    pub fn record_interaction(&mut self, now: NaiveDateTime) {
        debug!("Interaction recorded at {}", now);
        self.last_interaction_at = Some(now);
    }

    /// Swap in a new schedule. Rotation restarts at `now`.
    pub fn replace_config(&mut self, config: impl Into<Arc<ScheduleConfig>>, now: NaiveDateTime) {
        let config = config.into();
        info!(
            "Schedule replaced: {} sequences, {} overrides",
            config.sequences.len(),
            config.time_specific.len()
        );
        self.config = config;
        self.rotation_started_at = now;
        self.last_source = None;
    }

    /// Seconds left in the current interaction pause, if one is running.
    pub fn pause_remaining(&self, now: NaiveDateTime) -> Option<u64> {
        let sequence = self.config.active_sequence()?;
        pause_remaining(
            sequence.pause_on_interaction_seconds,
            self.last_interaction_at,
            now,
        )
    }

    pub fn config(&self) -> &Arc<ScheduleConfig> {
        &self.config
    }

    pub fn displayed_screen(&self) -> Option<&str> {
        self.displayed_screen.as_deref()
    }

    pub fn rotation_started_at(&self) -> NaiveDateTime {
        self.rotation_started_at
    }

    pub fn last_interaction_at(&self) -> Option<NaiveDateTime> {
        self.last_interaction_at
    }

    /// Recent screen changes, oldest first.
    pub fn history(&self) -> &VecDeque<ScreenChange> {
        &self.history
    }

    fn evaluate_at(&self, now: NaiveDateTime) -> ScreenSelection {
        let input = ScheduleInput {
            now,
            rotation_started_at: self.rotation_started_at,
            last_interaction_at: self.last_interaction_at,
            displayed_screen: self.displayed_screen.as_deref(),
        };
        evaluate(&self.config, &input)
    }

    fn reanchor(&mut self, now: NaiveDateTime) {
        let position = self.config.active_sequence().and_then(|sequence| {
            let displayed = self.displayed_screen.as_deref()?;
            let index = sequence.position_of(displayed)?;
            Some(index as i64 * i64::from(sequence.interval_seconds))
        });

        self.rotation_started_at = now - TimeDelta::seconds(position.unwrap_or(0));
        debug!("Rotation re-anchored to {}", self.rotation_started_at);
    }

    fn record_change(&mut self, selection: &ScreenSelection, now: NaiveDateTime) {
        info!(
            "Screen change: {} -> {} ({:?})",
            self.displayed_screen.as_deref().unwrap_or("<idle>"),
            selection.screen.as_deref().unwrap_or("<idle>"),
            selection.source
        );

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        self.history.push_back(ScreenChange {
            from: self.displayed_screen.clone(),
            to: selection.screen.clone(),
            at: now,
            source: selection.source.clone(),
        });
    }
}

/// Builder for [`ScheduleRunner`].
#[derive(Debug)]
pub struct ScheduleRunnerBuilder {
    config: Arc<ScheduleConfig>,
    rotation_started_at: Option<NaiveDateTime>,
    displayed_screen: Option<String>,
}

impl ScheduleRunnerBuilder {
    pub fn with_rotation_start(mut self, at: NaiveDateTime) -> Self {
        self.rotation_started_at = Some(at);
        self
    }

    pub fn with_displayed_screen(mut self, screen: impl Into<String>) -> Self {
        self.displayed_screen = Some(screen.into());
        self
    }

    pub fn build(self) -> ScheduleRunner {
        ScheduleRunner {
            config: self.config,
            rotation_started_at: self
                .rotation_started_at
                .unwrap_or_else(|| chrono::Local::now().naive_local()),
            last_interaction_at: None,
            displayed_screen: self.displayed_screen,
            last_source: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }
}
