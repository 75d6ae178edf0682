//! Screen scheduling for the wallboard kiosk.
//!
//! The kiosk cycles through *sequences* of screens and can be forced onto a
//! specific screen at a given time by *time-specific navigations*. A user
//! touching the screen freezes rotation for a while.
//!
//! # Layers
//!
//! - [`time`] - minute-precision matching, weekday filtering, countdown text
//! - [`model`] - the persisted schedule document and its invariants
//! - [`engine`] - pure evaluation: schedule + clock + interaction state -> screen
//! - [`runner`] - stateful tick driver that carries state between evaluations
//!
//! Nothing in this crate performs I/O. Loading and saving the schedule lives
//! in `wallboard-storage`.

pub mod engine;
pub mod model;
pub mod runner;
pub mod time;

pub use engine::{
    ScheduleInput, ScreenSelection, SelectionSource, active_override, evaluate, override_remaining,
};
pub use model::{
    ScheduleConfig, ScreenSequence, TimeSpecificNavigation, create_default_sequence,
    create_default_time_specific,
};
pub use runner::{ScheduleRunner, ScheduleRunnerBuilder, ScreenChange};
pub use time::{format_time_remaining, is_active_day, is_time_match};
