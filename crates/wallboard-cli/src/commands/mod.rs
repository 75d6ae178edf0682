//! Subcommand implementations.

pub mod kiosk;
pub mod pin;
pub mod profile;
pub mod schedule;
