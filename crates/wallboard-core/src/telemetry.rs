//! Fire-and-forget event recording.
//!
//! Components that want to report notable events (a lockout, a corrupt
//! settings document, a screen change) receive a [`Telemetry`] handle at
//! construction time instead of reaching for a process-wide client. The
//! default implementation, [`TracingTelemetry`], forwards every event to
//! `tracing` with its properties attached as a structured field.
//!
//! Recording must never fail or block the caller; implementations swallow
//! their own errors.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use wallboard_core::{Telemetry, TelemetryEvent, TracingTelemetry};
//!
//! let telemetry: Arc<dyn Telemetry> = Arc::new(TracingTelemetry::new("kiosk"));
//! telemetry.record(
//!     TelemetryEvent::info("pin.verified").with_property("profile_id", "kid-1"),
//! );
//! ```

use std::fmt;

/// Severity of a telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A named event with structured string properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    pub name: &'static str,
    pub level: TelemetryLevel,
    pub properties: Vec<(&'static str, String)>,
}

impl TelemetryEvent {
    pub fn new(name: &'static str, level: TelemetryLevel) -> Self {
        Self {
            name,
            level,
            properties: Vec::new(),
        }
    }

    pub fn info(name: &'static str) -> Self {
        Self::new(name, TelemetryLevel::Info)
    }

    pub fn warn(name: &'static str) -> Self {
        Self::new(name, TelemetryLevel::Warn)
    }

    pub fn error(name: &'static str) -> Self {
        Self::new(name, TelemetryLevel::Error)
    }

    /// Attach a property, builder style.
    #[must_use]
    pub fn with_property(mut self, key: &'static str, value: impl ToString) -> Self {
        self.properties.push((key, value.to_string()));
        self
    }

    /// Look up a property value by key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for (key, value) in &self.properties {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Sink for telemetry events.
pub trait Telemetry: Send + Sync {
    /// Record an event. Never fails, never blocks on I/O.
    fn record(&self, event: TelemetryEvent);
}

/// [`Telemetry`] implementation that emits `tracing` events.
#[derive(Debug, Clone)]
pub struct TracingTelemetry {
    service: String,
}

impl TracingTelemetry {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Default for TracingTelemetry {
    fn default() -> Self {
        Self::new("wallboard")
    }
}

impl Telemetry for TracingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        let service = self.service.as_str();
        match event.level {
            TelemetryLevel::Debug => {
                tracing::debug!(service, event = event.name, "{}", event)
            }
            TelemetryLevel::Info => tracing::info!(service, event = event.name, "{}", event),
            TelemetryLevel::Warn => tracing::warn!(service, event = event.name, "{}", event),
            TelemetryLevel::Error => {
                tracing::error!(service, event = event.name, "{}", event)
            }
        }
    }
}

/// Telemetry sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record(&self, _event: TelemetryEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_properties() {
        let event = TelemetryEvent::warn("schedule.corrupt")
            .with_property("key", "screenSchedule")
            .with_property("bytes", 12);

        assert_eq!(event.level, TelemetryLevel::Warn);
        assert_eq!(event.property("key"), Some("screenSchedule"));
        assert_eq!(event.property("bytes"), Some("12"));
        assert_eq!(event.property("missing"), None);
        assert_eq!(
            event.to_string(),
            "schedule.corrupt key=screenSchedule bytes=12"
        );
    }

    #[test]
    fn test_tracing_telemetry_does_not_panic_without_subscriber() {
        let telemetry = TracingTelemetry::default();
        assert_eq!(telemetry.service(), "wallboard");
        telemetry.record(TelemetryEvent::error("pin.store_failure"));
        NoopTelemetry.record(TelemetryEvent::info("ignored"));
    }
}
