pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;

pub use error::{Error, Result};
pub use telemetry::{NoopTelemetry, Telemetry, TelemetryEvent, TelemetryLevel, TracingTelemetry};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
