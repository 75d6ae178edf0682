//! Kiosk configuration file.
//!
//! ```toml
//! log_level = "info"
//! tick_interval_ms = 1000
//!
//! [database]
//! path = "/var/lib/wallboard/wallboard.db"
//!
//! [guard]
//! max_attempts = 5
//! lockout_seconds = 300
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use wallboard_guard::GuardConfig;
use wallboard_storage::DatabaseConfig;

/// Top-level configuration for the `wallboard` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub database: DatabaseConfig,
    pub guard: GuardConfig,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// How often the kiosk re-evaluates the schedule
    pub tick_interval_ms: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            guard: GuardConfig::default(),
            log_level: "info".to_string(),
            tick_interval_ms: 1000,
        }
    }
}

impl KioskConfig {
    /// Load the configuration at `path`.
    ///
    /// A missing file yields defaults unless `required` is set, which is the
    /// case when the operator named the file explicitly.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() && !required {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Point the database at `path` instead of the configured location.
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database.path = path.to_string_lossy().into_owned();
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.tick_interval_ms > 0, "tick_interval_ms must be positive");
        self.guard.validate()?;
        Ok(())
    }
}
