use crate::error::{GuardError, GuardResult};
use serde::Deserialize;
use std::time::Duration;
use wallboard_core::constants::{
    DEFAULT_CAS_RETRIES, DEFAULT_STORE_TIMEOUT_MS, MAX_PIN_ATTEMPTS, PIN_LOCKOUT_SECONDS,
};

/// Lockout policy and store limits of the PIN guard.
///
/// Lives in the `[guard]` section of the kiosk configuration file; missing
/// keys take the defaults below.
///
/// ```
/// use wallboard_guard::GuardConfig;
///
/// let config = GuardConfig::default().max_attempts(3).lockout_seconds(60);
/// assert_eq!(config.lockout_duration().num_seconds(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Consecutive failures that lock a profile
    pub max_attempts: u32,

    /// Lockout length in seconds
    pub lockout_seconds: u64,

    /// Upper bound for each persistence call, in milliseconds
    pub store_timeout_ms: u64,

    /// Re-reads allowed after losing a compare-and-swap race
    pub max_cas_retries: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_PIN_ATTEMPTS,
            lockout_seconds: PIN_LOCKOUT_SECONDS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            max_cas_retries: DEFAULT_CAS_RETRIES,
        }
    }
}

impl GuardConfig {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn lockout_seconds(mut self, seconds: u64) -> Self {
        self.lockout_seconds = seconds;
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn max_cas_retries(mut self, retries: u32) -> Self {
        self.max_cas_retries = retries;
        self
    }

    pub fn lockout_duration(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(i64::try_from(self.lockout_seconds).unwrap_or(i64::MAX))
    }

    pub fn store_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Reject settings that would disable the lockout or hang the guard.
    pub fn validate(&self) -> GuardResult<()> {
        if self.max_attempts == 0 {
            return Err(GuardError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.lockout_seconds == 0 || self.lockout_seconds > 86_400 {
            return Err(GuardError::Configuration(format!(
                "lockout_seconds must be within 1..=86400, got {}",
                self.lockout_seconds
            )));
        }
        if self.store_timeout_ms == 0 {
            return Err(GuardError::Configuration(
                "store_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
