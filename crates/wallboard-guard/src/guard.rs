//! PIN verification, lockout and administrative PIN management.
//!
//! # State machine
//!
//! ```text
//!   NoPin --set--> Armed --wrong--> Failing --wrong x N--> Locked
//!                    ^                 |                     |
//!                    +-----right-------+      expiry / admin reset
//!                    +---------------------------------------+
//! ```
//!
//! Every transition is written with a compare-and-swap on the profile's
//! `pin_version`. A writer that lost the race re-reads the profile and
//! decides again from the fresh state, so concurrent wrong guesses are all
//! counted and no two requests act on the same stale counter.

use crate::config::GuardConfig;
use crate::error::{GuardError, GuardResult};
use crate::hashing::PinHasher;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use wallboard_core::constants::LOCKOUT_HISTORY_HOURS;
use wallboard_core::{Pin, ProfileId, Telemetry, TelemetryEvent, TracingTelemetry};
use wallboard_storage::models::{PinAuditEntry, PinEvent, PinState, Profile};
use wallboard_storage::repositories::{PinAuditRepository, ProfileRepository};
use wallboard_storage::StorageResult;

/// Result of a PIN verification that reached a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum VerifyOutcome {
    Verified,
    #[serde(rename_all = "camelCase")]
    Incorrect { attempts_remaining: u32 },
    #[serde(rename_all = "camelCase")]
    Locked { remaining_seconds: u64 },
}

impl VerifyOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyOutcome::Verified)
    }
}

/// Read-only view of a profile's PIN state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStatus {
    pub pin_enabled: bool,
    /// Seconds until the lockout ends, if locked
    pub locked_for_seconds: Option<u64>,
    pub failed_attempts: u32,
    pub attempts_remaining: u32,
    /// Lockouts recorded in the last [`LOCKOUT_HISTORY_HOURS`]
    pub recent_lockouts: u64,
}

/// PIN state machine over a profile store, an audit log and a hasher.
///
/// # Example
///
/// ```no_run
/// use wallboard_guard::{Argon2PinHasher, GuardConfig, PinGuard};
/// use wallboard_storage::{Database, SqlitePinAuditRepository, SqliteProfileRepository};
/// use wallboard_core::ProfileId;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::in_memory().await?;
/// let guard = PinGuard::new(
///     SqliteProfileRepository::new(db.pool().clone()),
///     SqlitePinAuditRepository::new(db.pool().clone()),
///     Argon2PinHasher::new(),
///     GuardConfig::default(),
/// )?;
///
/// let profile = ProfileId::new("kid-profile")?;
/// let outcome = guard.verify_pin(&profile, "1234").await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct PinGuard<P, A, H> {
    profiles: P,
    audit: A,
    hasher: Arc<H>,
    telemetry: Arc<dyn Telemetry>,
    config: GuardConfig,
}

impl<P, A, H> PinGuard<P, A, H>
where
    P: ProfileRepository,
    A: PinAuditRepository,
    H: PinHasher,
{
    /// Create a guard that reports through [`TracingTelemetry`].
    pub fn new(profiles: P, audit: A, hasher: H, config: GuardConfig) -> GuardResult<Self> {
        config.validate()?;
        Ok(Self {
            profiles,
            audit,
            hasher: Arc::new(hasher),
            telemetry: Arc::new(TracingTelemetry::default()),
            config,
        })
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Check a submitted PIN, counting failures toward the lockout.
    pub async fn verify_pin(&self, profile_id: &ProfileId, pin: &str) -> GuardResult<VerifyOutcome> {
        self.verify_pin_at(profile_id, pin, Utc::now()).await
    }

    /// [`Self::verify_pin`] evaluated at `now`.
    ///
    /// An active lockout is reported before the PIN is looked at, so a
    /// locked profile answers [`VerifyOutcome::Locked`] even for a malformed
    /// PIN and no attempt is consumed while locked.
    pub async fn verify_pin_at(
        &self,
        profile_id: &ProfileId,
        pin: &str,
        now: DateTime<Utc>,
    ) -> GuardResult<VerifyOutcome> {
        for _ in 0..=self.config.max_cas_retries {
            let profile = self.load_profile(profile_id).await?;
            let Some(hash) = profile.pin_hash.as_deref().filter(|_| profile.pin_enabled) else {
                return Err(GuardError::NotApplicable(profile.id));
            };

            if let Some(remaining_seconds) = profile.lock_remaining_seconds(now) {
                self.record(&profile.id, PinEvent::Blocked, None, now).await;
                return Ok(VerifyOutcome::Locked { remaining_seconds });
            }

            let candidate = Pin::new(pin)?;
            let (next, outcome, event) = self
                .decide_attempt(&profile, hash, &candidate, now)
                .await?;

            if self.swap(&profile, &next).await? {
                self.record(&profile.id, event, None, now).await;
                return Ok(outcome);
            }
        }

        Err(self.conflict(profile_id))
    }

    /// Set or change a profile's PIN.
    ///
    /// Changing an existing PIN requires `current_pin`. A wrong current PIN
    /// fails with [`GuardError::IncorrectCurrentPin`] without consuming an
    /// attempt.
    pub async fn set_pin(
        &self,
        profile_id: &ProfileId,
        new_pin: &str,
        current_pin: Option<&str>,
    ) -> GuardResult<()> {
        let now = Utc::now();
        let new_pin = Pin::new(new_pin)?;
        let mut new_hash = None;

        for _ in 0..=self.config.max_cas_retries {
            let profile = self.load_profile(profile_id).await?;
            let event = if profile.has_pin() {
                self.check_current_pin(&profile, current_pin, now).await?;
                PinEvent::PinChanged
            } else {
                PinEvent::PinSet
            };

            let hash = match new_hash.take() {
                Some(hash) => hash,
                None => self.hash_pin(&new_pin).await?,
            };

            if self.swap(&profile, &PinState::armed(hash.as_str())).await? {
                self.record(&profile.id, event, None, now).await;
                return Ok(());
            }
            new_hash = Some(hash);
        }

        Err(self.conflict(profile_id))
    }

    /// Remove the PIN of a standard profile.
    ///
    /// Admin profiles must keep a PIN: they get [`GuardError::Forbidden`]
    /// whatever credentials are supplied.
    pub async fn remove_pin(&self, profile_id: &ProfileId, current_pin: &str) -> GuardResult<()> {
        let now = Utc::now();

        for _ in 0..=self.config.max_cas_retries {
            let profile = self.load_profile(profile_id).await?;
            if profile.is_admin() {
                return Err(GuardError::Forbidden(
                    "admin profiles must keep a PIN".to_string(),
                ));
            }
            if !profile.has_pin() {
                return Err(GuardError::NotApplicable(profile.id));
            }

            self.check_current_pin(&profile, Some(current_pin), now)
                .await?;

            if self.swap(&profile, &PinState::cleared()).await? {
                self.record(&profile.id, PinEvent::PinRemoved, None, now)
                    .await;
                return Ok(());
            }
        }

        Err(self.conflict(profile_id))
    }

    /// Overwrite `target`'s PIN on the authority of an admin.
    ///
    /// The admin PIN check counts against the admin's own profile and can
    /// lock it. On success the target's counters and lockout are cleared;
    /// this is the only way to lift a lockout before it expires.
    pub async fn reset_pin(
        &self,
        target: &ProfileId,
        admin_id: &ProfileId,
        admin_pin: &str,
        new_pin: &str,
    ) -> GuardResult<()> {
        self.reset_pin_at(target, admin_id, admin_pin, new_pin, Utc::now())
            .await
    }

    /// [`Self::reset_pin`] evaluated at `now`.
    pub async fn reset_pin_at(
        &self,
        target: &ProfileId,
        admin_id: &ProfileId,
        admin_pin: &str,
        new_pin: &str,
        now: DateTime<Utc>,
    ) -> GuardResult<()> {
        let new_pin = Pin::new(new_pin)?;

        self.load_profile(target).await?;
        let admin = self.load_profile(admin_id).await?;
        if !admin.is_admin() {
            return Err(GuardError::Unauthorized(format!(
                "profile {admin_id} is not an admin"
            )));
        }
        if !admin.has_pin() {
            return Err(GuardError::Unauthorized(format!(
                "admin profile {admin_id} has no PIN"
            )));
        }

        match self.verify_pin_at(admin_id, admin_pin, now).await? {
            VerifyOutcome::Verified => {}
            VerifyOutcome::Incorrect { attempts_remaining } => {
                return Err(GuardError::AdminPinIncorrect { attempts_remaining });
            }
            VerifyOutcome::Locked { remaining_seconds } => {
                return Err(GuardError::AdminLocked { remaining_seconds });
            }
        }

        let hash = self.hash_pin(&new_pin).await?;
        let next = PinState::armed(hash);

        for _ in 0..=self.config.max_cas_retries {
            let profile = self.load_profile(target).await?;
            if self.swap(&profile, &next).await? {
                self.record(&profile.id, PinEvent::PinReset, Some(admin_id), now)
                    .await;
                return Ok(());
            }
        }

        Err(self.conflict(target))
    }

    /// Current PIN state, so a client can re-derive its lockout countdown.
    pub async fn pin_status(&self, profile_id: &ProfileId) -> GuardResult<PinStatus> {
        self.pin_status_at(profile_id, Utc::now()).await
    }

    /// [`Self::pin_status`] evaluated at `now`.
    pub async fn pin_status_at(
        &self,
        profile_id: &ProfileId,
        now: DateTime<Utc>,
    ) -> GuardResult<PinStatus> {
        let profile = self.load_profile(profile_id).await?;
        let failed_attempts = self.effective_attempts(&profile, now);
        let since = now - chrono::TimeDelta::hours(LOCKOUT_HISTORY_HOURS);
        let recent_lockouts = self
            .bounded(
                self.audit
                    .count_events_since(&profile.id, PinEvent::LockedOut, since),
            )
            .await?;

        Ok(PinStatus {
            pin_enabled: profile.has_pin(),
            locked_for_seconds: profile.lock_remaining_seconds(now),
            failed_attempts,
            attempts_remaining: self.config.max_attempts.saturating_sub(failed_attempts),
            recent_lockouts: recent_lockouts.max(0) as u64,
        })
    }

    /// Compare `pin` with the stored hash and work out the next state.
    async fn decide_attempt(
        &self,
        profile: &Profile,
        hash: &str,
        pin: &Pin,
        now: DateTime<Utc>,
    ) -> GuardResult<(PinState, VerifyOutcome, PinEvent)> {
        if self.verify_hash(pin, hash).await? {
            return Ok((
                PinState::armed(hash),
                VerifyOutcome::Verified,
                PinEvent::Verified,
            ));
        }

        let attempts = self.effective_attempts(profile, now).saturating_add(1);
        let mut next = profile.pin_state();
        next.failed_pin_attempts = attempts;

        if attempts >= self.config.max_attempts {
            next.pin_locked_until = Some(now + self.config.lockout_duration());
            let outcome = VerifyOutcome::Locked {
                remaining_seconds: self.config.lockout_seconds,
            };
            Ok((next, outcome, PinEvent::LockedOut))
        } else {
            next.pin_locked_until = None;
            let outcome = VerifyOutcome::Incorrect {
                attempts_remaining: self.config.max_attempts - attempts,
            };
            Ok((next, outcome, PinEvent::Failed))
        }
    }

    /// Failed attempts that still count at `now`; an expired lockout
    /// starts the profile over from zero.
    fn effective_attempts(&self, profile: &Profile, now: DateTime<Utc>) -> u32 {
        match profile.pin_locked_until {
            Some(until) if until <= now => 0,
            _ => profile.failed_pin_attempts,
        }
    }

    /// Non-consuming check of the profile's current PIN.
    async fn check_current_pin(
        &self,
        profile: &Profile,
        current_pin: Option<&str>,
        now: DateTime<Utc>,
    ) -> GuardResult<()> {
        if let Some(remaining_seconds) = profile.lock_remaining_seconds(now) {
            return Err(GuardError::Locked { remaining_seconds });
        }

        let current = Pin::new(current_pin.ok_or(GuardError::MissingField("currentPin"))?)?;
        let Some(hash) = profile.pin_hash.as_deref() else {
            return Err(GuardError::NotApplicable(profile.id.clone()));
        };

        if self.verify_hash(&current, hash).await? {
            Ok(())
        } else {
            tracing::debug!(profile_id = %profile.id, "Current PIN rejected");
            Err(GuardError::IncorrectCurrentPin)
        }
    }

    async fn load_profile(&self, profile_id: &ProfileId) -> GuardResult<Profile> {
        self.bounded(self.profiles.find_by_id(profile_id.as_str()))
            .await?
            .ok_or_else(|| GuardError::ProfileNotFound(profile_id.to_string()))
    }

    async fn swap(&self, profile: &Profile, next: &PinState) -> GuardResult<bool> {
        let applied = self
            .bounded(self.profiles.compare_and_swap_pin_state(
                &profile.id,
                profile.pin_version,
                next,
            ))
            .await?;

        if !applied {
            tracing::debug!(
                profile_id = %profile.id,
                version = profile.pin_version,
                "Lost PIN state race, re-reading"
            );
        }
        Ok(applied)
    }

    /// Run a store call under the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = StorageResult<T>>) -> GuardResult<T> {
        let limit = self.config.store_timeout_duration();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(GuardError::from),
            Err(_) => {
                tracing::warn!("Profile store timed out after {limit:?}");
                Err(GuardError::StoreTimeout(limit))
            }
        }
    }

    async fn hash_pin(&self, pin: &Pin) -> GuardResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let pin = pin.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&pin))
            .await
            .map_err(|e| GuardError::Hashing(format!("hashing task failed: {e}")))?
    }

    async fn verify_hash(&self, pin: &Pin, hash: &str) -> GuardResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let pin = pin.clone();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&pin, &hash))
            .await
            .map_err(|e| GuardError::Hashing(format!("hashing task failed: {e}")))?
    }

    fn conflict(&self, profile_id: &ProfileId) -> GuardError {
        let attempts = self.config.max_cas_retries + 1;
        tracing::warn!(%profile_id, attempts, "Giving up on contended PIN state");
        GuardError::Conflict {
            profile_id: profile_id.to_string(),
            attempts,
        }
    }

    /// Append to the audit log and emit telemetry. Audit failures are
    /// logged; the decision has already been persisted.
    async fn record(
        &self,
        profile_id: &str,
        event: PinEvent,
        actor: Option<&ProfileId>,
        now: DateTime<Utc>,
    ) {
        let mut entry = PinAuditEntry::new(profile_id, event).at(now);
        if let Some(actor) = actor {
            entry = entry.with_actor(actor.as_str());
        }

        if let Err(e) = self.bounded(self.audit.append(&entry)).await {
            tracing::warn!(profile_id, %event, "Failed to write PIN audit entry: {e}");
        }

        let telemetry_event = if event.is_failure() {
            TelemetryEvent::warn("pin_guard")
        } else {
            TelemetryEvent::info("pin_guard")
        };
        self.telemetry.record(
            telemetry_event
                .with_property("event", event)
                .with_property("profile_id", profile_id),
        );
    }
}
