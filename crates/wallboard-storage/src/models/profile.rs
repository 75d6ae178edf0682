use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wallboard_core::{ProfileId, ProfileType};

/// A family member's profile together with its PIN state.
///
/// # Fields
///
/// * `id` - Opaque profile id (uuid v4 text)
/// * `name` - Display name, 1-100 characters
/// * `profile_type` - `admin` or `standard`
/// * `pin_enabled` - Whether a PIN is required to act as this profile
/// * `pin_hash` - Argon2 PHC string of the PIN, present whenever `pin_enabled`
/// * `failed_pin_attempts` - Consecutive failed verifications since the last success
/// * `pin_locked_until` - End of the current lockout, if any
/// * `pin_version` - Compare-and-swap token, bumped on every PIN state write
///
/// # Database Schema
///
/// Maps to the `profiles` table. The schema rejects rows where
/// `pin_enabled` is set without a hash.
///
/// # Examples
///
/// ```
/// use wallboard_storage::models::Profile;
/// use wallboard_core::ProfileType;
/// use chrono::{Duration, Utc};
///
/// let mut profile = Profile::new("Sam", ProfileType::Standard);
/// assert!(!profile.has_pin());
///
/// let now = Utc::now();
/// profile.pin_locked_until = Some(now + Duration::seconds(90));
/// assert_eq!(profile.lock_remaining_seconds(now), Some(90));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub profile_type: ProfileType,

    pub pin_enabled: bool,

    /// Never serialized; hashes stay inside the storage and guard layers.
    #[serde(skip_serializing, default)]
    pub pin_hash: Option<String>,

    pub failed_pin_attempts: u32,

    pub pin_locked_until: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub pin_version: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// New profile with a generated id and no PIN.
    pub fn new(name: impl Into<String>, profile_type: ProfileType) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::generate().to_string(),
            name: name.into(),
            profile_type,
            pin_enabled: false,
            pin_hash: None,
            failed_pin_attempts: 0,
            pin_locked_until: None,
            pin_version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the profile is protected by a PIN.
    pub fn has_pin(&self) -> bool {
        self.pin_enabled && self.pin_hash.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.profile_type.is_admin()
    }

    /// Whole seconds left on the lockout, rounded up, or `None` when not locked.
    pub fn lock_remaining_seconds(&self, now: DateTime<Utc>) -> Option<u64> {
        let until = self.pin_locked_until?;
        let millis = (until - now).num_milliseconds();
        if millis <= 0 {
            return None;
        }
        Some((millis as u64).div_ceil(1000))
    }

    /// Snapshot of the four PIN columns.
    pub fn pin_state(&self) -> PinState {
        PinState {
            pin_enabled: self.pin_enabled,
            pin_hash: self.pin_hash.clone(),
            failed_pin_attempts: self.failed_pin_attempts,
            pin_locked_until: self.pin_locked_until,
        }
    }
}

/// The mutable PIN columns of a profile, written together by compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinState {
    pub pin_enabled: bool,
    pub pin_hash: Option<String>,
    pub failed_pin_attempts: u32,
    pub pin_locked_until: Option<DateTime<Utc>>,
}

impl PinState {
    /// No PIN configured.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// A freshly set PIN with counters cleared.
    pub fn armed(pin_hash: impl Into<String>) -> Self {
        Self {
            pin_enabled: true,
            pin_hash: Some(pin_hash.into()),
            failed_pin_attempts: 0,
            pin_locked_until: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[test]
    fn test_new_profile_has_no_pin() {
        let profile = Profile::new("Alex", ProfileType::Admin);

        assert!(!profile.has_pin());
        assert!(profile.is_admin());
        assert_eq!(profile.failed_pin_attempts, 0);
        assert_eq!(profile.pin_version, 0);
        assert!(ProfileId::new(profile.id.clone()).is_ok());
    }

    #[test]
    fn test_has_pin_requires_hash() {
        let mut profile = Profile::new("Alex", ProfileType::Standard);
        profile.pin_enabled = true;
        assert!(!profile.has_pin());

        profile.pin_hash = Some("$argon2id$stub".to_string());
        assert!(profile.has_pin());
    }

    #[rstest]
    #[case::none(None, None)]
    #[case::expired(Some(-5_000), None)]
    #[case::exact(Some(0), None)]
    #[case::partial_second(Some(1), Some(1))]
    #[case::whole(Some(300_000), Some(300))]
    #[case::rounds_up(Some(299_001), Some(300))]
    fn test_lock_remaining_seconds(#[case] offset_ms: Option<i64>, #[case] expected: Option<u64>) {
        let now = Utc::now();
        let mut profile = Profile::new("Alex", ProfileType::Standard);
        profile.pin_locked_until = offset_ms.map(|ms| now + Duration::milliseconds(ms));

        assert_eq!(profile.lock_remaining_seconds(now), expected);
    }

    #[test]
    fn test_pin_state_roundtrip() {
        let mut profile = Profile::new("Alex", ProfileType::Standard);
        let state = PinState::armed("$argon2id$stub");
        profile.pin_enabled = state.pin_enabled;
        profile.pin_hash = state.pin_hash.clone();

        assert_eq!(profile.pin_state(), state);
        assert_eq!(PinState::cleared().pin_hash, None);
    }

    #[test]
    fn test_serialization_hides_hash() {
        let mut profile = Profile::new("Alex", ProfileType::Admin);
        profile.pin_enabled = true;
        profile.pin_hash = Some("$argon2id$secret".to_string());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["type"], "admin");
        assert_eq!(json["pinEnabled"], true);
        assert!(json.get("pinHash").is_none());
        assert!(json.get("pinVersion").is_none());
    }
}
