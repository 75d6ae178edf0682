use crate::error::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of PIN decision recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinEvent {
    /// Correct PIN presented
    Verified,
    /// Wrong PIN presented, lockout not yet reached
    Failed,
    /// Wrong PIN presented and the profile is now locked
    LockedOut,
    /// Verification refused because a lockout is in force
    Blocked,
    PinSet,
    PinChanged,
    PinRemoved,
    /// PIN overwritten by an admin
    PinReset,
}

impl PinEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinEvent::Verified => "verified",
            PinEvent::Failed => "failed",
            PinEvent::LockedOut => "locked_out",
            PinEvent::Blocked => "blocked",
            PinEvent::PinSet => "pin_set",
            PinEvent::PinChanged => "pin_changed",
            PinEvent::PinRemoved => "pin_removed",
            PinEvent::PinReset => "pin_reset",
        }
    }

    /// Events that count against the profile.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PinEvent::Failed | PinEvent::LockedOut | PinEvent::Blocked
        )
    }
}

impl fmt::Display for PinEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinEvent {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(PinEvent::Verified),
            "failed" => Ok(PinEvent::Failed),
            "locked_out" => Ok(PinEvent::LockedOut),
            "blocked" => Ok(PinEvent::Blocked),
            "pin_set" => Ok(PinEvent::PinSet),
            "pin_changed" => Ok(PinEvent::PinChanged),
            "pin_removed" => Ok(PinEvent::PinRemoved),
            "pin_reset" => Ok(PinEvent::PinReset),
            other => Err(StorageError::Validation(format!(
                "unknown PIN audit event: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for PinEvent {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One row of the append-only PIN audit trail.
///
/// `actor_profile_id` is set when someone other than the profile owner
/// caused the event (an admin reset).
///
/// # Examples
///
/// ```
/// use wallboard_storage::models::{PinAuditEntry, PinEvent};
///
/// let entry = PinAuditEntry::new("kid-profile", PinEvent::PinReset)
///     .with_actor("parent-profile")
///     .with_detail("reset from kiosk");
///
/// assert_eq!(entry.actor_profile_id.as_deref(), Some("parent-profile"));
/// assert!(!entry.event.is_failure());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PinAuditEntry {
    pub id: i64,
    pub profile_id: String,
    pub actor_profile_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub event: PinEvent,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PinAuditEntry {
    pub fn new(profile_id: impl Into<String>, event: PinEvent) -> Self {
        Self {
            id: 0,
            profile_id: profile_id.into(),
            actor_profile_id: None,
            event,
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_profile_id: impl Into<String>) -> Self {
        self.actor_profile_id = Some(actor_profile_id.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PinEvent::Verified, "verified", false)]
    #[case(PinEvent::Failed, "failed", true)]
    #[case(PinEvent::LockedOut, "locked_out", true)]
    #[case(PinEvent::Blocked, "blocked", true)]
    #[case(PinEvent::PinSet, "pin_set", false)]
    #[case(PinEvent::PinChanged, "pin_changed", false)]
    #[case(PinEvent::PinRemoved, "pin_removed", false)]
    #[case(PinEvent::PinReset, "pin_reset", false)]
    fn test_event_text(#[case] event: PinEvent, #[case] text: &str, #[case] failure: bool) {
        assert_eq!(event.as_str(), text);
        assert_eq!(text.parse::<PinEvent>().unwrap(), event);
        assert_eq!(serde_json::to_value(event).unwrap(), text);
        assert_eq!(event.is_failure(), failure);
    }

    #[test]
    fn test_unknown_event_rejected() {
        assert!(matches!(
            "exploded".parse::<PinEvent>(),
            Err(StorageError::Validation(_))
        ));
    }
}
