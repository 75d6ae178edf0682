//! Request/response surface over the [`PinGuard`].
//!
//! Each handler takes the profile id from the route and a JSON body, and
//! answers with a status code plus a JSON body:
//!
//! | Case | Status | Body |
//! |------|--------|------|
//! | success | 200 | `{ "success": true }` |
//! | bad input | 400 | `{ "error" }` |
//! | wrong PIN, bad admin PIN, not admin | 401 | `{ "error", "attemptsRemaining"? }` |
//! | admin PIN removal | 403 | `{ "error" }` |
//! | unknown profile | 404 | `{ "error" }` |
//! | no PIN configured | 409 | `{ "error" }` |
//! | locked | 429 | `{ "error", "lockedFor" }` |
//! | store trouble | 503 | `{ "error" }` |

use crate::error::GuardError;
use crate::guard::{PinGuard, VerifyOutcome};
use crate::hashing::PinHasher;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use wallboard_core::ProfileId;
use wallboard_storage::repositories::{PinAuditRepository, ProfileRepository};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinRequest {
    pub pin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPinRequest {
    pub pin: Option<String>,
    pub current_pin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePinRequest {
    pub current_pin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPinRequest {
    pub admin_profile_id: Option<String>,
    pub admin_pin: Option<String>,
    pub new_pin: Option<String>,
}

/// Status code and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self::with_body(200, json!({ "success": true }))
    }

    pub fn with_body(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<GuardError> for ApiResponse {
    fn from(err: GuardError) -> Self {
        let status = err.status_code();
        let message = if status >= 500 {
            tracing::error!("PIN request failed: {err}");
            "Temporary failure, please try again".to_string()
        } else {
            err.to_string()
        };

        let mut body = json!({ "error": message });
        match err {
            GuardError::AdminPinIncorrect { attempts_remaining } => {
                body["attemptsRemaining"] = json!(attempts_remaining);
            }
            GuardError::Locked { remaining_seconds }
            | GuardError::AdminLocked { remaining_seconds } => {
                body["lockedFor"] = json!(remaining_seconds);
            }
            _ => {}
        }

        Self::with_body(status, body)
    }
}

/// JSON handlers for verify, set, remove, reset and status.
pub struct PinApi<P, A, H> {
    guard: Arc<PinGuard<P, A, H>>,
}

impl<P, A, H> Clone for PinApi<P, A, H> {
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<P, A, H> PinApi<P, A, H>
where
    P: ProfileRepository,
    A: PinAuditRepository,
    H: PinHasher,
{
    pub fn new(guard: Arc<PinGuard<P, A, H>>) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &PinGuard<P, A, H> {
        &self.guard
    }

    /// `{ pin }` -> verified, incorrect with attempts remaining, or locked.
    pub async fn verify(&self, profile_id: &str, body: &str) -> ApiResponse {
        let result = async {
            let request: VerifyPinRequest = parse_body(body)?;
            let id = ProfileId::new(profile_id)?;
            let pin = request.pin.ok_or(GuardError::MissingField("pin"))?;
            self.guard.verify_pin(&id, &pin).await
        }
        .await;

        match result {
            Ok(VerifyOutcome::Verified) => ApiResponse::ok(),
            Ok(VerifyOutcome::Incorrect { attempts_remaining }) => ApiResponse::with_body(
                401,
                json!({ "error": "Incorrect PIN", "attemptsRemaining": attempts_remaining }),
            ),
            Ok(VerifyOutcome::Locked { remaining_seconds }) => ApiResponse::with_body(
                429,
                json!({ "error": "Too many attempts, profile locked", "lockedFor": remaining_seconds }),
            ),
            Err(e) => e.into(),
        }
    }

    /// `{ pin, currentPin? }`
    pub async fn set(&self, profile_id: &str, body: &str) -> ApiResponse {
        respond(
            async {
                let request: SetPinRequest = parse_body(body)?;
                let id = ProfileId::new(profile_id)?;
                let pin = request.pin.ok_or(GuardError::MissingField("pin"))?;
                self.guard
                    .set_pin(&id, &pin, request.current_pin.as_deref())
                    .await
            }
            .await,
        )
    }

    /// `{ currentPin }`
    pub async fn remove(&self, profile_id: &str, body: &str) -> ApiResponse {
        respond(
            async {
                let request: RemovePinRequest = parse_body(body)?;
                let id = ProfileId::new(profile_id)?;
                let current = request
                    .current_pin
                    .ok_or(GuardError::MissingField("currentPin"))?;
                self.guard.remove_pin(&id, &current).await
            }
            .await,
        )
    }

    /// `{ adminProfileId, adminPin, newPin }`
    pub async fn reset(&self, profile_id: &str, body: &str) -> ApiResponse {
        respond(
            async {
                let request: ResetPinRequest = parse_body(body)?;
                let target = ProfileId::new(profile_id)?;
                let admin_id = request
                    .admin_profile_id
                    .ok_or(GuardError::MissingField("adminProfileId"))
                    .and_then(|id| {
                        ProfileId::new(id).map_err(|_| GuardError::MissingField("adminProfileId"))
                    })?;
                let admin_pin = request
                    .admin_pin
                    .ok_or(GuardError::MissingField("adminPin"))?;
                let new_pin = request.new_pin.ok_or(GuardError::MissingField("newPin"))?;
                self.guard
                    .reset_pin(&target, &admin_id, &admin_pin, &new_pin)
                    .await
            }
            .await,
        )
    }

    /// PIN state for countdown display.
    pub async fn status(&self, profile_id: &str) -> ApiResponse {
        let result = async {
            let id = ProfileId::new(profile_id)?;
            self.guard.pin_status(&id).await
        }
        .await;

        match result {
            Ok(status) => ApiResponse::with_body(
                200,
                json!({
                    "pinEnabled": status.pin_enabled,
                    "lockedFor": status.locked_for_seconds,
                    "failedAttempts": status.failed_attempts,
                    "attemptsRemaining": status.attempts_remaining,
                    "recentLockouts": status.recent_lockouts,
                }),
            ),
            Err(e) => e.into(),
        }
    }
}

fn respond(result: Result<(), GuardError>) -> ApiResponse {
    match result {
        Ok(()) => ApiResponse::ok(),
        Err(e) => e.into(),
    }
}

/// Decode a request body; an empty body reads as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &str) -> Result<T, GuardError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body)
        .map_err(|e| GuardError::InvalidRequest(format!("malformed request body: {e}")))
}
