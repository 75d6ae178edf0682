//! PIN operations routed through the request surface of the guard.

use std::sync::Arc;

use anyhow::{Result, bail};
use serde_json::json;
use wallboard_core::TracingTelemetry;
use wallboard_guard::{ApiResponse, Argon2PinHasher, GuardConfig, PinApi, PinGuard};
use wallboard_storage::{Database, SqlitePinAuditRepository, SqliteProfileRepository};

pub type KioskPinApi = PinApi<SqliteProfileRepository, SqlitePinAuditRepository, Argon2PinHasher>;

/// A PIN request as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinRequest {
    Verify {
        profile: String,
        pin: String,
    },
    Set {
        profile: String,
        pin: String,
        current: Option<String>,
    },
    Remove {
        profile: String,
        current: String,
    },
    Reset {
        profile: String,
        admin: String,
        admin_pin: String,
        new_pin: String,
    },
    Status {
        profile: String,
    },
}

pub fn build_api(db: &Database, config: &GuardConfig) -> Result<KioskPinApi> {
    let guard = PinGuard::new(
        SqliteProfileRepository::new(db.pool().clone()),
        SqlitePinAuditRepository::new(db.pool().clone()),
        Argon2PinHasher::new(),
        config.clone(),
    )?
    .with_telemetry(Arc::new(TracingTelemetry::new("wallboard-cli")));
    Ok(PinApi::new(Arc::new(guard)))
}

pub async fn dispatch(api: &KioskPinApi, request: PinRequest) -> ApiResponse {
    match request {
        PinRequest::Verify { profile, pin } => {
            api.verify(&profile, &json!({ "pin": pin }).to_string()).await
        }
        PinRequest::Set {
            profile,
            pin,
            current,
        } => {
            let body = json!({ "pin": pin, "currentPin": current });
            api.set(&profile, &body.to_string()).await
        }
        PinRequest::Remove { profile, current } => {
            api.remove(&profile, &json!({ "currentPin": current }).to_string())
                .await
        }
        PinRequest::Reset {
            profile,
            admin,
            admin_pin,
            new_pin,
        } => {
            let body = json!({
                "adminProfileId": admin,
                "adminPin": admin_pin,
                "newPin": new_pin,
            });
            api.reset(&profile, &body.to_string()).await
        }
        PinRequest::Status { profile } => api.status(&profile).await,
    }
}

/// Print the response and fail on a non-success status.
pub async fn run(api: &KioskPinApi, request: PinRequest) -> Result<()> {
    let response = dispatch(api, request).await;
    println!("{} {}", response.status, response.body);
    if !response.is_success() {
        bail!("PIN request failed with status {}", response.status);
    }
    Ok(())
}
