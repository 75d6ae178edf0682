use std::time::Duration;
use thiserror::Error;
use wallboard_storage::StorageError;

/// Failures of a PIN guard operation.
///
/// A wrong PIN during plain verification is not an error: it is reported
/// through [`crate::VerifyOutcome`]. The variants here cover requests that
/// cannot be decided (bad input, missing profile, store trouble) and the
/// credential checks of the administrative operations.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Submitted PIN is not 4-6 ASCII digits
    #[error("Invalid PIN format: {0}")]
    InvalidPinFormat(String),

    /// Request body could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Required request field was absent
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// The profile has no PIN configured
    #[error("Profile {0} has no PIN configured")]
    NotApplicable(String),

    /// Current PIN did not match during a change or removal
    #[error("Current PIN is incorrect")]
    IncorrectCurrentPin,

    /// Business rule forbids the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Acting profile is not allowed to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Admin PIN mismatch during a reset; consumes an admin attempt
    #[error("Admin PIN is incorrect ({attempts_remaining} attempts remaining)")]
    AdminPinIncorrect { attempts_remaining: u32 },

    /// Acting admin is locked out
    #[error("Admin profile locked for {remaining_seconds} seconds")]
    AdminLocked { remaining_seconds: u64 },

    /// Target profile is locked out
    #[error("Profile locked for {remaining_seconds} seconds")]
    Locked { remaining_seconds: u64 },

    /// Lost every compare-and-swap race for the profile
    #[error("Concurrent update of profile {profile_id} after {attempts} attempts")]
    Conflict { profile_id: String, attempts: u32 },

    #[error("Store did not answer within {0:?}")]
    StoreTimeout(Duration),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GuardError {
    /// HTTP-style status for the request surface.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::InvalidPinFormat(_)
            | GuardError::InvalidRequest(_)
            | GuardError::MissingField(_) => 400,
            GuardError::IncorrectCurrentPin
            | GuardError::Unauthorized(_)
            | GuardError::AdminPinIncorrect { .. } => 401,
            GuardError::Forbidden(_) => 403,
            GuardError::ProfileNotFound(_) => 404,
            GuardError::NotApplicable(_) => 409,
            GuardError::Locked { .. } | GuardError::AdminLocked { .. } => 429,
            GuardError::Conflict { .. } | GuardError::StoreTimeout(_) | GuardError::Storage(_) => {
                503
            }
            GuardError::Hashing(_) | GuardError::Configuration(_) => 500,
        }
    }

    /// Transient failures the user may simply try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GuardError::Conflict { .. } | GuardError::StoreTimeout(_) | GuardError::Storage(_)
        )
    }
}

impl From<StorageError> for GuardError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { value, .. } => GuardError::ProfileNotFound(value),
            other => GuardError::Storage(other),
        }
    }
}

impl From<wallboard_core::Error> for GuardError {
    fn from(err: wallboard_core::Error) -> Self {
        match err {
            wallboard_core::Error::InvalidPinFormat(msg) => GuardError::InvalidPinFormat(msg),
            wallboard_core::Error::InvalidProfileId(_) => GuardError::MissingField("profileId"),
            other => GuardError::Configuration(other.to_string()),
        }
    }
}

/// Specialized result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GuardError::InvalidPinFormat("x".into()), 400, false)]
    #[case(GuardError::MissingField("pin"), 400, false)]
    #[case(GuardError::InvalidRequest("eof".into()), 400, false)]
    #[case(GuardError::IncorrectCurrentPin, 401, false)]
    #[case(GuardError::AdminPinIncorrect { attempts_remaining: 2 }, 401, false)]
    #[case(GuardError::Unauthorized("not admin".into()), 401, false)]
    #[case(GuardError::Forbidden("admin".into()), 403, false)]
    #[case(GuardError::ProfileNotFound("p".into()), 404, false)]
    #[case(GuardError::NotApplicable("p".into()), 409, false)]
    #[case(GuardError::Locked { remaining_seconds: 10 }, 429, false)]
    #[case(GuardError::AdminLocked { remaining_seconds: 10 }, 429, false)]
    #[case(GuardError::Conflict { profile_id: "p".into(), attempts: 4 }, 503, true)]
    #[case(GuardError::StoreTimeout(Duration::from_secs(5)), 503, true)]
    #[case(GuardError::Hashing("bad".into()), 500, false)]
    fn test_status_and_retryability(
        #[case] error: GuardError,
        #[case] status: u16,
        #[case] retryable: bool,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.is_retryable(), retryable);
    }

    #[test]
    fn test_storage_not_found_becomes_profile_not_found() {
        let err: GuardError = StorageError::NotFound {
            entity_type: "Profile".into(),
            field: "id".into(),
            value: "abc".into(),
        }
        .into();
        assert!(matches!(err, GuardError::ProfileNotFound(id) if id == "abc"));

        let err: GuardError = StorageError::Internal("disk".into()).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_core_pin_error_maps_to_format_error() {
        let err: GuardError = wallboard_core::Error::InvalidPinFormat("too short".into()).into();
        assert_eq!(err.status_code(), 400);
    }
}
