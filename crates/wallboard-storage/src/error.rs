use thiserror::Error;

/// Storage-specific error types for the wallboard kiosk.
///
/// These errors represent failures in database operations, settings
/// serialization and data integrity checks.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found in database
    #[error("Entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: String,
        field: String,
        value: String,
    },

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored JSON document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    pub(crate) fn not_found(entity_type: &str, field: &str, value: impl ToString) -> Self {
        StorageError::NotFound {
            entity_type: entity_type.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<wallboard_core::Error> for StorageError {
    fn from(err: wallboard_core::Error) -> Self {
        StorageError::Validation(err.to_string())
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
