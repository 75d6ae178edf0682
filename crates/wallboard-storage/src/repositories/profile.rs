#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::{PinState, Profile};
use sqlx::SqlitePool;

/// Repository trait for profile and PIN state persistence.
///
/// PIN columns are never written by a plain update: every change goes
/// through [`ProfileRepository::compare_and_swap_pin_state`], so two
/// concurrent verifications of the same profile cannot both apply a
/// decision made from the same snapshot.
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Profile>>;

    /// All profiles, admins first, then by name
    async fn find_all(&self) -> StorageResult<Vec<Profile>>;

    async fn create(&self, profile: &Profile) -> StorageResult<()>;

    /// Change the display name
    async fn rename(&self, id: &str, name: &str) -> StorageResult<()>;

    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Replace the PIN columns if the stored `pin_version` still equals
    /// `expected_version`, bumping the version on success.
    ///
    /// Returns `Ok(false)` when another writer got there first, and
    /// `StorageError::NotFound` when the profile no longer exists.
    async fn compare_and_swap_pin_state(
        &self,
        id: &str,
        expected_version: i64,
        state: &PinState,
    ) -> StorageResult<bool>;
}

/// SQLite implementation of ProfileRepository
#[derive(Debug, Clone)]
pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &str) -> StorageResult<bool> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, name, profile_type, pin_enabled, pin_hash,
                   failed_pin_attempts, pin_locked_until, pin_version,
                   created_at, updated_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_all(&self) -> StorageResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, name, profile_type, pin_enabled, pin_hash,
                   failed_pin_attempts, pin_locked_until, pin_version,
                   created_at, updated_at
            FROM profiles
            ORDER BY profile_type = 'admin' DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn create(&self, profile: &Profile) -> StorageResult<()> {
        if profile.name.trim().is_empty() {
            return Err(StorageError::Validation(
                "profile name must not be empty".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, name, profile_type, pin_enabled, pin_hash,
                failed_pin_attempts, pin_locked_until, pin_version,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(profile.profile_type.as_str())
        .bind(profile.pin_enabled)
        .bind(&profile.pin_hash)
        .bind(profile.failed_pin_attempts)
        .bind(profile.pin_locked_until)
        .bind(profile.pin_version)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(profile_id = %profile.id, "Created profile");
        Ok(())
    }

    async fn rename(&self, id: &str, name: &str) -> StorageResult<()> {
        let result = sqlx::query("UPDATE profiles SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Profile", "id", id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Profile", "id", id));
        }

        Ok(())
    }

    async fn compare_and_swap_pin_state(
        &self,
        id: &str,
        expected_version: i64,
        state: &PinState,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET pin_enabled = ?, pin_hash = ?, failed_pin_attempts = ?,
                pin_locked_until = ?, pin_version = pin_version + 1,
                updated_at = ?
            WHERE id = ? AND pin_version = ?
            "#,
        )
        .bind(state.pin_enabled)
        .bind(&state.pin_hash)
        .bind(state.failed_pin_attempts)
        .bind(state.pin_locked_until)
        .bind(chrono::Utc::now())
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        if self.exists(id).await? {
            tracing::debug!(profile_id = %id, expected_version, "PIN state version conflict");
            Ok(false)
        } else {
            Err(StorageError::not_found("Profile", "id", id))
        }
    }
}
