#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::{PinAuditEntry, PinEvent};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Append-only store for PIN audit entries.
pub trait PinAuditRepository: Send + Sync {
    /// Append an entry, returning its row id
    async fn append(&self, entry: &PinAuditEntry) -> StorageResult<i64>;

    /// Most recent entries for a profile, newest first
    async fn find_by_profile(&self, profile_id: &str, limit: i64)
    -> StorageResult<Vec<PinAuditEntry>>;

    /// Count entries of one kind for a profile since `since`
    async fn count_events_since(
        &self,
        profile_id: &str,
        event: PinEvent,
        since: DateTime<Utc>,
    ) -> StorageResult<i64>;
}

/// SQLite implementation of PinAuditRepository
#[derive(Debug, Clone)]
pub struct SqlitePinAuditRepository {
    pool: SqlitePool,
}

impl SqlitePinAuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PinAuditRepository for SqlitePinAuditRepository {
    async fn append(&self, entry: &PinAuditEntry) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO pin_audit_log (profile_id, actor_profile_id, event, detail, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.profile_id)
        .bind(&entry.actor_profile_id)
        .bind(entry.event.as_str())
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_profile(
        &self,
        profile_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<PinAuditEntry>> {
        let entries = sqlx::query_as::<_, PinAuditEntry>(
            r#"
            SELECT id, profile_id, actor_profile_id, event, detail, created_at
            FROM pin_audit_log
            WHERE profile_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(profile_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn count_events_since(
        &self,
        profile_id: &str,
        event: PinEvent,
        since: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM pin_audit_log
            WHERE profile_id = ? AND event = ? AND created_at >= ?
            "#,
        )
        .bind(profile_id)
        .bind(event.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
