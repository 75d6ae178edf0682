#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// One cached item of a collection (an event, a task list).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CachedBlob {
    #[sqlx(rename = "item_key")]
    pub key: String,
    /// Opaque JSON
    pub payload: String,
    pub stored_at: DateTime<Utc>,
}

/// Collection-scoped cache of fetched data.
///
/// Items are keyed within their collection; putting an existing key
/// replaces the payload.
pub trait BlobCache: Send + Sync {
    /// Insert or replace every `(key, payload)` pair atomically
    async fn bulk_put(&self, collection: &str, items: &[(String, String)]) -> StorageResult<()>;

    /// Every item of `collection`, ordered by key
    async fn get_all(&self, collection: &str) -> StorageResult<Vec<CachedBlob>>;

    /// Drop the whole collection, returning how many items were removed
    async fn clear(&self, collection: &str) -> StorageResult<u64>;
}

/// SQLite implementation of BlobCache
#[derive(Debug, Clone)]
pub struct SqliteBlobCache {
    pool: SqlitePool,
}

impl SqliteBlobCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl BlobCache for SqliteBlobCache {
    async fn bulk_put(&self, collection: &str, items: &[(String, String)]) -> StorageResult<()> {
        let stored_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (key, payload) in items {
            sqlx::query(
                r#"
                INSERT INTO cache_entries (collection, item_key, payload, stored_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (collection, item_key)
                DO UPDATE SET payload = excluded.payload, stored_at = excluded.stored_at
                "#,
            )
            .bind(collection)
            .bind(key)
            .bind(payload)
            .bind(stored_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(collection, count = items.len(), "Cached items");
        Ok(())
    }

    async fn get_all(&self, collection: &str) -> StorageResult<Vec<CachedBlob>> {
        let items = sqlx::query_as::<_, CachedBlob>(
            r#"
            SELECT item_key, payload, stored_at
            FROM cache_entries
            WHERE collection = ?
            ORDER BY item_key
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn clear(&self, collection: &str) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE collection = ?")
            .bind(collection)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// In-memory BlobCache for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobCache {
    collections: RwLock<HashMap<String, BTreeMap<String, CachedBlob>>>,
}

impl MemoryBlobCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobCache for MemoryBlobCache {
    async fn bulk_put(&self, collection: &str, items: &[(String, String)]) -> StorageResult<()> {
        let stored_at = Utc::now();
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();

        for (key, payload) in items {
            entries.insert(
                key.clone(),
                CachedBlob {
                    key: key.clone(),
                    payload: payload.clone(),
                    stored_at,
                },
            );
        }

        Ok(())
    }

    async fn get_all(&self, collection: &str) -> StorageResult<Vec<CachedBlob>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self, collection: &str) -> StorageResult<u64> {
        Ok(self
            .collections
            .write()
            .await
            .remove(collection)
            .map_or(0, |entries| entries.len() as u64))
    }
}
