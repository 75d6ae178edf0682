//! Integration tests for database connection, migrations and concurrent
//! PIN state writes.
//!
//! Run with: cargo test --package wallboard-storage --test integration_database

use std::sync::Arc;
use tokio::sync::Barrier;
use wallboard_core::ProfileType;
use wallboard_storage::connection::{Database, DatabaseConfig};
use wallboard_storage::models::Profile;
use wallboard_storage::repositories::{ProfileRepository, SqliteProfileRepository};

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().await.unwrap();
    db.health_check().await.unwrap();
    db.close().await;
}

#[tokio::test]
async fn test_migration_idempotency() {
    let db = Database::in_memory().await.unwrap();

    db.migrate().await.unwrap();
    db.migrate().await.unwrap();

    let result: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
         AND name IN ('profiles', 'pin_audit_log', 'settings', 'cache_entries')",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();

    assert_eq!(result.0, 4);

    db.close().await;
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallboard.db");
    let config = DatabaseConfig::new(path.to_string_lossy());

    let profile = Profile::new("Parent", ProfileType::Admin);
    {
        let db = Database::new(config.clone()).await.unwrap();
        SqliteProfileRepository::new(db.pool().clone())
            .create(&profile)
            .await
            .unwrap();
        db.close().await;
    }

    let db = Database::new(config).await.unwrap();
    let found = SqliteProfileRepository::new(db.pool().clone())
        .find_by_id(&profile.id)
        .await
        .unwrap();
    assert_eq!(found.map(|p| p.name), Some("Parent".to_string()));

    db.close().await;
}

/// Every task keeps retrying its compare-and-swap until it lands, so with
/// N tasks the counter must end at exactly N.
#[tokio::test]
async fn test_concurrent_compare_and_swap_loses_no_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cas.db");
    let db = Database::new(DatabaseConfig::new(path.to_string_lossy()).max_connections(4))
        .await
        .unwrap();

    let profile = Profile::new("Kid", ProfileType::Standard);
    SqliteProfileRepository::new(db.pool().clone())
        .create(&profile)
        .await
        .unwrap();

    const NUM_CONCURRENT_TASKS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_CONCURRENT_TASKS));

    let mut handles = vec![];

    for _ in 0..NUM_CONCURRENT_TASKS {
        let repo = SqliteProfileRepository::new(db.pool().clone());
        let barrier_clone = barrier.clone();
        let id = profile.id.clone();

        let handle = tokio::spawn(async move {
            barrier_clone.wait().await;

            let mut conflicts = 0u32;
            loop {
                let current = repo.find_by_id(&id).await.unwrap().unwrap();
                let mut state = current.pin_state();
                state.failed_pin_attempts += 1;

                if repo
                    .compare_and_swap_pin_state(&id, current.pin_version, &state)
                    .await
                    .unwrap()
                {
                    return conflicts;
                }
                conflicts += 1;
            }
        });

        handles.push(handle);
    }

    let results: Vec<_> = futures::future::join_all(handles).await;
    assert_eq!(results.len(), NUM_CONCURRENT_TASKS);
    for result in results {
        result.unwrap();
    }

    let stored = SqliteProfileRepository::new(db.pool().clone())
        .find_by_id(&profile.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.failed_pin_attempts, NUM_CONCURRENT_TASKS as u32);
    assert_eq!(stored.pin_version, NUM_CONCURRENT_TASKS as i64);

    db.close().await;
}
