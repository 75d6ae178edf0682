use crate::error::{StorageError, StorageResult};
use serde::Deserialize;
use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// SQLite connection settings for the kiosk database.
///
/// Deserializable so it can live in the `[database]` section of the kiosk
/// configuration file; every field is optional there and falls back to
/// [`DatabaseConfig::default`]. Durations are given in seconds.
///
/// ```toml
/// [database]
/// path = "/var/lib/wallboard/wallboard.db"
/// max_connections = 4
/// busy_timeout_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Idle connections kept open
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection before failing
    pub acquire_timeout_secs: u64,

    /// Seconds a writer waits on a locked database before failing
    pub busy_timeout_secs: u64,

    /// Create the database file if it does not exist
    pub create_if_missing: bool,

    /// Apply pending migrations on connect
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "wallboard.db".to_string(),
            max_connections: 4,
            min_connections: 1,
            acquire_timeout_secs: 10,
            busy_timeout_secs: 5,
            create_if_missing: true,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for the database file at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn busy_timeout_secs(mut self, secs: u64) -> Self {
        self.busy_timeout_secs = secs;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.auto_migrate = migrate;
        self
    }

    fn validate(&self) -> StorageResult<()> {
        if self.path.trim().is_empty() {
            return Err(StorageError::Configuration(
                "database path must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(StorageError::Configuration(format!(
                "invalid pool size: min {} max {}",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

/// Pooled handle to the kiosk database.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and by default migrate) the database described by `config`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wallboard_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new(DatabaseConfig::new("wallboard.db").max_connections(2)).await?;
    /// db.health_check().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        config.validate()?;

        if let Some(parent) = Path::new(&config.path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!("Failed to create database directory: {e}"))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path))
            .map_err(|e| StorageError::Configuration(format!("Invalid database path: {e}")))?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::info!("Opened database at {}", config.path);

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// Fresh in-memory database with the schema applied (tests, demos).
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // One connection that never expires: dropping it would drop the database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Apply pending migrations from `migrations/`.
    ///
    /// The migration files are embedded at compile time, so the binary does
    /// not read them from disk at runtime. Already applied migrations are
    /// skipped.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();

        assert_eq!(config.path, "wallboard.db");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.busy_timeout_secs, 5);
        assert!(config.create_if_missing);
        assert!(config.auto_migrate);
    }

    #[test]
    fn test_database_config_builder() {
        let config = DatabaseConfig::new("kiosk.db")
            .max_connections(2)
            .min_connections(0)
            .busy_timeout_secs(1)
            .create_if_missing(false)
            .auto_migrate(false);

        assert_eq!(config.path, "kiosk.db");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.min_connections, 0);
        assert_eq!(config.busy_timeout_secs, 1);
        assert!(!config.create_if_missing);
        assert!(!config.auto_migrate);
    }

    #[test]
    fn test_database_config_validation() {
        assert!(DatabaseConfig::new("").validate().is_err());
        assert!(
            DatabaseConfig::new("x.db")
                .max_connections(1)
                .min_connections(2)
                .validate()
                .is_err()
        );
        assert!(DatabaseConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_file_database_is_created_and_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kiosk.db");

        let db = Database::new(DatabaseConfig::new(path.to_string_lossy()))
            .await
            .unwrap();
        db.health_check().await.unwrap();

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'profiles'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, 1);
        assert!(path.exists());

        db.close().await;
    }
}
