//! Storage layer for the wallboard kiosk.
//!
//! SQLite-backed persistence for family profiles and their PIN state, the
//! PIN audit trail, opaque settings documents (the screen schedule among
//! them) and cached collections of fetched calendar data.
//!
//! # Architecture
//!
//! - [`Database`] - connection pool manager with embedded migrations
//! - [`ProfileRepository`], [`PinAuditRepository`] - profile data access
//! - [`SettingsStore`], [`BlobCache`] - key-value and collection storage,
//!   each with SQLite and in-memory implementations
//! - [`ScheduleStore`] - the screen schedule as one settings document
//!
//! # Concurrency
//!
//! PIN columns change only through
//! [`ProfileRepository::compare_and_swap_pin_state`], a conditional update
//! on the row's `pin_version`. A writer that lost the race sees `false` and
//! must re-read before deciding again.
//!
//! # Example
//!
//! ```no_run
//! use wallboard_storage::{Database, DatabaseConfig, ProfileRepository, SqliteProfileRepository};
//! use wallboard_storage::models::Profile;
//! use wallboard_core::ProfileType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("wallboard.db")).await?;
//! let profiles = SqliteProfileRepository::new(db.pool().clone());
//!
//! profiles.create(&Profile::new("Parent", ProfileType::Admin)).await?;
//! for profile in profiles.find_all().await? {
//!     println!("{} (PIN: {})", profile.name, profile.has_pin());
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;
pub mod schedule_store;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{PinAuditEntry, PinEvent, PinState, Profile};
pub use repositories::{
    BlobCache, CachedBlob, MemoryBlobCache, MemorySettingsStore, PinAuditRepository,
    ProfileRepository, SettingsStore, SqliteBlobCache, SqlitePinAuditRepository,
    SqliteProfileRepository, SqliteSettingsStore,
};
pub use schedule_store::ScheduleStore;
