pub mod cache;
pub mod pin_audit;
pub mod profile;
pub mod settings;

pub use cache::{BlobCache, CachedBlob, MemoryBlobCache, SqliteBlobCache};
pub use pin_audit::{PinAuditRepository, SqlitePinAuditRepository};
pub use profile::{ProfileRepository, SqliteProfileRepository};
pub use settings::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};
