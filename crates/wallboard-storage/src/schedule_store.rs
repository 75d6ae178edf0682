//! Persistence of the screen schedule as a single settings document.
//!
//! The whole [`ScheduleConfig`] lives as one JSON value under
//! [`SCHEDULE_SETTINGS_KEY`]. It is loaded once at startup and replaced
//! wholesale on save; there are no partial updates.

use crate::error::StorageResult;
use crate::repositories::SettingsStore;
use wallboard_core::constants::SCHEDULE_SETTINGS_KEY;
use wallboard_schedule::ScheduleConfig;

/// Loads and saves the screen schedule through a [`SettingsStore`].
///
/// # Example
///
/// ```no_run
/// use wallboard_storage::{Database, ScheduleStore, SqliteSettingsStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::in_memory().await?;
/// let store = ScheduleStore::new(SqliteSettingsStore::new(db.pool().clone()));
///
/// let mut config = store.load().await?;
/// config.sequences[0].interval_seconds = 30;
/// store.save(&config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScheduleStore<S> {
    settings: S,
}

impl<S: SettingsStore> ScheduleStore<S> {
    pub fn new(settings: S) -> Self {
        Self { settings }
    }

    /// Load the stored schedule.
    ///
    /// A missing or unreadable document yields
    /// [`ScheduleConfig::default_config`]; only store failures are errors.
    /// Individual entries of the wrong shape are dropped while the rest of
    /// the document loads. Documents that parse but break a structural rule
    /// are returned as-is since evaluation skips entries it cannot use.
    pub async fn load(&self) -> StorageResult<ScheduleConfig> {
        let Some(raw) = self.settings.get(SCHEDULE_SETTINGS_KEY).await? else {
            tracing::debug!("No stored screen schedule, using defaults");
            return Ok(ScheduleConfig::default_config());
        };

        match serde_json::from_str::<ScheduleConfig>(&raw) {
            Ok(config) => {
                if let Err(e) = config.validate() {
                    tracing::warn!("Stored screen schedule has invalid entries: {e}");
                }
                Ok(config)
            }
            Err(e) => {
                tracing::warn!("Stored screen schedule is corrupt, using defaults: {e}");
                Ok(ScheduleConfig::default_config())
            }
        }
    }

    /// Validate and store `config`, replacing the previous document.
    pub async fn save(&self, config: &ScheduleConfig) -> StorageResult<()> {
        config.validate()?;
        let json = serde_json::to_string(config)?;
        self.settings.set(SCHEDULE_SETTINGS_KEY, &json).await?;

        tracing::info!(
            sequences = config.sequences.len(),
            overrides = config.time_specific.len(),
            "Saved screen schedule"
        );
        Ok(())
    }

    /// Forget the stored schedule so the next load returns defaults.
    pub async fn reset(&self) -> StorageResult<()> {
        self.settings.delete(SCHEDULE_SETTINGS_KEY).await
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::repositories::MemorySettingsStore;
    use wallboard_schedule::{create_default_sequence, create_default_time_specific};

    fn store() -> ScheduleStore<MemorySettingsStore> {
        ScheduleStore::new(MemorySettingsStore::new())
    }

    #[tokio::test]
    async fn test_missing_schedule_loads_default() {
        let config = store().load().await.unwrap();

        assert_eq!(config.sequences.len(), 1);
        assert_eq!(config.sequences[0].screens, vec!["calendar", "tasks"]);
        assert!(config.time_specific.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_is_equal() {
        let store = store();
        let mut override_entry = create_default_time_specific();
        override_entry.days = Some(vec![1, 3, 5]);
        let config = ScheduleConfig {
            sequences: vec![create_default_sequence()],
            time_specific: vec![override_entry],
        };

        store.save(&config).await.unwrap();
        assert_eq!(store.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_corrupt_schedule_loads_default() {
        let store = store();
        store
            .settings()
            .set(SCHEDULE_SETTINGS_KEY, "{not json")
            .await
            .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.sequences.len(), 1);
        assert_eq!(config.sequences[0].name, "Default");
    }

    #[tokio::test]
    async fn test_legacy_document_gets_defaults() {
        let store = store();
        store
            .settings()
            .set(
                SCHEDULE_SETTINGS_KEY,
                r#"{"sequences":[{"id":"s1","name":"Morning","screens":["calendar"]}]}"#,
            )
            .await
            .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.sequences[0].interval_seconds, 60);
        assert_eq!(config.sequences[0].pause_on_interaction_seconds, 120);
        assert!(config.sequences[0].enabled);
        assert!(config.time_specific.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entry_keeps_the_rest_of_the_schedule() {
        let store = store();
        store
            .settings()
            .set(
                SCHEDULE_SETTINGS_KEY,
                r#"{
                    "sequences": [{"id": "mine", "name": "Mine", "screens": ["recipe", "photos"],
                                   "intervalSeconds": 30, "pauseOnInteractionSeconds": 60, "enabled": true}],
                    "timeSpecific": [
                        {"id": "bad-time", "screen": "tasks", "time": null, "durationMinutes": 10},
                        {"id": "bad-days", "screen": "tasks", "time": "07:00", "days": [-1]},
                        {"id": "dinner", "screen": "recipe", "time": "18:00", "durationMinutes": 45}
                    ]
                }"#,
            )
            .await
            .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.sequences.len(), 1);
        assert_eq!(config.sequences[0].name, "Mine");
        assert_eq!(config.sequences[0].screens, vec!["recipe", "photos"]);
        assert_eq!(config.time_specific.len(), 1);
        assert_eq!(config.time_specific[0].id, "dinner");

        store.save(&config).await.unwrap();
        assert_eq!(store.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_schedule() {
        let store = store();
        let mut sequence = create_default_sequence();
        sequence.screens.clear();
        let config = ScheduleConfig {
            sequences: vec![sequence],
            time_specific: vec![],
        };

        assert!(matches!(
            store.save(&config).await,
            Err(StorageError::Validation(_))
        ));
        assert_eq!(store.settings().get(SCHEDULE_SETTINGS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_restores_default() {
        let store = store();
        let config = ScheduleConfig {
            sequences: vec![],
            time_specific: vec![],
        };
        store.save(&config).await.unwrap();
        assert!(store.load().await.unwrap().sequences.is_empty());

        store.reset().await.unwrap();
        assert_eq!(store.load().await.unwrap().sequences.len(), 1);
    }
}
