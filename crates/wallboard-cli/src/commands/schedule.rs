//! Inspect and replace the stored screen schedule.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use wallboard_schedule::{ScheduleConfig, ScheduleInput, evaluate};
use wallboard_storage::{Database, ScheduleStore, SqliteSettingsStore};

use super::kiosk::describe;

fn store(db: &Database) -> ScheduleStore<SqliteSettingsStore> {
    ScheduleStore::new(SqliteSettingsStore::new(db.pool().clone()))
}

/// Print the stored schedule as JSON, followed by what a fresh kiosk would
/// show right now.
pub async fn show(db: &Database) -> Result<ScheduleConfig> {
    let config = store(db).load().await.context("Failed to load schedule")?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    let selection = evaluate(&config, &ScheduleInput::at(Local::now().naive_local()));
    println!("now: {}", describe(&selection));
    Ok(config)
}

/// Replace the stored schedule with the JSON document at `path`.
pub async fn import(db: &Database, path: &Path) -> Result<ScheduleConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ScheduleConfig = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a schedule document", path.display()))?;

    store(db)
        .save(&config)
        .await
        .context("Failed to save schedule")?;
    println!(
        "Imported {} sequences and {} time-specific navigations",
        config.sequences.len(),
        config.time_specific.len()
    );
    Ok(config)
}

pub async fn reset(db: &Database) -> Result<()> {
    store(db).reset().await.context("Failed to reset schedule")?;
    println!("Schedule reset to default");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "sequences": [{
            "id": "morning",
            "name": "Morning",
            "screens": ["calendar", "chores"],
            "intervalSeconds": 30,
            "pauseOnInteractionSeconds": 120,
            "enabled": true
        }],
        "timeSpecific": []
    }"#;

    #[tokio::test]
    async fn test_import_then_show() {
        let db = Database::in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, DOCUMENT).unwrap();

        let imported = import(&db, &path).await.unwrap();
        let shown = show(&db).await.unwrap();
        assert_eq!(imported, shown);
        assert_eq!(shown.sequences[0].id, "morning");

        reset(&db).await.unwrap();
        let restored = show(&db).await.unwrap();
        assert_eq!(restored.sequences[0].name, "Default");
        assert!(restored.time_specific.is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let db = Database::in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(import(&db, &path).await.is_err());
        assert!(import(&db, &dir.path().join("missing.json")).await.is_err());
    }
}
