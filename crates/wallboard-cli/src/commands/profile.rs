//! Household profile management.

use anyhow::{Context, Result};
use chrono::Utc;
use wallboard_core::ProfileType;
use wallboard_storage::models::Profile;
use wallboard_storage::{Database, ProfileRepository, SqliteProfileRepository};

pub async fn add(db: &Database, name: &str, admin: bool) -> Result<Profile> {
    let kind = if admin {
        ProfileType::Admin
    } else {
        ProfileType::Standard
    };
    let profile = Profile::new(name, kind);
    SqliteProfileRepository::new(db.pool().clone())
        .create(&profile)
        .await
        .with_context(|| format!("Failed to create profile '{name}'"))?;

    println!("{}", profile.id);
    Ok(profile)
}

pub async fn list(db: &Database) -> Result<Vec<Profile>> {
    let profiles = SqliteProfileRepository::new(db.pool().clone())
        .find_all()
        .await
        .context("Failed to list profiles")?;

    let now = Utc::now();
    for profile in &profiles {
        println!("{}", render(profile, now));
    }
    Ok(profiles)
}

pub async fn rename(db: &Database, id: &str, name: &str) -> Result<()> {
    SqliteProfileRepository::new(db.pool().clone())
        .rename(id, name)
        .await
        .with_context(|| format!("Failed to rename profile {id}"))?;
    Ok(())
}

pub async fn remove(db: &Database, id: &str) -> Result<()> {
    SqliteProfileRepository::new(db.pool().clone())
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete profile {id}"))?;
    Ok(())
}

fn render(profile: &Profile, now: chrono::DateTime<Utc>) -> String {
    let pin = match profile.lock_remaining_seconds(now) {
        Some(seconds) => format!("locked {seconds}s"),
        None if profile.has_pin() => "pin".to_string(),
        None => "-".to_string(),
    };
    format!(
        "{}  {:<8}  {:<4}  {}",
        profile.id,
        profile.profile_type.as_str(),
        pin,
        profile.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn test_add_and_list() {
        let db = Database::in_memory().await.unwrap();
        add(&db, "Kid", false).await.unwrap();
        let parent = add(&db, "Parent", true).await.unwrap();

        let profiles = list(&db).await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, parent.id);

        rename(&db, &parent.id, "Mum").await.unwrap();
        assert_eq!(list(&db).await.unwrap()[0].name, "Mum");

        remove(&db, &parent.id).await.unwrap();
        assert_eq!(list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = Database::in_memory().await.unwrap();
        assert!(add(&db, "  ", false).await.is_err());
    }

    #[test]
    fn test_render_shows_lock() {
        let now = Utc::now();
        let mut profile = Profile::new("Kid", ProfileType::Standard);
        assert!(render(&profile, now).ends_with("-     Kid"));

        profile.pin_enabled = true;
        profile.pin_hash = Some("hash".into());
        assert!(render(&profile, now).contains("pin"));

        profile.pin_locked_until = Some(now + TimeDelta::seconds(30));
        assert!(render(&profile, now).contains("locked 30s"));
    }
}
