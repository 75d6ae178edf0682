//! Foreground kiosk loop.
//!
//! Drives a [`ScheduleRunner`] from a tokio interval and prints a line each
//! time the displayed screen changes. Lines on stdin stand in for the touch
//! screen:
//!
//! - an empty line or `touch` records an interaction
//! - `reload` re-reads the schedule from the database
//! - `quit` stops the loop

use std::io::BufRead;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tracing::{info, warn};
use wallboard_schedule::{
    ScheduleConfig, ScheduleRunner, ScreenSelection, SelectionSource, format_time_remaining,
};
use wallboard_storage::{Database, ScheduleStore, SettingsStore, SqliteSettingsStore};

/// Operator input read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskInput {
    Touch,
    Reload,
    Quit,
    Unknown,
}

impl KioskInput {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "touch" | "t" => KioskInput::Touch,
            "reload" | "r" => KioskInput::Reload,
            "quit" | "q" | "exit" => KioskInput::Quit,
            _ => KioskInput::Unknown,
        }
    }
}

/// Forward stdin lines from a plain thread.
///
/// Blocking reads on the runtime's pool would hold up shutdown.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Load the schedule, falling back to the built-in default when the store
/// cannot be read.
pub async fn load_schedule<S: SettingsStore>(store: &ScheduleStore<S>) -> ScheduleConfig {
    match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load screen schedule, using defaults: {}", e);
            ScheduleConfig::default_config()
        }
    }
}

/// One-line description of why a screen is on display.
pub fn describe(selection: &ScreenSelection) -> String {
    let screen = selection.screen.as_deref().unwrap_or("(none)");
    match &selection.source {
        SelectionSource::Override {
            id,
            remaining_seconds,
        } => format!(
            "{screen} [override {id}, {} left]",
            format_time_remaining(*remaining_seconds)
        ),
        SelectionSource::Paused {
            remaining_seconds, ..
        } => format!(
            "{screen} [paused, resumes in {}]",
            format_time_remaining(*remaining_seconds)
        ),
        SelectionSource::Rotation {
            sequence_id,
            index,
            next_change_in_seconds,
        } => format!(
            "{screen} [{sequence_id} #{}, next in {}]",
            index + 1,
            format_time_remaining(*next_change_in_seconds)
        ),
        SelectionSource::Idle => "idle [no rotatable sequence]".to_string(),
    }
}

/// Run until `quit`, Ctrl-C, or `max_ticks` evaluations.
pub async fn run(
    db: &Database,
    tick: Duration,
    max_ticks: Option<u64>,
    mut input: mpsc::Receiver<String>,
) -> Result<()> {
    let store = ScheduleStore::new(SqliteSettingsStore::new(db.pool().clone()));
    let mut runner = ScheduleRunner::new(load_schedule(&store).await, now());

    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut input_open = true;
    let mut last_screen: Option<String> = None;
    let mut ticks = 0u64;

    info!(
        version = wallboard_core::VERSION,
        tick_ms = tick.as_millis() as u64,
        "Kiosk started"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let at = now();
                let selection = runner.tick(at);
                if selection.screen != last_screen {
                    println!("{} {}", at.format("%H:%M:%S"), describe(&selection));
                    last_screen = selection.screen.clone();
                }

                ticks += 1;
                if max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
            }
            line = input.recv(), if input_open => match line {
                Some(line) => match KioskInput::parse(&line) {
                    KioskInput::Touch => runner.record_interaction(now()),
                    KioskInput::Reload => {
                        let config = load_schedule(&store).await;
                        runner.replace_config(config, now());
                        info!("Screen schedule reloaded");
                    }
                    KioskInput::Quit => break,
                    KioskInput::Unknown => warn!("Unknown kiosk input: {}", line.trim()),
                },
                None => input_open = false,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    info!(ticks, changes = runner.history().len(), "Kiosk stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wallboard_storage::MemorySettingsStore;

    #[rstest]
    #[case("", KioskInput::Touch)]
    #[case("touch", KioskInput::Touch)]
    #[case("  T  ", KioskInput::Touch)]
    #[case("reload", KioskInput::Reload)]
    #[case("Quit", KioskInput::Quit)]
    #[case("exit", KioskInput::Quit)]
    #[case("dance", KioskInput::Unknown)]
    fn test_parse_input(#[case] line: &str, #[case] expected: KioskInput) {
        assert_eq!(KioskInput::parse(line), expected);
    }

    #[rstest]
    #[case(
        SelectionSource::Override { id: "bed".into(), remaining_seconds: 90 },
        "chores [override bed, 1m 30s left]"
    )]
    #[case(
        SelectionSource::Paused { sequence_id: "seq".into(), remaining_seconds: 45 },
        "chores [paused, resumes in 45s]"
    )]
    #[case(
        SelectionSource::Rotation { sequence_id: "Default".into(), index: 1, next_change_in_seconds: 60 },
        "chores [Default #2, next in 1m 0s]"
    )]
    fn test_describe(#[case] source: SelectionSource, #[case] expected: &str) {
        let selection = ScreenSelection {
            screen: Some("chores".into()),
            source,
        };
        assert_eq!(describe(&selection), expected);
    }

    #[test]
    fn test_describe_idle() {
        let selection = ScreenSelection {
            screen: None,
            source: SelectionSource::Idle,
        };
        assert!(describe(&selection).starts_with("idle"));
    }

    #[tokio::test]
    async fn test_load_schedule_falls_back_on_corrupt_document() {
        let settings = MemorySettingsStore::new();
        settings
            .set(wallboard_core::constants::SCHEDULE_SETTINGS_KEY, "{oops")
            .await
            .unwrap();

        let config = load_schedule(&ScheduleStore::new(settings)).await;
        assert_eq!(config.sequences.len(), 1);
        assert_eq!(config.sequences[0].screens, ["calendar", "tasks"]);
    }

    #[tokio::test]
    async fn test_run_stops_after_max_ticks() {
        let db = Database::in_memory().await.unwrap();
        let (_tx, rx) = mpsc::channel(1);
        run(&db, Duration::from_millis(5), Some(3), rx).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_on_quit() {
        let db = Database::in_memory().await.unwrap();
        let (tx, rx) = mpsc::channel(4);
        for line in ["touch", "reload", "quit"] {
            tx.send(line.to_string()).await.unwrap();
        }

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run(&db, Duration::from_millis(10), None, rx),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_closed_input_keeps_ticking() {
        let db = Database::in_memory().await.unwrap();
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        run(&db, Duration::from_millis(5), Some(2), rx).await.unwrap();
    }
}
