//! wallboard - household wall calendar kiosk
//!
//! Runs the screen rotation loop and manages profiles, PINs and the stored
//! screen schedule.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wallboard_storage::Database;

mod commands;
mod config;

use commands::pin::PinRequest;
use config::KioskConfig;

const DEFAULT_CONFIG_PATH: &str = "wallboard.toml";

/// wallboard - household wall calendar kiosk
#[derive(Parser, Debug)]
#[command(name = "wallboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the kiosk configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the configuration
    #[arg(long, env = "WALLBOARD_DATABASE")]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the kiosk screen loop in the foreground
    Run {
        /// Stop after this many schedule evaluations
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Household profiles
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Profile PINs
    #[command(subcommand)]
    Pin(PinCommands),

    /// Stored screen schedule
    #[command(subcommand)]
    Schedule(ScheduleCommands),
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// Create a profile and print its id
    Add {
        name: String,

        /// Create an admin profile
        #[arg(long)]
        admin: bool,
    },

    /// List profiles, admins first
    #[command(alias = "ls")]
    List,

    /// Change a profile's display name
    Rename { id: String, name: String },

    /// Delete a profile and its audit trail
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum PinCommands {
    /// Check a PIN; wrong guesses count toward lockout
    Verify { profile: String, pin: String },

    /// Set or change a PIN
    Set {
        profile: String,
        pin: String,

        /// Existing PIN, required when changing
        #[arg(long)]
        current: Option<String>,
    },

    /// Remove a PIN (not allowed for admin profiles)
    Remove { profile: String, current: String },

    /// Replace a profile's PIN with an admin's credentials
    Reset {
        profile: String,

        /// Acting admin profile id
        #[arg(long)]
        admin: String,

        /// Acting admin's PIN
        #[arg(long)]
        admin_pin: String,

        new_pin: String,
    },

    /// Show lockout state and remaining attempts
    Status { profile: String },
}

#[derive(Subcommand, Debug)]
enum ScheduleCommands {
    /// Print the stored schedule and the screen it selects now
    Show,

    /// Replace the stored schedule with a JSON document
    Import { file: PathBuf },

    /// Restore the default schedule
    Reset,
}

impl From<PinCommands> for PinRequest {
    fn from(command: PinCommands) -> Self {
        match command {
            PinCommands::Verify { profile, pin } => PinRequest::Verify { profile, pin },
            PinCommands::Set {
                profile,
                pin,
                current,
            } => PinRequest::Set {
                profile,
                pin,
                current,
            },
            PinCommands::Remove { profile, current } => PinRequest::Remove { profile, current },
            PinCommands::Reset {
                profile,
                admin,
                admin_pin,
                new_pin,
            } => PinRequest::Reset {
                profile,
                admin,
                admin_pin,
                new_pin,
            },
            PinCommands::Status { profile } => PinRequest::Status { profile },
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config =
        KioskConfig::load(&config_path, cli.config.is_some())?.with_database_path(cli.database);

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let db = Database::new(config.database.clone())
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    info!(path = %config.database.path, "Database ready");

    let result = match cli.command {
        Commands::Run { ticks } => {
            let input = commands::kiosk::stdin_lines();
            commands::kiosk::run(&db, config.tick_interval(), ticks, input).await
        }
        Commands::Profile(command) => match command {
            ProfileCommands::Add { name, admin } => {
                commands::profile::add(&db, &name, admin).await.map(|_| ())
            }
            ProfileCommands::List => commands::profile::list(&db).await.map(|_| ()),
            ProfileCommands::Rename { id, name } => {
                commands::profile::rename(&db, &id, &name).await
            }
            ProfileCommands::Remove { id } => commands::profile::remove(&db, &id).await,
        },
        Commands::Pin(command) => {
            let api = commands::pin::build_api(&db, &config.guard)?;
            commands::pin::run(&api, command.into()).await
        }
        Commands::Schedule(command) => match command {
            ScheduleCommands::Show => commands::schedule::show(&db).await.map(|_| ()),
            ScheduleCommands::Import { file } => {
                commands::schedule::import(&db, &file).await.map(|_| ())
            }
            ScheduleCommands::Reset => commands::schedule::reset(&db).await,
        },
    };

    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pin_reset() {
        let cli = Cli::try_parse_from([
            "wallboard",
            "--database",
            "/tmp/w.db",
            "pin",
            "reset",
            "kid-id",
            "--admin",
            "parent-id",
            "--admin-pin",
            "9999",
            "2468",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("/tmp/w.db")));
        let Commands::Pin(command) = cli.command else {
            panic!("expected pin command");
        };
        assert_eq!(
            PinRequest::from(command),
            PinRequest::Reset {
                profile: "kid-id".into(),
                admin: "parent-id".into(),
                admin_pin: "9999".into(),
                new_pin: "2468".into(),
            }
        );
    }

    #[test]
    fn test_parse_run_with_ticks() {
        let cli = Cli::try_parse_from(["wallboard", "run", "--ticks", "10"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { ticks: Some(10) }));
    }
}
