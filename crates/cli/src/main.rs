//! plancraft CLI: the main entry point.
//!
//! Commands:
//! - `convert` : Grouped ⇄ per-room conversion
//! - `repair`  : Reachability repair of a grouped set
//! - `diff`    : Structural diff between two grouped sets
//! - `describe`: Room table and overview
//! - `session` : Create, inspect, and advance design sessions
//! - `onboard` : Write the default config
//! - `status`  : Show configuration and sessions

use clap::{Parser, Subcommand};
use plancraft_config::{AppConfig, LoggingConfig};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "plancraft",
    about = "plancraft: architectural layout constraint pipeline",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between grouped and per-room constraint forms (input form is detected)
    Convert {
        /// Grouped or per-room constraint JSON
        file: PathBuf,

        /// Grouped set to recover weights and special spaces from (per-room input only)
        #[arg(long)]
        original: Option<PathBuf>,
    },

    /// Make every room reachable from the entrance
    Repair {
        /// Grouped constraint JSON
        file: PathBuf,

        /// Write the repaired set here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two grouped constraint sets
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Print entries as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a room table and overview of a grouped set
    Describe { file: PathBuf },

    /// Manage design sessions
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Initialize configuration and session storage
    Onboard,

    /// Show configuration and stored sessions
    Status,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a new session
    New,

    /// Show a session's stage, key questions, and constraints
    Show { id: String },

    /// Feed generator output into a session's constraint set
    Ingest {
        id: String,
        /// File holding the generator output (free text with an embedded JSON object)
        payload: PathBuf,
    },

    /// Advance a session to its next stage
    Advance { id: String },

    /// Print the stage a session would resume into
    Resume { id: String },

    /// Mark a key-question category as known
    Know { id: String, category: String },
}

fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let default = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    init_tracing(cli.verbose, &config.logging);

    match cli.command {
        Commands::Convert { file, original } => {
            commands::convert::run(&config, &file, original.as_deref())?
        }
        Commands::Repair { file, output } => {
            commands::repair::run(&config, &file, output.as_deref())?
        }
        Commands::Diff { old, new, json } => commands::diff::run(&old, &new, json)?,
        Commands::Describe { file } => commands::describe::run(&file)?,
        Commands::Session { command } => commands::session::run(&config, command).await?,
        Commands::Onboard => commands::onboard::run(&config)?,
        Commands::Status => commands::status::run(&config).await?,
    }

    Ok(())
}
