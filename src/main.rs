//! Binary entry point for lostboard.
//!
//! This binary provides the CLI for the lost-and-found board and the report
//! API server.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{CmdResult, ReportArgs, ThemeAction};
use lostboard::config::{BackendKind, LostboardConfig};
use lostboard::observability::{self, LoggingConfig};

/// Lostboard - a lost-and-found item board.
#[derive(Parser)]
#[command(name = "lostboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Item backend: remote or local.
    #[arg(short, long, global = true)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List all items, newest first.
    List {
        /// Write an HTML page to this path instead of printing.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Show items matching a term.
    Search {
        /// Case-insensitive substring of name, description, location or contact.
        term: String,

        /// Write an HTML page to this path instead of printing.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Report a lost or found item.
    Report {
        /// Item name.
        #[arg(short, long, default_value = "")]
        name: String,

        /// Description.
        #[arg(short, long, default_value = "")]
        description: String,

        /// Where the item was lost or found.
        #[arg(short, long, default_value = "")]
        location: String,

        /// lost or found.
        #[arg(short, long, default_value = "")]
        status: String,

        /// How to reach you.
        #[arg(long, default_value = "")]
        contact: String,

        /// Photo to attach (max 1 MiB).
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Delete an item.
    Delete {
        /// Item ID.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change the display theme.
    Theme {
        /// New theme, or toggle.
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },

    /// Run the report API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,

        /// `SQLite` database path.
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

/// Main entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(
        Some(&config.logging),
        cli.verbose,
    )) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads the config file and environment, then applies command-line flags.
fn load_config(cli: &Cli) -> lostboard::Result<LostboardConfig> {
    let config = LostboardConfig::load(cli.config.as_deref())?;
    Ok(match cli.backend {
        Some(backend) => config.with_backend(backend),
        None => config,
    })
}

/// Runs the selected command.
async fn run_command(command: Commands, config: LostboardConfig) -> CmdResult {
    match command {
        Commands::List { html } => commands::cmd_list(&config, html).await,
        Commands::Search { term, html } => commands::cmd_search(&config, &term, html).await,
        Commands::Report {
            name,
            description,
            location,
            status,
            contact,
            image,
        } => {
            let args = ReportArgs {
                name,
                description,
                location,
                status,
                contact,
                image,
            };
            commands::cmd_report(&config, args).await
        },
        Commands::Delete { id, yes } => commands::cmd_delete(&config, &id, yes).await,
        Commands::Theme { action } => commands::cmd_theme(&config, action).await,
        Commands::Serve { port, db } => commands::cmd_serve(config, port, db).await,
    }
}
