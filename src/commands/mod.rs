//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `board.rs`: Item commands (list, search, report, delete)
//! - `theme.rs`: Display theme preference
//! - `serve.rs`: Report API server

mod board;
mod serve;
mod theme;

use clap::ValueEnum;

pub use board::{ReportArgs, cmd_delete, cmd_list, cmd_report, cmd_search};
pub use serve::cmd_serve;
pub use theme::cmd_theme;

/// Result type shared by command handlers.
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Theme actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    /// Use the light theme.
    Light,
    /// Use the dark theme.
    Dark,
    /// Flip the current theme.
    Toggle,
}
