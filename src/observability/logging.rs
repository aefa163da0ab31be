//! Logging configuration.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "LOSTBOARD_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Anything other than `json` is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the logging config from settings and the environment.
    ///
    /// The filter comes from `LOSTBOARD_LOG`, then `RUST_LOG`, then the
    /// settings, then `warn` (`debug` when `verbose`). An unparseable
    /// directive falls back to the default level.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let directive = std::env::var(LOG_ENV)
            .ok()
            .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
            .filter(|v| !v.trim().is_empty())
            .or_else(|| settings.and_then(|s| s.filter.clone()));

        Self {
            format: settings
                .and_then(|s| s.format.as_deref())
                .map(LogFormat::parse)
                .unwrap_or_default(),
            filter: build_filter(directive.as_deref(), verbose),
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

/// Builds a filter from an optional directive.
fn build_filter(directive: Option<&str>, verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}
