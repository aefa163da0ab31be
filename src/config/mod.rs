//! Configuration management.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::models::MAX_IMAGE_BYTES;
use crate::{Error, Result};

/// Default report API root.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";

/// Default port for `lostboard serve`.
pub const DEFAULT_PORT: u16 = 5000;

/// Which item backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// The report HTTP API.
    Remote,
    /// The local key-value file.
    #[default]
    Local,
}

impl BackendKind {
    /// Returns the backend name as used in config and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "api" | "http" => Ok(Self::Remote),
            "local" | "file" => Ok(Self::Local),
            other => Err(Error::InvalidInput(format!(
                "unknown backend '{other}' (expected 'remote' or 'local')"
            ))),
        }
    }
}

/// Settings for `lostboard serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// `SQLite` database path. Defaults to `reports.db` in the data directory.
    pub db_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            db_path: None,
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive, e.g. `lostboard=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Main configuration for lostboard.
#[derive(Debug, Clone)]
pub struct LostboardConfig {
    /// Item backend.
    pub backend: BackendKind,
    /// Report API root used by the remote backend.
    pub api_base: String,
    /// Request timeout for the remote backend.
    pub request_timeout: Duration,
    /// Directory holding the key-value file and the server database.
    pub data_dir: PathBuf,
    /// Largest accepted photo in bytes.
    pub max_image_bytes: u64,
    /// Server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Backend name.
    pub backend: Option<String>,
    /// Report API root.
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Data directory.
    pub data_dir: Option<String>,
    /// Largest accepted photo in bytes.
    pub max_image_bytes: Option<u64>,
    /// Server section.
    pub server: Option<ConfigFileServer>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileServer {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Database path.
    pub db_path: Option<String>,
}

impl Default for LostboardConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(30),
            data_dir: PathBuf::from(".lostboard"),
            max_image_bytes: MAX_IMAGE_BYTES,
            server: ServerConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl LostboardConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Looks for `lostboard/config.toml` in the platform config dir. The
    /// data directory defaults to `lostboard/` in the platform data dir.
    /// Returns defaults if no config file is found or it cannot be used.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let default_data_dir = base_dirs.data_local_dir().join("lostboard");
        let config_path = base_dirs.config_dir().join("lostboard").join("config.toml");
        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) if config.data_dir == Self::default().data_dir => {
                    return config.with_data_dir(default_data_dir);
                },
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), error = %e, "Ignoring config file");
                },
            }
        }

        Self::default().with_data_dir(default_data_dir)
    }

    /// Loads from `path` when given, else from the default location, then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file cannot be read or parsed,
    /// or an override has an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `LOSTBOARD_*` overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown backend name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = lookup("LOSTBOARD_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(api_base) = lookup("LOSTBOARD_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(data_dir) = lookup("LOSTBOARD_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(db_path) = lookup("LOSTBOARD_DB_PATH") {
            self.server.db_path = Some(PathBuf::from(db_path));
        }
        Ok(self)
    }

    /// Converts a `ConfigFile` to `LostboardConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(backend) = file.backend {
            config.backend = backend.parse()?;
        }
        if let Some(api_base) = file.api_base {
            config.api_base = api_base;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(max) = file.max_image_bytes {
            config.max_image_bytes = max;
        }
        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            config.server.db_path = server.db_path.map(PathBuf::from);
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        Ok(config)
    }

    /// Sets the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the report API root.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Returns the server database path.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.server
            .db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("reports.db"))
    }
}
