use crate::error::CoreError;
use config::{Config as ConfigLoader, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Collection service used when no endpoint override is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.getnyla.app";

/// Path appended to the endpoint for every beacon.
pub const COLLECT_PATH: &str = "/v1/collect";

/// Diagnostic verbosity of a tracker.
///
/// Ordered by rank: `none=0`, `warn=1`, `info=2`, `debug=3`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")] // Allows config values "none", "warn", "info", "debug"
pub enum LogLevel {
    None,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn rank(self) -> u8 {
        match self {
            LogLevel::None => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::None => "none",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// The configuration a tracker is initialized with.
///
/// Accepts both `log_level` and the `logLevel` spelling used by page
/// snippets, so the same JSON can be handed to `init` unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TrackerConfig {
    pub site: String,
    pub endpoint: Option<String>,
    #[serde(alias = "logLevel")]
    pub log_level: LogLevel,
}

impl TrackerConfig {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Site identifier, or `None` when it is unset or empty.
    pub fn site_id(&self) -> Option<&str> {
        Some(self.site.as_str()).filter(|site| !site.is_empty())
    }

    /// Endpoint override, falling back to [`DEFAULT_ENDPOINT`] when absent or empty.
    ///
    /// Returned as configured; a trailing `/` is trimmed only when the
    /// `/v1/collect` path is appended to build a beacon URL.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
    }
}

// Host-side logging settings, independent of the tracker's own verbosity
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter directive, e.g. `info` or `nyla=debug`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

// Main configuration structure
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub tracker: TrackerConfig,
    pub logging: LoggingConfig,
}

/// Loads settings from defaults, an optional file and environment variables.
///
/// Without an explicit path, looks for `nyla.toml` (or `.json`) in the
/// current directory. An explicit path must exist. Environment variables
/// prefixed with `NYLA_` override both (e.g. `NYLA_TRACKER__SITE=abc123`,
/// `NYLA_TRACKER__LOG_LEVEL=debug`); note the double underscore for nesting.
pub fn load_config(source_path: Option<&Path>) -> Result<Settings, CoreError> {
    let mut builder = ConfigLoader::builder()
        .set_default("tracker.log_level", LogLevel::default().to_string())?
        .set_default("logging.filter", LoggingConfig::default().filter)?;

    match source_path {
        Some(path) => {
            if !path.exists() {
                log::warn!("Specified configuration file not found: {:?}", path);
                return Err(CoreError::ConfigNotFound(path.display().to_string()));
            }
            log::debug!("Loading configuration from: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }
        None => {
            log::debug!("Attempting to load configuration from default location (nyla.toml)");
            builder = builder.add_source(File::with_name("nyla").required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("NYLA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    log::debug!("Successfully loaded configuration: {:?}", settings);
    Ok(settings)
}
