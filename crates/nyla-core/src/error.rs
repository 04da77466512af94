use thiserror::Error;

/// Errors originating from the core crate: configuration loading and
/// logger installation.
///
/// Tracker commands never surface these. They only appear when the host
/// application loads settings or installs a logger.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    #[error("Logging setup failed: {0}")]
    LoggingSetup(String),
}
