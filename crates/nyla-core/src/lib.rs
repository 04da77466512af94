//! # Nyla Core
//!
//! Configuration, diagnostics and error types shared by every Nyla crate.

pub mod config;
pub mod error;
pub mod logging;

pub use crate::config::{
    COLLECT_PATH, DEFAULT_ENDPOINT, LogLevel, LoggingConfig, Settings, TrackerConfig, load_config,
};
pub use crate::error::CoreError;
pub use crate::logging::{DiagnosticSink, LogSink, Logger, MemorySink, SinkChannel, setup_logging};
