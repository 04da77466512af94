//! Tracker diagnostics and the optional `env_logger` setup helper.
//!
//! A tracker filters its own messages by the configured [`LogLevel`] before
//! they reach a [`DiagnosticSink`]. The default sink forwards to the `log`
//! facade, so whatever logger the host installs decides the final output.

use crate::config::LogLevel;
use crate::error::CoreError;
use log::Level;
use std::sync::{Arc, Mutex, PoisonError};

/// Log target used for every tracker diagnostic.
pub const LOG_TARGET: &str = "nyla";

/// Destination for diagnostics that passed the tracker's level filter.
pub trait DiagnosticSink: Send + Sync {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
}

/// Forwards diagnostics to the `log` facade under the `nyla` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn error(&self, message: &str) {
        log::error!(target: LOG_TARGET, "{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{}", message);
    }

    fn info(&self, message: &str) {
        log::info!(target: LOG_TARGET, "{}", message);
    }
}

/// Which sink a recorded message was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChannel {
    Error,
    Warn,
    Info,
}

/// Keeps every routed message in memory. Intended for tests and hosts that
/// want to surface tracker diagnostics themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(SinkChannel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(SinkChannel, String)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages routed to `channel`, in emission order.
    pub fn messages(&self, channel: SinkChannel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, channel: SinkChannel, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, message.to_string()));
    }
}

impl DiagnosticSink for MemorySink {
    fn error(&self, message: &str) {
        self.push(SinkChannel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.push(SinkChannel::Warn, message);
    }

    fn info(&self, message: &str) {
        self.push(SinkChannel::Info, message);
    }
}

/// Level-filtered front end to a [`DiagnosticSink`].
#[derive(Clone)]
pub struct Logger {
    level: LogLevel,
    sink: Arc<dyn DiagnosticSink>,
}

impl Logger {
    pub fn new(level: LogLevel, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { level, sink }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether a message at `level` passes the configured verbosity.
    ///
    /// `error` shares the rank of `warn`; `trace` shares the rank of `debug`.
    pub fn enabled(&self, level: Level) -> bool {
        if self.level == LogLevel::None {
            return false;
        }
        let message_rank = match level {
            Level::Error | Level::Warn => 1,
            Level::Info => 2,
            Level::Debug | Level::Trace => 3,
        };
        self.level.rank() >= message_rank
    }

    pub fn log(&self, level: Level, message: &str) {
        if !self.enabled(level) {
            return;
        }
        match level {
            Level::Error => self.sink.error(message),
            Level::Warn => self.sink.warn(message),
            _ => self.sink.info(message),
        }
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Builds the message lazily, since debug payloads include whole events.
    pub fn debug(&self, message: impl FnOnce() -> String) {
        if self.enabled(Level::Debug) {
            self.log(Level::Debug, &message());
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").field("level", &self.level).finish()
    }
}

#[cfg(feature = "env_logger")]
pub fn setup_logging(filter: &str) -> Result<(), CoreError> {
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::from_env(Env::default().default_filter_or(filter))
        .filter_module("reqwest", LevelFilter::Warn) // Reduce verbosity from deps
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("rustls", LevelFilter::Warn)
        .try_init()
        .map_err(|e| CoreError::LoggingSetup(e.to_string()))
}

#[cfg(not(feature = "env_logger"))]
pub fn setup_logging(_filter: &str) -> Result<(), CoreError> {
    // The host installs its own `log` backend in this build.
    log::debug!("Built without env_logger; leaving logger installation to the host");
    Ok(())
}
