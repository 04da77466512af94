//! Errors of tracker construction and command parsing.
//!
//! Dispatching a command never fails; these only surface while building a
//! tracker, or are logged and replaced by a fallback command.

use crate::command::Command;
use nyla_core::CoreError;
use nyla_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("No page context supplied to the tracker builder")]
    MissingPageContext,

    #[error("A tracker must be built inside a tokio runtime")]
    NoRuntime,
}

/// A recognized command whose argument could not be decoded.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Malformed init configuration: {0}")]
    MalformedConfig(#[source] serde_json::Error),

    #[error("Malformed pageview overrides: expected an object, got {0}")]
    MalformedOverrides(String),
}

impl CommandError {
    /// The command to run instead: `init` with an empty configuration, or a
    /// plain `pageview`.
    pub fn fallback(&self) -> Command {
        match self {
            CommandError::MalformedConfig(_) => Command::Init(Default::default()),
            CommandError::MalformedOverrides(_) => Command::Pageview(None),
        }
    }
}
