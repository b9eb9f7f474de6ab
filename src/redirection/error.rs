//! Errors raised while talking to the redirection service.
//!
//! These never leave the [`RedirectionClient`](super::RedirectionClient):
//! the facade logs them and degrades to pass-through.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No endpoint is configured.
    #[error("no redirection endpoint configured")]
    NoEndpoint,

    /// Endpoint address could not be understood.
    #[error("invalid endpoint '{name}': {reason}")]
    InvalidEndpoint { name: String, reason: String },

    /// Every endpoint refused or timed out while connecting.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The command did not complete in time.
    #[error("command timed out after {0} ms")]
    Timeout(u64),

    /// Encoding or decoding a command failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The service answered something unusable.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
