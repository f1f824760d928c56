//! Error types for decoding, transports, exchanges and configuration.

use std::path::PathBuf;

use crate::query::QueryId;

/// A response could not be turned into typed fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Frame(#[from] printer_z_query::Error),

    #[error("invalid value {value:?} for key {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{key} declares {declared} entries but the response carries {actual}")]
    CountMismatch {
        key: &'static str,
        declared: usize,
        actual: usize,
    },
}

impl ParseError {
    pub(crate) fn invalid_value(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,

    #[error("unexpected request {0:?}")]
    UnexpectedRequest(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no {query} response after {attempts} attempt(s)")]
    Timeout { query: QueryId, attempts: u32 },
}

impl From<printer_z_query::Error> for QueryError {
    fn from(e: printer_z_query::Error) -> Self {
        Self::Parse(ParseError::Frame(e))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {reason}", .path.display())]
    File { path: PathBuf, reason: String },

    #[error("invalid config override {0:?}: expected 'key=value'")]
    OverrideFormat(String),

    #[error("invalid config override value for '{key}': {reason}")]
    OverrideValue { key: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
