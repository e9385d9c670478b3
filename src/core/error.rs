use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("the file '{}' was not found", path.display())]
    InputNotFound { path: PathBuf },
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {message}")]
    Config { message: String },
    #[error("invalid bucket thresholds: {message}")]
    InvalidPolicy { message: String },
    #[error("alert transport failed: {message}")]
    Transport { message: String },
    #[error("failed to write report to '{}': {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reason a single log line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected 4 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid job id '{0}'")]
    InvalidJobId(String),
    #[error("invalid timestamp '{0}' (expected HH:MM:SS)")]
    InvalidTimestamp(String),
    #[error("unrecognized action '{0}'")]
    UnrecognizedAction(String),
}
