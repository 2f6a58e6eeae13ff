//! Logger error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening, writing to or closing destinations.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open destination {path}: {source}")]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to destination {destination}: {source}")]
    Write {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to flush destination {destination}: {source}")]
    Flush {
        destination: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for logger results.
pub type LoggerResult<T> = Result<T, LoggerError>;
