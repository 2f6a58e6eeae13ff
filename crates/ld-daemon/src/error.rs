//! Daemon error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the daemon from starting or running.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to bind log socket {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error(transparent)]
    Logger(#[from] ld_logger::LoggerError),
}

impl From<toml::de::Error> for DaemonError {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}

/// Convenience alias for daemon results.
pub type DaemonResult<T> = Result<T, DaemonError>;
