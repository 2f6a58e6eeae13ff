//! Daemon configuration, loadable from TOML, environment and arguments.
//!
//! Precedence, lowest first: defaults, config file, environment
//! (`LOGD_SOCKET`, `LOGD_LOG_FORMAT`), command line.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{DaemonError, DaemonResult};

/// Environment variable overriding `socket_path`.
pub const SOCKET_ENV: &str = "LOGD_SOCKET";
/// Environment variable overriding `log_format`.
pub const LOG_FORMAT_ENV: &str = "LOGD_LOG_FORMAT";

/// Output format of the daemon's own diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = DaemonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(DaemonError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Unix datagram socket local clients send to.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    /// Files every raw message is appended to.
    #[serde(default)]
    pub destinations: Vec<PathBuf>,
    /// Receive buffer size; longer datagrams are truncated.
    #[serde(default = "default_max_datagram_bytes")]
    pub max_datagram_bytes: usize,
    /// Remove a leftover socket file at `socket_path` before binding.
    #[serde(default)]
    pub remove_stale_socket: bool,
    /// Diagnostic output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Also print the shutdown summary as one JSON line on stdout.
    #[serde(default)]
    pub summary_json: bool,
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/dev/log")
}

fn default_max_datagram_bytes() -> usize {
    1024
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            destinations: vec![],
            max_datagram_bytes: default_max_datagram_bytes(),
            remove_stale_socket: false,
            log_format: LogFormat::default(),
            summary_json: false,
        }
    }
}

impl DaemonConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &Path) -> DaemonResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> DaemonResult<()> {
        if let Some(socket) = lookup(SOCKET_ENV).filter(|v| !v.is_empty()) {
            self.socket_path = PathBuf::from(socket);
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).filter(|v| !v.is_empty()) {
            self.log_format = format.parse()?;
        }
        Ok(())
    }

    /// Build the effective configuration from arguments and environment.
    pub fn resolve(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> DaemonResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        if let Some(socket) = &cli.socket {
            config.socket_path = socket.clone();
        }
        config.destinations.extend(cli.destinations.iter().cloned());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DaemonResult<()> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(DaemonError::Config("socket_path must not be empty".into()));
        }
        if self.max_datagram_bytes == 0 {
            return Err(DaemonError::Config(
                "max_datagram_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
