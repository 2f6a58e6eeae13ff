//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Receives local syslog datagrams, appends them to output files and reports
/// the most frequent message on shutdown.
#[derive(Debug, Default, Parser)]
#[command(name = "ld-daemon", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Datagram socket to bind (overrides the config file and LOGD_SOCKET).
    #[arg(short, long, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Output files every raw message is appended to.
    #[arg(value_name = "OUTPUT")]
    pub destinations: Vec<PathBuf>,
}
