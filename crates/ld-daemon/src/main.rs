//! ld-daemon — local log collection daemon.
//!
//! Receives syslog datagrams on a unix socket, appends every raw message to
//! the configured files and stdout, and on SIGINT/SIGTERM reports how many
//! messages were stored and which payload was the most frequent.

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ld_daemon::cli::Cli;
use ld_daemon::shutdown::SignalListener;
use ld_daemon::{DaemonConfig, LogFormat, runner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DaemonConfig::resolve(&cli, |key| std::env::var(key).ok())
        .context("failed to load configuration")?;

    init_tracing(config.log_format);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        socket = %config.socket_path.display(),
        "ld-daemon starting"
    );

    let signals = SignalListener::install().context("failed to install signal handlers")?;
    let token = CancellationToken::new();
    let signals = signals.spawn(token.clone());

    let summary = runner::run(&config, token)
        .await
        .context("log daemon failed")?;
    signals.abort();

    eprintln!("{summary}");
    if config.summary_json {
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

/// Diagnostics go to stderr; stdout carries the relayed messages.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
