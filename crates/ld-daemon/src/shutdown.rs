//! Shutdown signal handling.
//!
//! SIGINT and SIGTERM cancel a `CancellationToken` that the ingest loop polls;
//! nothing else observes the signal.

use std::io;

use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{DaemonError, DaemonResult};

/// Registered SIGINT and SIGTERM streams.
///
/// Installation is a separate, fallible step so a daemon that cannot be
/// stopped cleanly never starts.
#[derive(Debug)]
pub struct SignalListener {
    interrupt: Signal,
    terminate: Signal,
}

impl SignalListener {
    /// Register SIGINT and SIGTERM with the tokio signal driver.
    pub fn install() -> DaemonResult<Self> {
        Self::install_with(signal)
    }

    /// Register both streams through `register`.
    pub fn install_with<F>(mut register: F) -> DaemonResult<Self>
    where
        F: FnMut(SignalKind) -> io::Result<Signal>,
    {
        let interrupt = register(SignalKind::interrupt()).map_err(DaemonError::Signal)?;
        let terminate = register(SignalKind::terminate()).map_err(DaemonError::Signal)?;
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    /// Wait for the first SIGINT or SIGTERM.
    pub async fn wait(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {
                tracing::info!("SIGINT received, shutting down");
            }
            _ = self.terminate.recv() => {
                tracing::info!("SIGTERM received, shutting down");
            }
        }
    }

    /// Cancel `token` on the first signal, from a background task.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.wait().await;
            token.cancel();
        })
    }
}
