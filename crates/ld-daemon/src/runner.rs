//! Daemon lifecycle: open destinations, bind, ingest, tear down.

use ld_logger::{Logger, Summary};
use tokio_util::sync::CancellationToken;

use crate::config::DaemonConfig;
use crate::error::DaemonResult;
use crate::ingest;
use crate::socket::BoundSocket;

/// Run the daemon until `token` is cancelled and return the final summary.
///
/// Destinations are opened before the socket is bound, so a bad output path
/// fails fast without leaving a socket file behind.
pub async fn run(config: &DaemonConfig, token: CancellationToken) -> DaemonResult<Summary> {
    let mut logger = Logger::open(config.destinations.as_slice())?;
    tracing::info!(
        count = logger.destination_count(),
        destinations = ?logger.destination_labels().collect::<Vec<_>>(),
        "output destinations opened"
    );

    let socket = BoundSocket::bind(&config.socket_path, config.remove_stale_socket)?;
    tracing::info!(socket = %socket.path().display(), "listening for log messages");

    let stats = ingest::run(&socket, &mut logger, &token, config.max_datagram_bytes).await;
    drop(socket);

    let summary = logger.teardown();
    tracing::info!(
        received = stats.received,
        receive_errors = stats.receive_errors,
        stored = summary.count,
        most_common = summary.most_common.as_deref().unwrap_or_default(),
        occurrences = summary.occurrences,
        "log daemon stopped"
    );
    Ok(summary)
}
