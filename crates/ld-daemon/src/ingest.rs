//! Ingest loop — pulls datagrams off the socket and pushes them into the logger.
//!
//! The cancellation token is checked between receives. It may abort a pending
//! receive but never a `Logger::push` in progress.

use std::io::ErrorKind;

use async_trait::async_trait;
use ld_logger::Logger;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Anything that yields one datagram per `recv` call.
///
/// Implemented by `BoundSocket` and by `MockDatagramSource` in tests.
#[async_trait]
pub trait DatagramSource: Send + Sync {
    /// Receive one datagram into `buf`, returning its length.
    async fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize>;
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Non-empty datagrams handed to the logger.
    pub received: usize,
    /// Zero-length datagrams skipped.
    pub empty: usize,
    /// Receive errors other than interruptions.
    pub receive_errors: usize,
}

/// Run until `token` is cancelled.
pub async fn run<S>(
    source: &S,
    logger: &mut Logger,
    token: &CancellationToken,
    max_datagram_bytes: usize,
) -> IngestStats
where
    S: DatagramSource + ?Sized,
{
    let mut buf = vec![0u8; max_datagram_bytes];
    let mut stats = IngestStats::default();

    while !token.is_cancelled() {
        let received = tokio::select! {
            biased;
            () = token.cancelled() => break,
            result = source.recv(&mut buf) => result,
        };

        match received {
            Ok(0) => {
                stats.empty += 1;
                tracing::trace!("skipping empty datagram");
            }
            Ok(len) => {
                stats.received += 1;
                tracing::debug!(bytes = len, "log message received");
                logger.push(&buf[..len]);
            }
            // A signal landed while blocked in recv: no data, try again.
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                stats.receive_errors += 1;
                tracing::error!(error = %e, "failed to receive log datagram");
            }
        }
    }

    tracing::debug!(
        received = stats.received,
        empty = stats.empty,
        receive_errors = stats.receive_errors,
        "ingest loop stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDatagramSource;
    use ld_logger::{Destination, MockSink};
    use std::io;
    use tracing_test::traced_test;

    fn logger_with(primary: &MockSink) -> Logger {
        Logger::with_destinations(vec![], Destination::new("primary", primary.clone()))
    }

    #[tokio::test]
    async fn pushes_every_datagram_until_cancelled() {
        let token = CancellationToken::new();
        let source = MockDatagramSource::new(token.clone())
            .with_datagram(b"<13>May 16 16:19:06 root: hello\n")
            .with_datagram(b"<13>May 16 16:19:07 root: hello\n")
            .with_datagram(b"<13>May 16 16:19:08 root: bye\n");
        let primary = MockSink::new();
        let mut logger = logger_with(&primary);

        let stats = run(&source, &mut logger, &token, 1024).await;

        assert_eq!(stats.received, 3);
        assert_eq!(logger.count(), 3);
        assert_eq!(logger.most_common(), Some(&b"hello\n"[..]));
        assert!(primary.written().starts_with(b"<13>May 16 16:19:06 root: hello\n"));
    }

    #[tokio::test]
    async fn empty_datagrams_are_skipped() {
        let token = CancellationToken::new();
        let source = MockDatagramSource::new(token.clone())
            .with_datagram(b"")
            .with_datagram(b"app: x");
        let mut logger = logger_with(&MockSink::new());

        let stats = run(&source, &mut logger, &token, 64).await;

        assert_eq!(stats.empty, 1);
        assert_eq!(stats.received, 1);
        assert_eq!(logger.count(), 1);
    }

    #[tokio::test]
    async fn interrupted_receive_is_retried_silently() {
        let token = CancellationToken::new();
        let source = MockDatagramSource::new(token.clone())
            .with_error(io::ErrorKind::Interrupted)
            .with_datagram(b"app: after signal");
        let mut logger = logger_with(&MockSink::new());

        let stats = run(&source, &mut logger, &token, 64).await;

        assert_eq!(stats.receive_errors, 0);
        assert_eq!(logger.payloads().next(), Some(&b"after signal"[..]));
    }

    #[tokio::test]
    #[traced_test]
    async fn other_receive_errors_are_reported_and_loop_continues() {
        let token = CancellationToken::new();
        let source = MockDatagramSource::new(token.clone())
            .with_error(io::ErrorKind::ConnectionReset)
            .with_datagram(b"app: still running");
        let mut logger = logger_with(&MockSink::new());

        let stats = run(&source, &mut logger, &token, 64).await;

        assert_eq!(stats.receive_errors, 1);
        assert_eq!(logger.count(), 1);
        assert!(logs_contain("failed to receive log datagram"));
    }

    #[tokio::test]
    async fn oversized_datagrams_are_truncated_to_buffer() {
        let token = CancellationToken::new();
        let source = MockDatagramSource::new(token.clone()).with_datagram(b"app: 0123456789");
        let mut logger = logger_with(&MockSink::new());

        run(&source, &mut logger, &token, 8).await;

        assert_eq!(logger.payloads().next(), Some(&b"012"[..]));
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_receiving() {
        let token = CancellationToken::new();
        token.cancel();
        let source = MockDatagramSource::new(token.clone()).with_datagram(b"app: never");
        let mut logger = logger_with(&MockSink::new());

        let stats = run(&source, &mut logger, &token, 64).await;

        assert_eq!(stats, IngestStats::default());
        assert_eq!(source.remaining(), 1);
    }
}
