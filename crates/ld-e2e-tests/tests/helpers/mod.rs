//! Shared harness for daemon end-to-end tests.
//!
//! Gives every test its own temp directory holding the socket and the output
//! files, and a plain std datagram client playing the role of `logger(1)`.

#![allow(dead_code)]

use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

/// Upper bound for any wait in these tests.
pub const WAIT_LIMIT: Duration = Duration::from_secs(5);

pub struct Harness {
    dir: TempDir,
    pub socket_path: PathBuf,
    pub outputs: Vec<PathBuf>,
}

impl Harness {
    /// A harness with `outputs` destination files (not yet created).
    pub fn new(outputs: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("log.sock");
        let outputs = (0..outputs)
            .map(|i| dir.path().join(format!("out-{i}.log")))
            .collect();
        Self {
            dir,
            socket_path,
            outputs,
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Send one datagram to the daemon socket.
    pub fn send(&self, datagram: &[u8]) {
        let client = UnixDatagram::unbound().unwrap();
        let sent = client.send_to(datagram, &self.socket_path).unwrap();
        assert_eq!(sent, datagram.len());
    }

    /// Contents of output file `index`, empty if it does not exist yet.
    pub fn output(&self, index: usize) -> Vec<u8> {
        std::fs::read(&self.outputs[index]).unwrap_or_default()
    }
}

/// Poll `condition` every few milliseconds until it holds.
///
/// Panics after `WAIT_LIMIT`.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
