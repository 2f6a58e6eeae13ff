//! Scripted datagram source for testing the ingest loop without a socket.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::ingest::DatagramSource;

/// Replays queued datagrams and errors, then cancels `token` and blocks
/// until the loop notices.
pub struct MockDatagramSource {
    queue: Mutex<VecDeque<io::Result<Vec<u8>>>>,
    token: CancellationToken,
}

impl MockDatagramSource {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            token,
        }
    }

    pub fn with_datagram(self, datagram: &[u8]) -> Self {
        self.queue.lock().unwrap().push_back(Ok(datagram.to_vec()));
        self
    }

    pub fn with_error(self, kind: io::ErrorKind) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(io::Error::from(kind)));
        self
    }

    /// Queued entries not yet received.
    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[async_trait]
impl DatagramSource for MockDatagramSource {
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(Ok(datagram)) => {
                // same truncation as a real datagram socket
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(len)
            }
            Some(Err(e)) => Err(e),
            None => {
                self.token.cancel();
                std::future::pending().await
            }
        }
    }
}
