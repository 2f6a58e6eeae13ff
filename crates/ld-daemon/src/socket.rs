//! Bound unix datagram socket that unlinks its path on drop.

use std::io::ErrorKind;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::net::UnixDatagram;

use crate::error::{DaemonError, DaemonResult};
use crate::ingest::DatagramSource;

/// The daemon's receive socket.
#[derive(Debug)]
pub struct BoundSocket {
    socket: UnixDatagram,
    path: PathBuf,
}

impl BoundSocket {
    /// Bind at `path`. Must be called from within a tokio runtime.
    ///
    /// With `remove_stale`, a leftover socket file at `path` is removed first;
    /// a non-socket file is never removed.
    pub fn bind(path: &Path, remove_stale: bool) -> DaemonResult<Self> {
        let bind_error = |source: std::io::Error| DaemonError::Bind {
            path: path.to_path_buf(),
            source,
        };

        if remove_stale {
            match std::fs::symlink_metadata(path) {
                Ok(meta) if meta.file_type().is_socket() => {
                    std::fs::remove_file(path).map_err(bind_error)?;
                    tracing::info!(path = %path.display(), "removed stale socket");
                }
                Ok(_) => {
                    return Err(bind_error(std::io::Error::new(
                        ErrorKind::AlreadyExists,
                        "path exists and is not a socket",
                    )));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(bind_error(e)),
            }
        }

        let socket = UnixDatagram::bind(path).map_err(bind_error)?;
        Ok(Self {
            socket,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DatagramSource for BoundSocket {
    async fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.socket.recv(buf).await
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to unlink log socket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_receive_and_unlink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.sock");
        let bound = BoundSocket::bind(&path, false).unwrap();
        assert!(path.exists());

        let client = std::os::unix::net::UnixDatagram::unbound().unwrap();
        client.send_to(b"app: ping", &path).unwrap();
        let mut buf = [0u8; 64];
        let len = DatagramSource::recv(&bound, &mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"app: ping");

        drop(bound);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn existing_socket_fails_without_remove_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.sock");
        let stale = std::os::unix::net::UnixDatagram::bind(&path).unwrap();
        drop(stale);

        let err = BoundSocket::bind(&path, false).unwrap_err();
        assert!(matches!(err, DaemonError::Bind { .. }));

        let bound = BoundSocket::bind(&path, true).unwrap();
        assert_eq!(bound.path(), path.as_path());
    }

    #[tokio::test]
    async fn regular_file_is_never_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-socket");
        std::fs::write(&path, b"keep me").unwrap();

        assert!(BoundSocket::bind(&path, true).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }
}
