//! Fan-out of raw log messages to every configured destination.
//!
//! A failing destination only loses the current message: the error is logged
//! and the remaining destinations (and the primary output) are still written.

use std::fs::OpenOptions;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use crate::error::{LoggerError, LoggerResult};

/// Permission bits for newly created destination files.
#[cfg(unix)]
const DESTINATION_MODE: u32 = 0o644;

/// A labelled write handle, typically an append-mode file or stdout.
pub struct Destination {
    label: String,
    writer: Box<dyn Write + Send>,
}

impl Destination {
    pub fn new(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            label: label.into(),
            writer: Box::new(writer),
        }
    }

    /// Open `path` for appending, creating it with mode 0644 if missing.
    pub fn open(path: &Path) -> LoggerResult<Self> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(DESTINATION_MODE);
        }
        let file = options
            .open(path)
            .map_err(|source| LoggerError::OpenDestination {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(path.display().to_string(), file))
    }

    /// The process's standard output.
    pub fn stdout() -> Self {
        Self::new("stdout", io::stdout())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Write the whole buffer, then flush.
    pub fn write_all(&mut self, buf: &[u8]) -> LoggerResult<()> {
        write_fully(self.writer.as_mut(), buf).map_err(|source| LoggerError::Write {
            destination: self.label.clone(),
            source,
        })?;
        self.flush()
    }

    pub fn flush(&mut self) -> LoggerResult<()> {
        self.writer.flush().map_err(|source| LoggerError::Flush {
            destination: self.label.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Destination")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Issue writes until `buf` is fully written.
///
/// Partial writes are accumulated and `Interrupted` is retried; any other
/// error, or a writer that accepts zero bytes, ends the attempt.
pub fn write_fully(writer: &mut dyn Write, buf: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    format!("destination accepted 0 of {} remaining bytes", buf.len() - written),
                ));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// The fixed destination set of a logger plus its primary output.
#[derive(Debug)]
pub struct FanOut {
    destinations: Vec<Destination>,
    primary: Destination,
}

impl FanOut {
    pub fn new(destinations: Vec<Destination>, primary: Destination) -> Self {
        Self {
            destinations,
            primary,
        }
    }

    /// Open every path in append/create mode. The first failure aborts.
    pub fn open<P: AsRef<Path>>(paths: &[P], primary: Destination) -> LoggerResult<Self> {
        let destinations = paths
            .iter()
            .map(|path| Destination::open(path.as_ref()))
            .collect::<LoggerResult<Vec<_>>>()?;
        Ok(Self::new(destinations, primary))
    }

    /// Number of configured destinations, not counting the primary output.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Labels of the configured destinations, in configuration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.destinations.iter().map(Destination::label)
    }

    /// Write `buf` verbatim to every destination, then to the primary output.
    ///
    /// Returns the number of destinations that failed; each failure is logged.
    pub fn broadcast(&mut self, buf: &[u8]) -> usize {
        let mut failures = 0;
        for destination in self
            .destinations
            .iter_mut()
            .chain(std::iter::once(&mut self.primary))
        {
            if let Err(e) = destination.write_all(buf) {
                failures += 1;
                tracing::warn!(
                    destination = destination.label(),
                    error = %e,
                    "failed to forward log message"
                );
            }
        }
        failures
    }

    /// Flush and close every destination exactly once.
    ///
    /// Flush failures are logged and returned; the handles are closed anyway.
    pub fn close(self) -> Vec<LoggerError> {
        let Self {
            destinations,
            mut primary,
        } = self;
        let mut errors = Vec::new();
        for mut destination in destinations {
            if let Err(e) = destination.flush() {
                tracing::warn!(destination = destination.label(), error = %e, "failed to flush destination");
                errors.push(e);
            }
        }
        if let Err(e) = primary.flush() {
            tracing::warn!(destination = primary.label(), error = %e, "failed to flush primary output");
            errors.push(e);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSink;
    use tracing_test::traced_test;

    #[test]
    fn write_fully_accumulates_partial_writes() {
        let sink = MockSink::trickle(3);
        let mut writer = sink.clone();
        write_fully(&mut writer, b"0123456789").unwrap();
        assert_eq!(sink.written(), b"0123456789");
        assert_eq!(sink.write_calls(), 4);
    }

    #[test]
    fn write_fully_retries_interrupted_writes() {
        let sink = MockSink::interrupting_once();
        let mut writer = sink.clone();
        write_fully(&mut writer, b"hello").unwrap();
        assert_eq!(sink.written(), b"hello");
        assert_eq!(sink.write_calls(), 2);
    }

    #[test]
    fn write_fully_stops_on_hard_error() {
        let mut writer = MockSink::failing();
        let err = write_fully(&mut writer, b"hello").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn write_fully_rejects_zero_length_writes() {
        let mut writer = MockSink::trickle(0);
        let err = write_fully(&mut writer, b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteZero);
    }

    #[test]
    fn flush_failure_is_reported_as_flush() {
        let sink = MockSink::failing_flush();
        let mut destination = Destination::new("full", sink.clone());

        let err = destination.write_all(b"line\n").unwrap_err();

        assert!(matches!(err, LoggerError::Flush { ref destination, .. } if destination == "full"));
        assert_eq!(sink.written(), b"line\n");
    }

    #[test]
    fn write_failure_is_reported_as_write() {
        let mut destination = Destination::new("broken", MockSink::failing());
        let err = destination.write_all(b"line\n").unwrap_err();
        assert!(matches!(err, LoggerError::Write { .. }));
    }

    #[test]
    fn broadcast_reaches_every_destination_and_primary() {
        let a = MockSink::new();
        let b = MockSink::new();
        let primary = MockSink::new();
        let mut fanout = FanOut::new(
            vec![Destination::new("a", a.clone()), Destination::new("b", b.clone())],
            Destination::new("primary", primary.clone()),
        );

        assert_eq!(fanout.broadcast(b"raw bytes\n"), 0);
        assert_eq!(a.written(), b"raw bytes\n");
        assert_eq!(b.written(), b"raw bytes\n");
        assert_eq!(primary.written(), b"raw bytes\n");
    }

    #[traced_test]
    #[test]
    fn broadcast_survives_failing_destination() {
        let ok = MockSink::new();
        let primary = MockSink::new();
        let mut fanout = FanOut::new(
            vec![
                Destination::new("broken", MockSink::failing()),
                Destination::new("ok", ok.clone()),
            ],
            Destination::new("primary", primary.clone()),
        );

        assert_eq!(fanout.broadcast(b"msg"), 1);
        assert_eq!(ok.written(), b"msg");
        assert_eq!(primary.written(), b"msg");
        assert!(logs_contain("failed to forward log message"));
        assert!(logs_contain("broken"));
    }

    #[test]
    fn open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, b"existing\n").unwrap();

        let mut fanout = FanOut::open(&[&path], Destination::new("primary", MockSink::new())).unwrap();
        assert_eq!(fanout.len(), 1);
        fanout.broadcast(b"appended\n");
        assert!(fanout.close().is_empty());

        assert_eq!(std::fs::read(&path).unwrap(), b"existing\nappended\n");
    }

    #[cfg(unix)]
    #[test]
    fn open_creates_file_with_mode_0644() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.log");
        let _destination = Destination::open(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        // umask can only remove bits
        assert_eq!(mode & 0o777 & !0o644, 0);
        assert!(mode & 0o600 == 0o600);
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.log");
        let err = FanOut::open(&[&path], Destination::new("primary", MockSink::new())).unwrap_err();
        assert!(matches!(err, LoggerError::OpenDestination { .. }));
        assert!(err.to_string().contains("out.log"));
    }
}
