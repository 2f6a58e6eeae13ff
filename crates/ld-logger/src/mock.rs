//! In-memory destination for testing without touching the filesystem.
//!
//! Clones share the same buffer, so a test can hand one clone to a
//! `Destination` and keep another for assertions.

use std::io::{self, ErrorKind, Write};
use std::sync::{Arc, Mutex};

/// How a `MockSink` reacts to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkMode {
    /// Accept every byte.
    Healthy,
    /// Fail every write with `BrokenPipe`.
    Failing,
    /// Fail the first write with `Interrupted`, then behave normally.
    InterruptOnce,
    /// Accept at most this many bytes per write.
    Trickle(usize),
    /// Accept every byte, fail every flush.
    FlushFailing,
}

#[derive(Debug)]
struct SinkState {
    written: Vec<u8>,
    mode: SinkMode,
    write_calls: usize,
    flushes: usize,
}

/// A cloneable `Write` sink that records everything written to it.
#[derive(Debug, Clone)]
pub struct MockSink {
    state: Arc<Mutex<SinkState>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::with_mode(SinkMode::Healthy)
    }

    /// A sink whose every write fails with a non-retryable error.
    pub fn failing() -> Self {
        Self::with_mode(SinkMode::Failing)
    }

    /// A sink whose first write is interrupted by a signal.
    pub fn interrupting_once() -> Self {
        Self::with_mode(SinkMode::InterruptOnce)
    }

    /// A sink that accepts at most `chunk` bytes per write call.
    pub fn trickle(chunk: usize) -> Self {
        Self::with_mode(SinkMode::Trickle(chunk))
    }

    /// A sink that accepts writes but whose every flush fails.
    pub fn failing_flush() -> Self {
        Self::with_mode(SinkMode::FlushFailing)
    }

    fn with_mode(mode: SinkMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                written: Vec::new(),
                mode,
                write_calls: 0,
                flushes: 0,
            })),
        }
    }

    /// All bytes accepted so far.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().written.clone()
    }

    /// Number of `write` calls, including failed ones.
    pub fn write_calls(&self) -> usize {
        self.state.lock().unwrap().write_calls
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.write_calls += 1;
        let accepted = match state.mode {
            SinkMode::Healthy | SinkMode::FlushFailing => buf.len(),
            SinkMode::Failing => {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "mock sink closed"));
            }
            SinkMode::InterruptOnce => {
                state.mode = SinkMode::Healthy;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            SinkMode::Trickle(chunk) => buf.len().min(chunk),
        };
        state.written.extend_from_slice(&buf[..accepted]);
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.flushes += 1;
        if state.mode == SinkMode::FlushFailing {
            return Err(io::Error::new(ErrorKind::StorageFull, "mock sink full"));
        }
        Ok(())
    }
}
