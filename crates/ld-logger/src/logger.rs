//! The `Logger` facade: fan-out, payload extraction and storage.
//!
//! Driven by exactly one ingest loop, one message at a time; there is no
//! interior locking.

use std::path::Path;

use crate::error::LoggerResult;
use crate::fanout::{Destination, FanOut};
use crate::frequency::{self, Frequency};
use crate::parser;
use crate::store::{MessageStore, PayloadId};
use crate::summary::Summary;

/// What `Logger::push` did with a message after forwarding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The payload was stored under this handle.
    Stored(PayloadId),
    /// No payload delimiter was found; nothing was stored.
    Dropped,
}

/// Owns the payload store and the destination set.
#[derive(Debug)]
pub struct Logger {
    store: MessageStore,
    fanout: FanOut,
}

impl Logger {
    /// Open every path in append/create mode, with stdout as primary output.
    ///
    /// Any open failure is returned; the caller is expected to treat it as fatal.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> LoggerResult<Self> {
        let fanout = FanOut::open(paths, Destination::stdout())?;
        Ok(Self::from_fanout(fanout))
    }

    /// Build a logger over arbitrary sinks.
    pub fn with_destinations(destinations: Vec<Destination>, primary: Destination) -> Self {
        Self::from_fanout(FanOut::new(destinations, primary))
    }

    fn from_fanout(fanout: FanOut) -> Self {
        Self {
            store: MessageStore::new(),
            fanout,
        }
    }

    /// Forward `raw` to every destination, then store its payload.
    ///
    /// The raw bytes are forwarded even when no payload can be located.
    ///
    /// # Panics
    /// Panics if `raw` is empty; the ingest loop never hands over empty
    /// datagrams.
    pub fn push(&mut self, raw: &[u8]) -> PushOutcome {
        assert!(!raw.is_empty(), "Logger::push called with an empty message");

        self.fanout.broadcast(raw);
        self.store.grow_if_full();

        let Some(payload) = parser::split_payload(raw) else {
            tracing::warn!(
                raw = %String::from_utf8_lossy(raw),
                "received invalid message"
            );
            return PushOutcome::Dropped;
        };
        PushOutcome::Stored(self.store.append(payload))
    }

    /// Number of stored payloads.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn destination_count(&self) -> usize {
        self.fanout.len()
    }

    pub fn destination_labels(&self) -> impl Iterator<Item = &str> {
        self.fanout.labels()
    }

    /// Stored payloads in arrival order.
    pub fn payloads(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.store.iter()
    }

    pub fn payload(&self, id: PayloadId) -> Option<&[u8]> {
        self.store.get(id)
    }

    /// The most frequent payload; ties go to the lexicographically smallest.
    pub fn most_common(&self) -> Option<&[u8]> {
        frequency::most_common(&self.store).and_then(|f| self.store.get(f.id))
    }

    pub fn most_common_frequency(&self) -> Option<Frequency> {
        frequency::most_common(&self.store)
    }

    pub fn summary(&self) -> Summary {
        match frequency::most_common(&self.store) {
            Some(Frequency { id, occurrences }) => Summary {
                count: self.store.len(),
                most_common: self
                    .store
                    .get(id)
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
                occurrences,
            },
            None => Summary::empty(),
        }
    }

    /// Close every destination, free every payload and return the final summary.
    pub fn teardown(mut self) -> Summary {
        let summary = self.summary();
        let flush_failures = self.fanout.close().len();
        self.store.release();
        tracing::debug!(count = summary.count, flush_failures, "logger released");
        summary
    }
}
