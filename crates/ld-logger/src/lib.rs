//! Core of the local log daemon.
//!
//! Receives raw syslog-style datagrams one at a time, fans each raw buffer out
//! to a fixed set of destinations (plus stdout), extracts the payload that
//! follows the `": "` prefix delimiter and keeps it for the shutdown report:
//! - `parser` locates the payload inside a raw message
//! - `fanout` writes raw bytes to every destination, never failing the caller
//! - `store` keeps owned payloads in an arena with explicit capacity
//! - `frequency` finds the most frequent payload
//! - `Logger` ties them together; `Summary` is the shutdown report

pub mod error;
pub mod fanout;
pub mod frequency;
pub mod logger;
pub mod mock;
pub mod parser;
pub mod store;
pub mod summary;

// Re-export key types for convenience
pub use error::{LoggerError, LoggerResult};
pub use fanout::{Destination, FanOut};
pub use frequency::Frequency;
pub use logger::{Logger, PushOutcome};
pub use mock::MockSink;
pub use store::{MessageStore, PayloadId};
pub use summary::Summary;
