//! Local log daemon — library crate.
//!
//! Binds a unix datagram socket, feeds every received datagram to an
//! `ld_logger::Logger` until a shutdown signal arrives, then reports the
//! summary. Exposed as a library so `ld-e2e-tests` can drive the ingest loop
//! against a real socket.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod mock;
pub mod runner;
pub mod shutdown;
pub mod socket;

pub use config::{DaemonConfig, LogFormat};
pub use error::{DaemonError, DaemonResult};
pub use ingest::{DatagramSource, IngestStats};
pub use mock::MockDatagramSource;
pub use socket::BoundSocket;
