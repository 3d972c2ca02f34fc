//! Testing utilities for kvload-core
//!
//! Enabled with the `testing` feature (and always for this crate's own unit
//! tests):
//!
//! ```toml
//! [dev-dependencies]
//! kvload-core = { path = "../kvload-core", features = ["testing"] }
//! ```
//!
//! - `MockKvServer` - in-process line-protocol key-value server with fault
//!   injection (session drops, delayed replies, error replies) and a log of
//!   every command line received

pub mod mock_server;

pub use mock_server::{MockKvServer, MockKvServerBuilder};
