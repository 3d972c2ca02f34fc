//! Logging initialisation for kvload
//!
//! Installs a global `tracing` subscriber configured from
//! [`kvload_config::LoggingConfig`]. Output goes to stderr so that reports
//! written to stdout can be piped or parsed.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
