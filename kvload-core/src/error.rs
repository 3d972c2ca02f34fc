//! Error types for connections and benchmark runs

use std::time::Duration;
use thiserror::Error;

/// Failures of a single session or a single command exchange
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connecting to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("Connection to {addr} lost: {reason}")]
    ConnectionLost { addr: String, reason: String },

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConnectionError {
    /// Whether the error is a request deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, ConnectionError::Timeout(_))
    }

    /// Whether the session died and the single reconnect also failed
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, ConnectionError::ConnectionLost { .. })
    }

    /// Whether the session could not be established at all
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            ConnectionError::Connect { .. } | ConnectionError::ConnectTimeout { .. }
        )
    }
}

/// Failures of a whole benchmark run or sweep
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("No clients could connect ({requested} requested)")]
    NoClientsAvailable { requested: usize },

    #[error("Invalid run parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Configuration error: {0}")]
    Config(#[from] kvload_config::ConfigError),
}

/// Result type alias for benchmark operations
pub type BenchResult<T> = std::result::Result<T, BenchError>;
