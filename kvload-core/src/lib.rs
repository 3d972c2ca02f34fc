//! Multi-client benchmark engine for line-oriented key-value services
//!
//! Each simulated client owns one persistent [`Connection`] and drives it with
//! a [`Workload`] policy, recording one sample per operation. The
//! [`Orchestrator`] runs many clients in parallel and merges their samples
//! into an [`AggregateReport`]; [`ScalabilitySweep`] repeats that across
//! increasing client counts.

pub mod connection;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod protocol;
pub mod report;
pub mod sweep;
pub mod worker;
pub mod workload;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use connection::{Connection, ConnectionConfig, ConnectionState, KvTransport};
pub use error::{BenchError, BenchResult, ConnectionError};
pub use metrics::{LatencyStats, MetricsCollector, Sample};
pub use orchestrator::{Orchestrator, RunParameters, WorkerPool};
pub use protocol::{classify, OpKind, Operation, Response};
pub use report::{AggregateReport, ClientReport, RunOutcome};
pub use sweep::{ScalabilitySweep, SweepResult, SweepRow};
pub use worker::{ClientWorker, WorkerSummary};
pub use workload::{policy_for, Workload};
