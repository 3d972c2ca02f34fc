//! Client worker: one simulated user driving one transport

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use crate::connection::KvTransport;
use crate::metrics::MetricsCollector;
use crate::protocol::{classify, Operation};
use crate::workload::{warmup_operation, Workload};

/// Per-worker tallies reported once the worker finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerSummary {
    pub client_index: usize,
    pub operations: usize,
    pub reconnects: u64,
}

/// Runs a fixed number of operations against one transport, one sample per operation
pub struct ClientWorker<T: KvTransport> {
    client_index: usize,
    transport: T,
    workload: Arc<dyn Workload>,
    metrics: Arc<MetricsCollector>,
}

impl<T: KvTransport> ClientWorker<T> {
    pub fn new(
        client_index: usize,
        transport: T,
        workload: Arc<dyn Workload>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            client_index,
            transport,
            workload,
            metrics,
        }
    }

    pub fn client_index(&self) -> usize {
        self.client_index
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Issue `ops` throwaway operations; nothing is recorded
    pub async fn warmup(&mut self, ops: usize) {
        for i in 0..ops {
            let operation = warmup_operation(i);
            if let Err(e) = self.transport.issue(&operation.command_line()).await {
                debug!("Client {} warmup operation {} failed: {}", self.client_index, i, e);
            }
        }
    }

    /// Execute `ops` measured operations, then close the transport once.
    ///
    /// A failed operation is recorded as a failed sample and never stops the loop.
    pub async fn run(mut self, ops: usize, key_range: usize) -> WorkerSummary {
        for op_index in 0..ops {
            let operation = self.workload.operation(self.client_index, op_index, key_range);
            let (latency_ms, success) = self.execute(&operation).await;
            self.metrics.record(latency_ms, success);
        }

        self.transport.close().await;

        WorkerSummary {
            client_index: self.client_index,
            operations: ops,
            reconnects: self.transport.reconnects(),
        }
    }

    /// Time one exchange, including any reconnect it triggered
    async fn execute(&mut self, operation: &Operation) -> (f64, bool) {
        let command = operation.command_line();
        let start = Instant::now();
        let result = self.transport.issue(&command).await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let success = match result {
            Ok(line) => {
                let response = classify(operation.kind, &line);
                trace!("Client {} {} -> {:?}", self.client_index, command, response);
                response.is_success_for(operation.kind)
            }
            Err(e) => {
                debug!("Client {} {} failed: {}", self.client_index, command, e);
                false
            }
        };

        (latency_ms, success)
    }
}
