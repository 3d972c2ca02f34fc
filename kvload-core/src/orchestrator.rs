//! Concurrency orchestrator
//!
//! One [`Orchestrator::run`] call goes through four phases:
//!
//! 1. connect every requested client concurrently; failures are excluded
//! 2. warm up a few connected clients with throwaway operations
//! 3. run every connected client in parallel on a [`WorkerPool`] scoped to the call
//! 4. join all workers and merge their collectors into an [`AggregateReport`]

use chrono::Utc;
use futures::future::join_all;
use kvload_config::{KvloadConfig, WarmupConfig};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::connection::{Connection, ConnectionConfig, KvTransport};
use crate::error::{BenchError, BenchResult};
use crate::metrics::MetricsCollector;
use crate::report::{AggregateReport, ClientRun, RunHeader};
use crate::worker::{ClientWorker, WorkerSummary};
use crate::workload::{policy_for, Workload};

/// What to run: client count, per-client operation count, mix and key space
#[derive(Clone)]
pub struct RunParameters {
    pub num_clients: usize,
    pub ops_per_client: usize,
    pub workload: Arc<dyn Workload>,
    pub key_range: usize,
}

impl RunParameters {
    pub fn new(
        num_clients: usize,
        ops_per_client: usize,
        workload: Arc<dyn Workload>,
        key_range: usize,
    ) -> Self {
        Self {
            num_clients,
            ops_per_client,
            workload,
            key_range,
        }
    }

    /// Parameters of the configured single run
    pub fn from_config(config: &KvloadConfig) -> Self {
        let benchmark = &config.benchmark;
        Self::new(
            benchmark.clients,
            benchmark.ops_per_client,
            policy_for(benchmark.workload),
            benchmark.key_range,
        )
    }

    pub fn with_clients(&self, num_clients: usize) -> Self {
        Self {
            num_clients,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> BenchResult<()> {
        for (name, value) in [
            ("num_clients", self.num_clients),
            ("ops_per_client", self.ops_per_client),
            ("key_range", self.key_range),
        ] {
            if value == 0 {
                return Err(BenchError::InvalidParameters(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RunParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunParameters")
            .field("num_clients", &self.num_clients)
            .field("ops_per_client", &self.ops_per_client)
            .field("workload", &self.workload.name())
            .field("key_range", &self.key_range)
            .finish()
    }
}

/// Fixed-size pool of worker tasks, one per connected client.
///
/// Lives for a single run; dropping it aborts anything still running.
pub struct WorkerPool {
    tasks: JoinSet<WorkerSummary>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn<T>(&mut self, worker: ClientWorker<T>, ops: usize, key_range: usize)
    where
        T: KvTransport + 'static,
    {
        self.tasks.spawn(worker.run(ops, key_range));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every worker; a worker that panicked is logged and skipped
    pub async fn join(mut self) -> Vec<WorkerSummary> {
        let mut summaries = Vec::with_capacity(self.tasks.len());
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => error!("Worker task failed: {}", e),
            }
        }
        summaries
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one benchmark at a time against a single endpoint
#[derive(Debug, Clone)]
pub struct Orchestrator {
    connection: ConnectionConfig,
    warmup: WarmupConfig,
}

impl Orchestrator {
    pub fn new(connection: ConnectionConfig, warmup: WarmupConfig) -> Self {
        Self { connection, warmup }
    }

    pub fn from_config(config: &KvloadConfig) -> Self {
        Self::new(
            ConnectionConfig::from(&config.target),
            config.benchmark.warmup,
        )
    }

    pub fn connection_config(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Open, exercise and close one session before any run
    pub async fn probe(&self) -> BenchResult<()> {
        Connection::probe(self.connection.clone()).await?;
        Ok(())
    }

    pub async fn run(&self, params: &RunParameters) -> BenchResult<AggregateReport> {
        params.validate()?;
        info!(
            "Starting {} run: {} clients x {} ops against {}",
            params.workload.name(),
            params.num_clients,
            params.ops_per_client,
            self.connection.address()
        );

        let mut workers = self.connect_workers(params).await;
        if workers.is_empty() {
            return Err(BenchError::NoClientsAvailable {
                requested: params.num_clients,
            });
        }
        info!(
            "{} of {} clients connected",
            workers.len(),
            params.num_clients
        );

        self.warm_up(&mut workers, params.ops_per_client).await;

        let collectors: Vec<Arc<MetricsCollector>> =
            workers.iter().map(|w| w.metrics().clone()).collect();

        let started_at = Utc::now();
        let start = Instant::now();
        let mut pool = WorkerPool::new();
        for worker in workers {
            pool.spawn(worker, params.ops_per_client, params.key_range);
        }
        debug!("Dispatched {} workers", pool.len());
        let summaries = pool.join().await;
        let elapsed = start.elapsed();

        let runs = collectors
            .into_iter()
            .map(|collector| {
                let reconnects = summaries
                    .iter()
                    .find(|s| s.client_index == collector.client_index())
                    .map(|s| s.reconnects)
                    .unwrap_or(0);
                ClientRun {
                    collector,
                    reconnects,
                }
            })
            .collect();

        let report = AggregateReport::from_clients(
            RunHeader {
                workload: params.workload.name().to_string(),
                num_clients: params.num_clients,
                ops_per_client: params.ops_per_client,
                started_at,
            },
            elapsed,
            runs,
        );

        info!(
            "Run finished in {:.3}s: {} ops, {} errors, {:.0} ops/sec",
            elapsed.as_secs_f64(),
            report.total_ops,
            report.total_errors,
            report.throughput
        );
        Ok(report)
    }

    /// Phase 1: open all sessions at once, keeping client index order
    async fn connect_workers(&self, params: &RunParameters) -> Vec<ClientWorker<Connection>> {
        let attempts =
            (0..params.num_clients).map(|_| Connection::connect(self.connection.clone()));
        let results = join_all(attempts).await;

        results
            .into_iter()
            .enumerate()
            .filter_map(|(client_index, result)| match result {
                Ok(connection) => Some(ClientWorker::new(
                    client_index,
                    connection,
                    params.workload.clone(),
                    Arc::new(MetricsCollector::new(client_index)),
                )),
                Err(e) => {
                    warn!("Client {} excluded from run: {}", client_index, e);
                    None
                }
            })
            .collect()
    }

    /// Phase 2: throwaway operations on the first few workers
    async fn warm_up(&self, workers: &mut [ClientWorker<Connection>], ops_per_client: usize) {
        let ops = self.warmup.ops_for(ops_per_client);
        if ops == 0 {
            debug!("Skipping warmup for {} ops per client", ops_per_client);
            return;
        }

        let count = workers.len().min(self.warmup.max_clients);
        info!("Warming up {} clients with {} ops each", count, ops);
        for worker in workers.iter_mut().take(count) {
            worker.warmup(ops).await;
        }
    }
}
