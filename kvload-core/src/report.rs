//! Aggregate report of one orchestrated run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::metrics::{LatencyStats, MetricsCollector, Sample};

/// Diagnostic slice of one connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientReport {
    pub client_index: usize,
    pub operations: usize,
    pub successes: usize,
    pub errors: usize,
    pub reconnects: u64,
    pub stats: Option<LatencyStats>,
}

/// How a finished run should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Clean,
    WithErrors,
    NoSuccessfulOperations,
}

/// Identity of a run, fixed before the measured phase starts
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub workload: String,
    pub num_clients: usize,
    pub ops_per_client: usize,
    pub started_at: DateTime<Utc>,
}

/// A connected client's collector together with its connection tallies
#[derive(Debug, Clone)]
pub struct ClientRun {
    pub collector: Arc<MetricsCollector>,
    pub reconnects: u64,
}

/// Merged statistics across every connected client; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub workload: String,
    /// Clients requested
    pub num_clients: usize,
    /// Clients that connected and ran
    pub connected_clients: usize,
    pub ops_per_client: usize,
    pub started_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub total_ops: usize,
    pub total_successes: usize,
    pub total_errors: usize,
    /// Operations per second across the whole run
    pub throughput: f64,
    /// Aggregate throughput split evenly over the requested clients
    pub throughput_per_client: f64,
    pub latency: Option<LatencyStats>,
    pub clients: Vec<ClientReport>,
    #[serde(skip)]
    pub samples: Vec<Sample>,
}

impl AggregateReport {
    /// Merge the per-client collectors, in client index order
    pub fn from_clients(header: RunHeader, elapsed: Duration, runs: Vec<ClientRun>) -> Self {
        let mut samples = Vec::new();
        let mut clients = Vec::with_capacity(runs.len());

        for run in &runs {
            let client_samples = run.collector.samples();
            let stats = LatencyStats::from_samples(&client_samples);
            clients.push(ClientReport {
                client_index: run.collector.client_index(),
                operations: client_samples.len(),
                successes: run.collector.successes(),
                errors: run.collector.errors(),
                reconnects: run.reconnects,
                stats,
            });
            samples.extend(client_samples);
        }
        clients.sort_by_key(|c| c.client_index);

        let total_successes = clients.iter().map(|c| c.successes).sum();
        let total_errors = clients.iter().map(|c| c.errors).sum();

        let mut report = Self {
            workload: header.workload,
            num_clients: header.num_clients,
            connected_clients: clients.len(),
            ops_per_client: header.ops_per_client,
            started_at: header.started_at,
            elapsed,
            total_ops: samples.len(),
            total_successes,
            total_errors,
            throughput: 0.0,
            throughput_per_client: 0.0,
            latency: LatencyStats::from_samples(&samples),
            clients,
            samples,
        };
        report.recompute_throughput();
        report
    }

    /// Derive both throughput figures from the completed operation count and elapsed time
    pub fn recompute_throughput(&mut self) {
        let secs = self.elapsed.as_secs_f64();
        let completed = self.total_ops as f64;

        self.throughput = if secs > 0.0 { completed / secs } else { 0.0 };
        self.throughput_per_client = if secs > 0.0 && self.num_clients > 0 {
            completed / (self.num_clients as f64 * secs)
        } else {
            0.0
        };
    }

    pub fn error_rate(&self) -> f64 {
        if self.total_ops == 0 {
            0.0
        } else {
            self.total_errors as f64 / self.total_ops as f64
        }
    }

    pub fn has_successes(&self) -> bool {
        self.total_successes > 0
    }

    pub fn outcome(&self) -> RunOutcome {
        if !self.has_successes() {
            RunOutcome::NoSuccessfulOperations
        } else if self.total_errors > 0 {
            RunOutcome::WithErrors
        } else {
            RunOutcome::Clean
        }
    }

    /// Clients ordered by completed operations, most first
    pub fn busiest_clients(&self, limit: usize) -> Vec<&ClientReport> {
        let mut ranked: Vec<&ClientReport> = self.clients.iter().collect();
        ranked.sort_by(|a, b| b.operations.cmp(&a.operations));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(num_clients: usize) -> RunHeader {
        RunHeader {
            workload: "balanced".to_string(),
            num_clients,
            ops_per_client: 4,
            started_at: Utc::now(),
        }
    }

    fn run(client_index: usize, outcomes: &[(f64, bool)]) -> ClientRun {
        let collector = Arc::new(MetricsCollector::new(client_index));
        for &(latency, success) in outcomes {
            collector.record(latency, success);
        }
        ClientRun {
            collector,
            reconnects: 0,
        }
    }

    #[test]
    fn test_merge_preserves_client_order_and_totals() {
        let report = AggregateReport::from_clients(
            header(2),
            Duration::from_secs(2),
            vec![
                run(1, &[(1.0, true), (2.0, false)]),
                run(0, &[(3.0, true), (4.0, true)]),
            ],
        );

        let order: Vec<usize> = report.clients.iter().map(|c| c.client_index).collect();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(report.total_ops, 4);
        assert_eq!(report.total_successes, 3);
        assert_eq!(report.total_errors, 1);
        assert_eq!(report.throughput, 2.0);
        assert_eq!(report.throughput_per_client, 1.0);
        assert_eq!(report.error_rate(), 0.25);
        assert_eq!(report.outcome(), RunOutcome::WithErrors);

        let latency = report.latency.as_ref().unwrap();
        assert_eq!(latency.min, 1.0);
        assert_eq!(latency.max, 4.0);
    }

    #[test]
    fn test_recompute_throughput_after_json_round_trip() {
        let report = AggregateReport::from_clients(
            header(2),
            Duration::from_secs(2),
            vec![run(0, &[(1.0, true); 6]), run(1, &[(2.0, false); 4])],
        );
        assert_eq!(report.throughput, 5.0);

        let json = serde_json::to_string(&report).unwrap();
        let mut restored: AggregateReport = serde_json::from_str(&json).unwrap();
        assert!(restored.samples.is_empty());
        assert_eq!(restored.total_ops, 10);

        restored.recompute_throughput();
        assert_eq!(restored.throughput, 5.0);
        assert_eq!(restored.throughput_per_client, 2.5);
    }

    #[test]
    fn test_recompute_throughput_is_idempotent() {
        let mut report = AggregateReport::from_clients(
            header(3),
            Duration::from_millis(1500),
            vec![run(0, &[(1.0, true); 6]), run(1, &[(1.0, true); 3])],
        );
        let (throughput, per_client) = (report.throughput, report.throughput_per_client);

        report.recompute_throughput();
        report.recompute_throughput();
        assert_eq!(report.throughput, throughput);
        assert_eq!(report.throughput_per_client, per_client);
        assert_eq!(throughput, 9.0 / 1.5);
        // Split over the requested clients, not the connected ones
        assert_eq!(per_client, 9.0 / (3.0 * 1.5));
    }

    #[test]
    fn test_zero_successes_are_flagged() {
        let report = AggregateReport::from_clients(
            header(1),
            Duration::from_secs(1),
            vec![run(0, &[(5.0, false), (6.0, false)])],
        );
        assert!(!report.has_successes());
        assert_eq!(report.outcome(), RunOutcome::NoSuccessfulOperations);
        assert_eq!(report.error_rate(), 1.0);
    }

    #[test]
    fn test_busiest_clients_ranked_by_operations() {
        let report = AggregateReport::from_clients(
            header(3),
            Duration::from_secs(1),
            vec![
                run(0, &[(1.0, true)]),
                run(1, &[(1.0, true); 3]),
                run(2, &[(1.0, true); 2]),
            ],
        );
        let ranked: Vec<usize> = report
            .busiest_clients(2)
            .iter()
            .map(|c| c.client_index)
            .collect();
        assert_eq!(ranked, vec![1, 2]);
    }

    #[test]
    fn test_json_omits_raw_samples() {
        let report = AggregateReport::from_clients(
            header(1),
            Duration::from_millis(250),
            vec![run(0, &[(1.0, true)])],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("samples").is_none());
        assert_eq!(json["elapsed"], "250ms");
        assert_eq!(json["total_ops"], 1);
    }
}
