//! Scalability sweep: the same run repeated at increasing client counts

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{BenchError, BenchResult};
use crate::orchestrator::{Orchestrator, RunParameters};
use crate::report::AggregateReport;
use crate::workload::Workload;

/// One line of the scaling table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub clients: usize,
    pub throughput: f64,
    pub mean_latency_ms: Option<f64>,
    pub per_client_throughput: f64,
}

/// Reports in ascending client-count order, plus the counts that could not run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    pub workload: String,
    pub ops_per_client: usize,
    pub points: Vec<AggregateReport>,
    /// Client counts at which no client could connect
    pub skipped: Vec<usize>,
}

impl SweepResult {
    pub fn table(&self) -> Vec<SweepRow> {
        self.points
            .iter()
            .map(|report| SweepRow {
                clients: report.num_clients,
                throughput: report.throughput,
                mean_latency_ms: report.latency.as_ref().map(|l| l.mean),
                per_client_throughput: report.throughput_per_client,
            })
            .collect()
    }
}

/// Drives an [`Orchestrator`] once per client count
pub struct ScalabilitySweep {
    orchestrator: Orchestrator,
}

impl ScalabilitySweep {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub async fn run(
        &self,
        client_counts: &[usize],
        ops_per_client: usize,
        workload: Arc<dyn Workload>,
        key_range: usize,
    ) -> BenchResult<SweepResult> {
        validate_client_counts(client_counts)?;

        let base = RunParameters::new(client_counts[0], ops_per_client, workload, key_range);
        base.validate()?;
        info!(
            "Scalability sweep of {} over client counts {:?}",
            base.workload.name(),
            client_counts
        );

        let mut result = SweepResult {
            workload: base.workload.name().to_string(),
            ops_per_client,
            points: Vec::with_capacity(client_counts.len()),
            skipped: Vec::new(),
        };

        for &clients in client_counts {
            match self.orchestrator.run(&base.with_clients(clients)).await {
                Ok(report) => result.points.push(report),
                Err(BenchError::NoClientsAvailable { requested }) => {
                    warn!("Skipping sweep point {}: no clients connected", requested);
                    result.skipped.push(requested);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }
}

fn validate_client_counts(client_counts: &[usize]) -> BenchResult<()> {
    if client_counts.is_empty() {
        return Err(BenchError::InvalidSweep(
            "at least one client count is required".to_string(),
        ));
    }
    if client_counts.contains(&0) {
        return Err(BenchError::InvalidSweep(
            "client counts must be greater than 0".to_string(),
        ));
    }
    if client_counts.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(BenchError::InvalidSweep(format!(
            "client counts must be strictly ascending, got {:?}",
            client_counts
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionConfig;
    use crate::testing::MockKvServer;
    use crate::workload::Balanced;
    use kvload_config::WarmupConfig;

    #[test]
    fn test_client_counts_validation() {
        assert!(validate_client_counts(&[1, 5, 10]).is_ok());
        assert!(matches!(
            validate_client_counts(&[]),
            Err(BenchError::InvalidSweep(_))
        ));
        assert!(validate_client_counts(&[5, 1]).is_err());
        assert!(validate_client_counts(&[1, 1]).is_err());
        assert!(validate_client_counts(&[0, 1]).is_err());
    }

    #[tokio::test]
    async fn test_sweep_visits_points_in_order() {
        let server = MockKvServer::start().await.unwrap();
        let sweep = ScalabilitySweep::new(Orchestrator::new(
            server.connection_config(),
            WarmupConfig::default(),
        ));

        let result = sweep
            .run(&[1, 3], 10, Arc::new(Balanced), 5)
            .await
            .unwrap();

        assert!(result.skipped.is_empty());
        let table = result.table();
        let clients: Vec<usize> = table.iter().map(|row| row.clients).collect();
        assert_eq!(clients, vec![1, 3]);
        assert_eq!(result.points[1].total_ops, 30);
        assert!(table.iter().all(|row| row.mean_latency_ms.is_some()));
    }

    #[tokio::test]
    async fn test_unreachable_points_are_skipped() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut config = ConnectionConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = port;

        let sweep = ScalabilitySweep::new(Orchestrator::new(config, WarmupConfig::default()));
        let result = sweep
            .run(&[1, 2], 10, Arc::new(Balanced), 5)
            .await
            .unwrap();
        assert!(result.points.is_empty());
        assert_eq!(result.skipped, vec![1, 2]);
    }
}
