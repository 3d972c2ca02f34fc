//! Scalability sweep across increasing client counts

use anyhow::Result;
use kvload_config::{SweepConfig, WarmupConfig};
use kvload_core::testing::MockKvServer;
use kvload_core::workload::{HotKey, ReadHeavy};
use kvload_core::{BenchError, Orchestrator, ScalabilitySweep};
use std::sync::Arc;

#[tokio::test]
async fn test_sweep_of_one_and_five_clients() -> Result<()> {
    let server = MockKvServer::start().await?;
    let sweep = ScalabilitySweep::new(Orchestrator::new(
        server.connection_config(),
        WarmupConfig::default(),
    ));

    let result = sweep.run(&[1, 5], 20, Arc::new(ReadHeavy), 10).await?;

    assert_eq!(result.points.len(), 2);
    assert_eq!(result.points[0].num_clients, 1);
    assert_eq!(result.points[1].num_clients, 5);
    for report in &result.points {
        assert_eq!(report.total_ops, report.num_clients * 20);
        let expected = report.samples.len() as f64 / report.elapsed.as_secs_f64();
        assert_eq!(report.throughput, expected);

        let latency = report.latency.as_ref().expect("latency stats");
        assert!(latency.min <= latency.median && latency.median <= latency.p95);
        assert!(latency.p95 <= latency.p99 && latency.p99 <= latency.max);
    }

    let table = result.table();
    assert_eq!(table.len(), 2);
    assert_eq!(table[1].clients, 5);
    assert_eq!(table[1].throughput, result.points[1].throughput);
    assert_eq!(
        table[1].per_client_throughput,
        result.points[1].throughput_per_client
    );
    Ok(())
}

#[tokio::test]
async fn test_sweep_rejects_unordered_counts() -> Result<()> {
    let server = MockKvServer::start().await?;
    let sweep = ScalabilitySweep::new(Orchestrator::new(
        server.connection_config(),
        WarmupConfig::default(),
    ));

    let error = sweep
        .run(&[5, 1], 10, Arc::new(HotKey), 10)
        .await
        .unwrap_err();
    assert!(matches!(error, BenchError::InvalidSweep(_)));
    assert_eq!(server.sessions_accepted(), 0);
    Ok(())
}

#[tokio::test]
async fn test_configured_counts_drive_the_sweep() -> Result<()> {
    let server = MockKvServer::start().await?;
    let config = SweepConfig {
        client_counts: Some(vec![2, 3]),
    };
    let counts = config.resolve_client_counts(10);

    let result = ScalabilitySweep::new(Orchestrator::new(
        server.connection_config(),
        WarmupConfig::default(),
    ))
    .run(&counts, 10, Arc::new(HotKey), 10)
    .await?;

    let clients: Vec<usize> = result.table().iter().map(|row| row.clients).collect();
    assert_eq!(clients, vec![2, 3]);
    assert!(server
        .commands()
        .iter()
        .any(|command| command.contains("hot_key_")));
    Ok(())
}
