//! Reconnect-on-close behaviour observed through full runs

use anyhow::Result;
use kvload_config::WarmupConfig;
use kvload_core::testing::MockKvServer;
use kvload_core::workload::Balanced;
use kvload_core::{Connection, Orchestrator, RunParameters};
use std::sync::Arc;

#[tokio::test]
async fn test_sessions_closed_by_server_are_reopened_transparently() -> Result<()> {
    let server = MockKvServer::builder().close_after_replies(3).start().await?;

    let report = Orchestrator::new(server.connection_config(), WarmupConfig::default())
        .run(&RunParameters::new(2, 10, Arc::new(Balanced), 1))
        .await?;

    assert_eq!(report.total_ops, 20);
    assert_eq!(report.total_errors, 0);
    // 10 replies per client at 3 per session: sessions 1..=4, so 3 reconnects each
    for client in &report.clients {
        assert_eq!(client.reconnects, 3);
    }
    Ok(())
}

#[tokio::test]
async fn test_first_command_is_resent_after_a_dropped_session() -> Result<()> {
    let server = MockKvServer::builder()
        .drop_sessions_on_first_command(1)
        .start()
        .await?;

    let mut connection = Connection::connect(server.connection_config()).await?;
    assert_eq!(connection.issue("SET resend me").await?, "OK");
    assert_eq!(connection.issue("GET resend").await?, "me");
    connection.close().await;

    assert_eq!(
        server.commands(),
        vec!["SET resend me", "SET resend me", "GET resend"]
    );
    assert_eq!(connection.reconnects(), 1);
    Ok(())
}

#[tokio::test]
async fn test_repeated_close_is_counted_as_one_failed_sample() -> Result<()> {
    // Both the original session and its replacement die on the first command
    let server = MockKvServer::builder()
        .drop_sessions_on_first_command(2)
        .seed("key_0_0", "before")
        .start()
        .await?;

    let report = Orchestrator::new(server.connection_config(), WarmupConfig::default())
        .run(&RunParameters::new(1, 4, Arc::new(Balanced), 1))
        .await?;

    assert_eq!(report.total_ops, 4);
    assert_eq!(report.total_errors, 1);
    assert_eq!(report.total_successes, 3);
    assert!(!report.samples[0].success);
    assert_eq!(
        server.commands()[..2],
        ["SET key_0_0 value_0_0", "SET key_0_0 value_0_0"]
    );
    Ok(())
}
