//! Human-readable rendering of run reports and sweep summaries

use colored::Colorize;
use kvload_core::{AggregateReport, RunOutcome, SweepResult};
use std::io::{self, Write};

const RULE_WIDTH: usize = 70;

/// Per-client tables are only shown for small runs
const MAX_CLIENTS_FOR_BREAKDOWN: usize = 10;
const BREAKDOWN_ROWS: usize = 5;

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn rate(value: f64) -> String {
    group_thousands(value.round() as u64)
}

pub fn write_run_header(
    out: &mut impl Write,
    description: &str,
    num_clients: usize,
    ops_per_client: usize,
    address: &str,
) -> io::Result<()> {
    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "{}", format!("Multi-Client Test: {}", description).bold())?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "Target: {}", address)?;
    writeln!(out, "Clients: {}", num_clients)?;
    writeln!(out, "Operations per client: {}", group_thousands(ops_per_client as u64))?;
    writeln!(
        out,
        "Total operations: {}",
        group_thousands((num_clients * ops_per_client) as u64)
    )
}

pub fn write_report(out: &mut impl Write, report: &AggregateReport) -> io::Result<()> {
    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "{}", "Results".bold())?;
    writeln!(out, "{}", rule('='))?;
    writeln!(
        out,
        "Clients: {} ({} connected)",
        report.num_clients, report.connected_clients
    )?;
    writeln!(
        out,
        "Operations per client: {}",
        group_thousands(report.ops_per_client as u64)
    )?;
    writeln!(out, "Total operations: {}", group_thousands(report.total_ops as u64))?;
    writeln!(
        out,
        "Successful: {}",
        group_thousands(report.total_successes as u64).green()
    )?;
    let errors = group_thousands(report.total_errors as u64);
    if report.total_errors > 0 {
        writeln!(out, "Errors: {}", errors.red())?;
    } else {
        writeln!(out, "Errors: {}", errors)?;
    }
    writeln!(out, "Elapsed time: {:.3} seconds", report.elapsed.as_secs_f64())?;

    writeln!(out, "\nThroughput:")?;
    writeln!(
        out,
        "  Aggregate: {} ops/sec ({:.2} K ops/sec)",
        rate(report.throughput),
        report.throughput / 1000.0
    )?;
    writeln!(out, "  Per client: {} ops/sec", rate(report.throughput_per_client))?;

    match (report.outcome(), report.latency.as_ref()) {
        (RunOutcome::NoSuccessfulOperations, _) | (_, None) => {
            writeln!(
                out,
                "\n{}",
                "No successful operations: latency statistics are not meaningful"
                    .red()
                    .bold()
            )?;
        }
        (_, Some(latency)) => {
            writeln!(out, "\nLatency (ms):")?;
            writeln!(out, "  Min: {:.2}", latency.min)?;
            writeln!(out, "  Max: {:.2}", latency.max)?;
            writeln!(out, "  Mean: {:.2}", latency.mean)?;
            writeln!(out, "  Median: {:.2}", latency.median)?;
            writeln!(out, "  P95: {:.2}", latency.p95)?;
            writeln!(out, "  P99: {:.2}", latency.p99)?;
        }
    }

    if report.total_errors > 0 {
        writeln!(
            out,
            "\n{}",
            format!("Error rate: {:.2}%", report.error_rate() * 100.0).yellow()
        )?;
    }

    if report.num_clients <= MAX_CLIENTS_FOR_BREAKDOWN && !report.clients.is_empty() {
        write_client_breakdown(out, report)?;
    }

    writeln!(out, "{}", rule('='))
}

fn write_client_breakdown(out: &mut impl Write, report: &AggregateReport) -> io::Result<()> {
    writeln!(out, "\n{}", rule('='))?;
    writeln!(
        out,
        "{}",
        format!("Per-Client Statistics (top {} by operations)", BREAKDOWN_ROWS).bold()
    )?;
    writeln!(out, "{}", rule('='))?;
    writeln!(
        out,
        "{:<10} {:<10} {:<10} {:<10} {:<15} {:<12}",
        "Client", "Ops", "Success", "Errors", "Mean Lat(ms)", "P95(ms)"
    )?;
    writeln!(out, "{}", rule('-'))?;

    for client in report.busiest_clients(BREAKDOWN_ROWS) {
        let (mean, p95) = client
            .stats
            .as_ref()
            .map(|s| (format!("{:.2}", s.mean), format!("{:.2}", s.p95)))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        writeln!(
            out,
            "{:<10} {:<10} {:<10} {:<10} {:<15} {:<12}",
            client.client_index, client.operations, client.successes, client.errors, mean, p95
        )?;
    }
    Ok(())
}

pub fn write_sweep_summary(out: &mut impl Write, result: &SweepResult) -> io::Result<()> {
    if !result.skipped.is_empty() {
        writeln!(
            out,
            "\n{}",
            format!("Skipped client counts (no connections): {:?}", result.skipped).yellow()
        )?;
    }

    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "{}", "Scalability Summary".bold())?;
    writeln!(out, "{}", rule('='))?;
    writeln!(
        out,
        "{:<10} {:<25} {:<20} {:<20}",
        "Clients", "Throughput (ops/sec)", "Latency Mean (ms)", "Per-Client (ops/sec)"
    )?;
    writeln!(out, "{}", rule('-'))?;

    for row in result.table() {
        let mean = row
            .mean_latency_ms
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<10} {:>20}  {:>15}     {:>15}",
            row.clients,
            rate(row.throughput),
            mean,
            rate(row.per_client_throughput)
        )?;
    }
    writeln!(out, "{}", rule('='))
}
