use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use kvload_config::{ConfigLoader, KvloadConfig};
use kvload_core::{Orchestrator, RunParameters, ScalabilitySweep};
use kvload_logging::init_logging_from_config;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

mod cli;
mod report;

use cli::{Cli, Commands, ConfigCommands};

/// Load configuration from the given file, or from environment and defaults.
///
/// Runs before logging is initialised, so failures surface through the
/// returned error rather than through `tracing`.
fn load_config(config_path: Option<&PathBuf>) -> Result<KvloadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!("Configuration file not found: {:?}", path));
            }
            info!("Loading configuration from: {:?}", path);
            loader
                .from_file(path)
                .context(format!("Failed to load configuration from {:?}", path))
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(_config) => {
            println!("{}", "✓ Configuration file is valid".green().bold());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗ Configuration validation failed:".red().bold(), e);
            Err(e.into())
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, KvloadConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✓ Configuration generated at: {:?}", output);
    println!(
        "Validate with: kvload config validate --config-file {:?}",
        output
    );
    Ok(())
}

async fn run_benchmark(cli: &Cli, config: &KvloadConfig) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config);
    let address = orchestrator.connection_config().address();

    info!("Testing connection to {}", address);
    if let Err(e) = orchestrator.probe().await {
        eprintln!(
            "{} cannot reach {}: {}",
            "✗ Connection failed:".red().bold(),
            address,
            e
        );
        eprintln!("Make sure the server is running");
        return Err(anyhow::anyhow!("Connectivity probe failed: {}", e));
    }
    info!("Connection to {} OK", address);

    let params = RunParameters::from_config(config);

    if cli.scalability {
        let counts = config
            .sweep
            .resolve_client_counts(config.benchmark.ops_per_client);
        let sweep = ScalabilitySweep::new(orchestrator);
        let result = sweep
            .run(
                &counts,
                params.ops_per_client,
                params.workload.clone(),
                params.key_range,
            )
            .await?;

        let mut out = io::stdout().lock();
        if cli.json {
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        } else {
            for point in &result.points {
                report::write_run_header(
                    &mut out,
                    &format!(
                        "{} ({} clients)",
                        params.workload.description(),
                        point.num_clients
                    ),
                    point.num_clients,
                    point.ops_per_client,
                    &address,
                )?;
                report::write_report(&mut out, point)?;
            }
            if result.points.len() > 1 || !result.skipped.is_empty() {
                report::write_sweep_summary(&mut out, &result)?;
            }
        }
        return Ok(());
    }

    let report = orchestrator.run(&params).await?;
    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        report::write_run_header(
            &mut out,
            params.workload.description(),
            params.num_clients,
            params.ops_per_client,
            &address,
        )?;
        report::write_report(&mut out, &report)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { config_cmd }) = &cli.command {
        kvload_logging::init_simple_tracing(
            &cli.log_level.map(|l| l.to_string()).unwrap_or_else(|| "warn".to_string()),
        )?;
        return match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
        };
    }

    let mut config = load_config(cli.config.as_ref())?;
    cli.apply_overrides(&mut config);
    config
        .validate_all()
        .context("Invalid configuration after applying command line flags")?;

    init_logging_from_config(&config.logging)?;
    info!("kvload starting");

    if let Err(e) = run_benchmark(&cli, &config).await {
        error!("Benchmark failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
