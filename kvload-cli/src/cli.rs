//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use kvload_config::{KvloadConfig, LogLevel, WorkloadKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Server host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Number of concurrent clients
    #[arg(long, value_name = "N")]
    pub clients: Option<usize>,

    /// Operations per client
    #[arg(long, value_name = "N")]
    pub ops: Option<usize>,

    /// Workload type: read, write, balanced, mixed, hot
    #[arg(long, value_name = "TYPE")]
    pub workload: Option<WorkloadKind>,

    /// Number of distinct keys per client
    #[arg(long, value_name = "N")]
    pub key_range: Option<usize>,

    /// Run the test at several client counts and print a scaling summary
    #[arg(long)]
    pub scalability: bool,

    /// Client counts for --scalability (example: --client-counts 1,5,10)
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub client_counts: Option<Vec<usize>>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Flags given on the command line take precedence over file and environment
    pub fn apply_overrides(&self, config: &mut KvloadConfig) {
        if let Some(ref host) = self.host {
            config.target.host = host.clone();
        }
        if let Some(port) = self.port {
            config.target.port = port;
        }
        if let Some(clients) = self.clients {
            config.benchmark.clients = clients;
        }
        if let Some(ops) = self.ops {
            config.benchmark.ops_per_client = ops;
        }
        if let Some(workload) = self.workload {
            config.benchmark.workload = workload;
        }
        if let Some(key_range) = self.key_range {
            config.benchmark.key_range = key_range;
        }
        if let Some(ref counts) = self.client_counts {
            config.sweep.client_counts = Some(counts.clone());
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file with the defaults
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
