//! Domain-specific configuration modules

pub mod benchmark;
pub mod logging;
pub mod sweep;
pub mod target;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main kvload configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KvloadConfig {
    /// Key-value service endpoint and timeouts
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Single-run benchmark parameters
    #[serde(default)]
    pub benchmark: benchmark::BenchmarkConfig,

    /// Scalability sweep parameters
    #[serde(default)]
    pub sweep: sweep::SweepConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl KvloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.benchmark.validate()?;
        self.sweep.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = KvloadConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
