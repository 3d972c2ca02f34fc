//! Configuration loading and environment variable handling

use crate::domains::KvloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "KVLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<KvloadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: KvloadConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<KvloadConfig> {
        let mut config = KvloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<KvloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut KvloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_benchmark_overrides(&mut config.benchmark)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(host) = self.get_env_var("HOST") {
            config.host = host;
        }

        if let Some(port) = self.parse_env_var("PORT")? {
            config.port = port;
        }

        if let Some(timeout) = self.duration_env_var("CONNECT_TIMEOUT")? {
            config.connect_timeout = timeout;
        }

        if let Some(timeout) = self.duration_env_var("REQUEST_TIMEOUT")? {
            config.request_timeout = timeout;
        }

        Ok(())
    }

    fn apply_benchmark_overrides(
        &self,
        config: &mut crate::domains::benchmark::BenchmarkConfig,
    ) -> ConfigResult<()> {
        if let Some(clients) = self.parse_env_var("CLIENTS")? {
            config.clients = clients;
        }

        if let Some(ops) = self.parse_env_var("OPS")? {
            config.ops_per_client = ops;
        }

        if let Some(workload) = self.parse_env_var("WORKLOAD")? {
            config.workload = workload;
        }

        if let Some(key_range) = self.parse_env_var("KEY_RANGE")? {
            config.key_range = key_range;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Some(level) = self.parse_env_var("LOG_LEVEL")? {
            config.level = level;
        }

        if let Some(format) = self.parse_env_var("LOG_FORMAT")? {
            config.format = format;
        }

        Ok(())
    }

    /// Parse an optional prefixed variable with `FromStr`
    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => {
                debug!("Applying {}_{} override", self.prefix, name);
                raw.parse::<T>().map(Some).map_err(|e| {
                    ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))
                })
            }
            Err(_) => Ok(None),
        }
    }

    /// Parse an optional humantime duration such as `5s` or `250ms`
    fn duration_env_var(&self, name: &str) -> ConfigResult<Option<Duration>> {
        match self.get_env_var(name) {
            Ok(raw) => humantime_serde::re::humantime::parse_duration(&raw)
                .map(Some)
                .map_err(|e| {
                    ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))
                }),
            Err(_) => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
