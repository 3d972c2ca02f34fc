//! Target service configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the key-value service lives and how long to wait for it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Service host name or address
    #[serde(default = "default_host")]
    pub host: String,

    /// Service TCP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum time to establish a session
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Maximum time to wait for one response line
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl TargetConfig {
    /// `host:port` form used in log lines and error messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.host, "host", self.domain_name())?;
        validate_positive(self.port, "port", self.domain_name())?;

        if self.connect_timeout.is_zero() {
            return Err(self.validation_error("connect_timeout must be greater than 0"));
        }

        if self.request_timeout.is_zero() {
            return Err(self.validation_error("request_timeout must be greater than 0"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TargetConfig::default();
        assert_eq!(config.address(), "localhost:8080");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = TargetConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_humantime_durations() {
        let config: TargetConfig =
            serde_yaml::from_str("connect_timeout: 250ms\nrequest_timeout: 2s\n").unwrap();
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.host, "localhost");
    }
}
