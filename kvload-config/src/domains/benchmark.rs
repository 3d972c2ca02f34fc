//! Benchmark run configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parameters of a single multi-client run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Number of simulated clients
    #[serde(default = "default_clients")]
    pub clients: usize,

    /// Operations issued by each client
    #[serde(default = "default_ops_per_client")]
    pub ops_per_client: usize,

    /// Operation mix
    #[serde(default)]
    pub workload: WorkloadKind,

    /// Number of distinct keys per client
    #[serde(default = "default_key_range")]
    pub key_range: usize,

    /// Warmup phase bounds
    #[serde(default)]
    pub warmup: WarmupConfig,
}

/// Bounds of the throwaway warmup phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    /// How many connected clients take part in warmup
    pub max_clients: usize,

    /// Upper bound on warmup operations per client
    pub max_ops: usize,

    /// Warmup never exceeds `ops_per_client / ops_divisor` operations
    pub ops_divisor: usize,
}

/// Named operation mixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// 9 reads per write
    #[serde(alias = "read")]
    ReadHeavy,
    /// 9 writes per read
    #[serde(alias = "write")]
    WriteHeavy,
    /// Alternating write/read
    #[default]
    Balanced,
    /// 6 reads, 3 writes, 1 delete
    Mixed,
    /// 80% of traffic on five hot keys
    #[serde(alias = "hot")]
    HotKey,
}

impl WorkloadKind {
    /// Every known workload, in display order
    pub const ALL: [WorkloadKind; 5] = [
        WorkloadKind::ReadHeavy,
        WorkloadKind::WriteHeavy,
        WorkloadKind::Balanced,
        WorkloadKind::Mixed,
        WorkloadKind::HotKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::ReadHeavy => "read-heavy",
            WorkloadKind::WriteHeavy => "write-heavy",
            WorkloadKind::Balanced => "balanced",
            WorkloadKind::Mixed => "mixed",
            WorkloadKind::HotKey => "hot-key",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" | "read-heavy" | "read_heavy" => Ok(WorkloadKind::ReadHeavy),
            "write" | "write-heavy" | "write_heavy" => Ok(WorkloadKind::WriteHeavy),
            "balanced" => Ok(WorkloadKind::Balanced),
            "mixed" => Ok(WorkloadKind::Mixed),
            "hot" | "hot-key" | "hot_key" => Ok(WorkloadKind::HotKey),
            _ => Err(format!("Invalid workload: {}", s)),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            clients: default_clients(),
            ops_per_client: default_ops_per_client(),
            workload: WorkloadKind::default(),
            key_range: default_key_range(),
            warmup: WarmupConfig::default(),
        }
    }
}

/// Warmup may be reduced from these limits but never extended past them
const WARMUP_MAX_CLIENTS: usize = 5;
const WARMUP_MAX_OPS: usize = 10;
const WARMUP_MIN_OPS_DIVISOR: usize = 10;

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            max_clients: WARMUP_MAX_CLIENTS,
            max_ops: WARMUP_MAX_OPS,
            ops_divisor: WARMUP_MIN_OPS_DIVISOR,
        }
    }
}

impl WarmupConfig {
    /// Warmup operations each participating client performs
    pub fn ops_for(&self, ops_per_client: usize) -> usize {
        self.max_ops.min(ops_per_client / self.ops_divisor.max(1))
    }
}

impl Validatable for BenchmarkConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.clients, "clients", self.domain_name())?;
        validate_positive(self.ops_per_client, "ops_per_client", self.domain_name())?;
        validate_positive(self.key_range, "key_range", self.domain_name())?;
        self.warmup.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "benchmark"
    }
}

impl Validatable for WarmupConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_clients > WARMUP_MAX_CLIENTS {
            return Err(self.validation_error(format!(
                "max_clients cannot exceed {}, got {}",
                WARMUP_MAX_CLIENTS, self.max_clients
            )));
        }
        if self.max_ops > WARMUP_MAX_OPS {
            return Err(self.validation_error(format!(
                "max_ops cannot exceed {}, got {}",
                WARMUP_MAX_OPS, self.max_ops
            )));
        }
        if self.ops_divisor < WARMUP_MIN_OPS_DIVISOR {
            return Err(self.validation_error(format!(
                "ops_divisor must be at least {}, got {}",
                WARMUP_MIN_OPS_DIVISOR, self.ops_divisor
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "benchmark.warmup"
    }
}

fn default_clients() -> usize {
    10
}

fn default_ops_per_client() -> usize {
    1000
}

fn default_key_range() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_workload_from_str_aliases() {
        assert_eq!("read".parse::<WorkloadKind>().unwrap(), WorkloadKind::ReadHeavy);
        assert_eq!("WRITE-HEAVY".parse::<WorkloadKind>().unwrap(), WorkloadKind::WriteHeavy);
        assert_eq!("hot".parse::<WorkloadKind>().unwrap(), WorkloadKind::HotKey);
        assert!("random".parse::<WorkloadKind>().is_err());
    }

    #[test]
    fn test_workload_display_round_trips_through_from_str() {
        for kind in WorkloadKind::ALL {
            assert_eq!(kind.to_string().parse::<WorkloadKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_warmup_ops_bounds() {
        let warmup = WarmupConfig::default();
        assert_eq!(warmup.ops_for(1000), 10);
        assert_eq!(warmup.ops_for(50), 5);
        assert_eq!(warmup.ops_for(4), 0);
    }

    #[test]
    fn test_warmup_can_be_reduced() {
        let warmup = WarmupConfig {
            max_clients: 0,
            max_ops: 2,
            ops_divisor: 50,
        };
        assert!(warmup.validate().is_ok());
    }

    #[test]
    fn test_warmup_max_clients_bounded() {
        let warmup = WarmupConfig {
            max_clients: 6,
            ..Default::default()
        };
        match warmup.validate() {
            Err(ConfigError::DomainError { domain, message }) => {
                assert_eq!(domain, "benchmark.warmup");
                assert!(message.contains("max_clients"));
            }
            other => panic!("expected a domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_warmup_max_ops_bounded() {
        let warmup = WarmupConfig {
            max_ops: 11,
            ..Default::default()
        };
        let err = warmup.validate().unwrap_err();
        assert!(err.to_string().contains("max_ops"));
    }

    #[test]
    fn test_warmup_divisor_floor() {
        let warmup = WarmupConfig {
            ops_divisor: 9,
            ..Default::default()
        };
        let err = warmup.validate().unwrap_err();
        assert!(err.to_string().contains("ops_divisor"));

        let config = BenchmarkConfig {
            warmup,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ops_rejected() {
        let config = BenchmarkConfig {
            ops_per_client: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
