//! Scalability sweep configuration

use crate::error::ConfigResult;
use crate::validation::{validate_ascending, Validatable};
use serde::{Deserialize, Serialize};

/// Client counts visited by a scalability sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Explicit ascending client counts; derived from the operation count when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_counts: Option<Vec<usize>>,
}

impl SweepConfig {
    /// Counts used when none are configured
    pub fn default_client_counts(ops_per_client: usize) -> Vec<usize> {
        if ops_per_client > 1000 {
            vec![1, 5, 10, 20]
        } else {
            vec![1, 5, 10, 20, 50, 100]
        }
    }

    /// Configured counts, falling back to the defaults for `ops_per_client`
    pub fn resolve_client_counts(&self, ops_per_client: usize) -> Vec<usize> {
        self.client_counts
            .clone()
            .unwrap_or_else(|| Self::default_client_counts(ops_per_client))
    }
}

impl Validatable for SweepConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(ref counts) = self.client_counts {
            validate_ascending(counts, "client_counts", self.domain_name())?;
            if counts.contains(&0) {
                return Err(self.validation_error("client_counts cannot contain 0"));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sweep"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counts_shrink_for_long_runs() {
        assert_eq!(SweepConfig::default_client_counts(200), vec![1, 5, 10, 20, 50, 100]);
        assert_eq!(SweepConfig::default_client_counts(5000), vec![1, 5, 10, 20]);
    }

    #[test]
    fn test_explicit_counts_win() {
        let config = SweepConfig {
            client_counts: Some(vec![2, 4]),
        };
        assert_eq!(config.resolve_client_counts(10), vec![2, 4]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_count_rejected() {
        let config = SweepConfig {
            client_counts: Some(vec![0, 4]),
        };
        assert!(config.validate().is_err());
    }
}
