//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate that a sequence is non-empty and strictly ascending
pub fn validate_ascending(values: &[usize], field_name: &str, domain: &str) -> ConfigResult<()> {
    if values.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }

    if values.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be strictly ascending, got {:?}", field_name, values),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1u64, "port", "target").is_ok());
        assert!(validate_positive(0u64, "port", "target").is_err());
    }

    #[test]
    fn test_validate_required_string() {
        assert!(validate_required_string("localhost", "host", "target").is_ok());
        assert!(validate_required_string("  ", "host", "target").is_err());
    }

    #[test]
    fn test_validate_ascending() {
        assert!(validate_ascending(&[1, 5, 10], "client_counts", "sweep").is_ok());
        assert!(validate_ascending(&[], "client_counts", "sweep").is_err());
        assert!(validate_ascending(&[5, 1], "client_counts", "sweep").is_err());
        assert!(validate_ascending(&[1, 1], "client_counts", "sweep").is_err());
    }
}
