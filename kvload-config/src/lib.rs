//! Domain-driven configuration management for kvload
//!
//! Configuration is split by functional domain (target service, benchmark
//! run, scalability sweep, logging), with validation, defaults and
//! environment variable overrides.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    benchmark::{BenchmarkConfig, WarmupConfig, WorkloadKind},
    logging::{LogFormat, LogLevel, LoggingConfig},
    sweep::SweepConfig,
    target::TargetConfig,
    KvloadConfig,
};
