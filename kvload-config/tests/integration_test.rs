//! Integration tests for kvload-config

use kvload_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

/// Variables the file-based tests must not inherit from a concurrently running test
fn cleared_overrides() -> Vec<(&'static str, Option<&'static str>)> {
    [
        "KVLOAD_HOST",
        "KVLOAD_PORT",
        "KVLOAD_REQUEST_TIMEOUT",
        "KVLOAD_CLIENTS",
        "KVLOAD_WORKLOAD",
        "KVLOAD_LOG_LEVEL",
    ]
    .into_iter()
    .map(|name| (name, None))
    .collect()
}

#[test]
fn test_default_config_validation() {
    let config = KvloadConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("KVLOAD_HOST", Some("10.0.0.7")),
        ("KVLOAD_PORT", Some("9090")),
        ("KVLOAD_REQUEST_TIMEOUT", Some("750ms")),
        ("KVLOAD_CLIENTS", Some("25")),
        ("KVLOAD_WORKLOAD", Some("mixed")),
        ("KVLOAD_LOG_LEVEL", Some("debug")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::new();
        let config = loader.from_env().unwrap();

        assert_eq!(config.target.address(), "10.0.0.7:9090");
        assert_eq!(config.target.request_timeout, Duration::from_millis(750));
        assert_eq!(config.benchmark.clients, 25);
        assert_eq!(config.benchmark.workload, WorkloadKind::Mixed);
        assert_eq!(config.logging.level, LogLevel::Debug);
    });
}

#[test]
fn test_invalid_env_value_is_reported() {
    with_vars(vec![("KVLOAD_PORT", Some("not-a-port"))], || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("BENCH_OPS", Some("42"))], || {
        let config = ConfigLoader::with_prefix("BENCH").from_env().unwrap();
        assert_eq!(config.benchmark.ops_per_client, 42);
    });
}

#[test]
fn test_yaml_config_serialization() {
    let yaml = KvloadConfig::generate_sample();
    let parsed: KvloadConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
    assert_eq!(parsed.benchmark.workload, WorkloadKind::Balanced);
}

#[test]
fn test_comprehensive_config_file() {
    let yaml = r#"
target:
  host: kv.internal
  port: 7000
  connect_timeout: 2s
  request_timeout: 10s

benchmark:
  clients: 20
  ops_per_client: 500
  workload: write
  key_range: 50
  warmup:
    max_clients: 2
    max_ops: 4
    ops_divisor: 10

sweep:
  client_counts: [1, 5, 10]

logging:
  level: warn
  format: json
"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    with_vars(cleared_overrides(), || {
        let config = ConfigLoader::new().from_file(file.path()).unwrap();
        assert_eq!(config.target.host, "kv.internal");
        assert_eq!(config.target.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.benchmark.workload, WorkloadKind::WriteHeavy);
        assert_eq!(config.benchmark.warmup.max_clients, 2);
        assert_eq!(config.sweep.resolve_client_counts(500), vec![1, 5, 10]);
        assert_eq!(config.logging.format, LogFormat::Json);
    });
}

#[test]
fn test_descending_sweep_rejected_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"sweep:\n  client_counts: [10, 5]\n").unwrap();

    with_vars(cleared_overrides(), || {
        let result = ConfigLoader::new().from_file(file.path());
        assert!(matches!(result, Err(ConfigError::DomainError { .. })));
    });
}

#[test]
fn test_missing_file_is_read_error() {
    let result = ConfigLoader::new().from_file("/nonexistent/kvload.yaml");
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));
}
