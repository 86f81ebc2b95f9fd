//! Tests for configuration validation

use std::path::PathBuf;
use std::time::Duration;

use service_poller::config::{OutputTarget, PollerConfig, WorkerPoolConfig};
use service_poller::core::ConfigError;

#[test]
fn test_poller_config_defaults_are_valid() {
    let cfg = PollerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.worker_count, 5);
    assert_eq!(cfg.interval(), Duration::from_secs(10));
    assert_eq!(cfg.catalog, PathBuf::from("services.json"));
    assert!(cfg.services.is_empty());
}

#[test]
fn test_poller_config_invalid_worker_count() {
    let cfg = PollerConfig {
        worker_count: 0,
        ..PollerConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidArgument(ref msg) if msg.contains("worker_count")));
}

#[test]
fn test_poller_config_invalid_interval() {
    let cfg = PollerConfig {
        interval_secs: 0,
        ..PollerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_poller_config_invalid_timeouts() {
    let cfg = PollerConfig {
        request_timeout_secs: 0,
        ..PollerConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = PollerConfig {
        shutdown_grace_secs: 0,
        ..PollerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_poller_config_empty_output_rejected() {
    let cfg = PollerConfig {
        output: PathBuf::new(),
        ..PollerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_poller_config_partial_json() {
    let cfg = PollerConfig::from_json_str(r#"{"worker_count": 2, "services": ["a"]}"#).unwrap();
    assert_eq!(cfg.worker_count, 2);
    assert_eq!(cfg.interval_secs, 10);
    assert_eq!(cfg.services, vec!["a".to_string()]);
}

#[test]
fn test_poller_config_json_rejects_invalid_values() {
    assert!(PollerConfig::from_json_str(r#"{"interval_secs": 0}"#).is_err());
    assert!(PollerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_poller_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("poller.json");
    std::fs::write(&path, r#"{"interval_secs": 3, "output": "-"}"#).unwrap();

    let cfg = PollerConfig::from_file(&path).unwrap();
    assert_eq!(cfg.interval(), Duration::from_secs(3));
    assert_eq!(cfg.output_target(), OutputTarget::Stdout);

    assert!(PollerConfig::from_file(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_worker_pool_config_builder() {
    let cfg = WorkerPoolConfig::new()
        .with_worker_count(3)
        .with_max_queue_depth(7)
        .with_thread_stack_size(1024 * 1024);
    assert_eq!(cfg.worker_count, 3);
    assert_eq!(cfg.max_queue_depth, 7);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_worker_pool_config_invalid_values() {
    assert!(WorkerPoolConfig::new().with_worker_count(0).validate().is_err());
    assert!(WorkerPoolConfig::new().with_max_queue_depth(0).validate().is_err());
}
