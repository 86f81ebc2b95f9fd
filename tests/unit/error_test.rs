//! Tests for error types

use service_poller::core::{
    ConfigError, FetchError, ParseError, SchedulerError, TaskError, WriteError,
};

#[test]
fn test_bad_status_error() {
    let err = FetchError::BadStatus(503);
    assert_eq!(format!("{}", err), "unexpected status code 503");
}

#[test]
fn test_task_error_wraps_each_step() {
    let err: TaskError = FetchError::Network("connection refused".into()).into();
    assert_eq!(format!("{}", err), "fetch failed: network error: connection refused");

    let err: TaskError = ParseError::MalformedJson("expected value".into()).into();
    assert_eq!(format!("{}", err), "parse failed: malformed json: expected value");

    let err: TaskError = WriteError::SinkUnavailable("sink is closed".into()).into();
    assert_eq!(format!("{}", err), "write failed: sink unavailable: sink is closed");
}

#[test]
fn test_config_errors() {
    assert_eq!(format!("{}", ConfigError::EmptyCatalog), "service catalog is empty");
    assert_eq!(
        format!("{}", ConfigError::DuplicateService("alpha".into())),
        "duplicate service name `alpha`"
    );
    assert_eq!(format!("{}", ConfigError::NoServicesSelected), "no services selected");
}

#[test]
fn test_scheduler_errors() {
    assert_eq!(
        format!("{}", SchedulerError::InvalidWorkerCount(0)),
        "invalid worker count: 0"
    );
    assert_eq!(format!("{}", SchedulerError::QueueFull), "task queue is full");
    assert_eq!(
        format!("{}", SchedulerError::PoolShutdown),
        "worker pool has been shut down"
    );
}

#[test]
fn test_config_error_converts_to_anyhow() {
    let err: anyhow::Error = ConfigError::NoServicesSelected.into();
    assert!(err.downcast_ref::<ConfigError>().is_some());
}
