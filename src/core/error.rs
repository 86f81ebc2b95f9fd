//! Error types for the poller.
//!
//! Configuration and scheduler errors are fatal at startup. Fetch, parse and
//! write errors belong to a single firing of a single service and never leave
//! the task that produced them.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors detected before any firing is scheduled.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A startup argument is missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The service catalog could not be read.
    #[error("failed to read service catalog {path}: {source}")]
    CatalogUnreadable {
        /// Catalog path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The service catalog is not a JSON array of service records.
    #[error("malformed service catalog: {0}")]
    CatalogMalformed(#[from] serde_json::Error),
    /// The service catalog contains no services.
    #[error("service catalog is empty")]
    EmptyCatalog,
    /// A catalog entry has an empty name.
    #[error("service at position {0} has an empty name")]
    EmptyServiceName(usize),
    /// Two catalog entries share a name.
    #[error("duplicate service name `{0}`")]
    DuplicateService(String),
    /// A catalog entry has a url that is not an absolute http(s) URI.
    #[error("service `{name}` has invalid url `{url}`: {reason}")]
    InvalidUrl {
        /// Service name.
        name: String,
        /// Offending url.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// None of the requested services exist in the catalog.
    #[error("no services selected")]
    NoServicesSelected,
    /// The output sink could not be opened.
    #[error("failed to open output {path}: {source}")]
    OutputUnavailable {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure to obtain a response body from a service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with a non-2xx status.
    #[error("unexpected status code {0}")]
    BadStatus(u16),
}

/// Failure to interpret a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The body is not syntactically valid JSON.
    #[error("malformed json: {0}")]
    MalformedJson(String),
}

/// Failure to append a record to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The sink is closed or the underlying stream rejected the write.
    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),
}

/// Any failure that ends a single service task early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Fetch step failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    /// Parse step failed.
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    /// Write step failed.
    #[error("write failed: {0}")]
    Write(#[from] WriteError),
}

/// Errors produced by the scheduler and its worker pool.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Worker count must be positive.
    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(usize),
    /// Poll interval must be positive.
    #[error("poll interval must be greater than zero")]
    InvalidInterval,
    /// Pool configuration rejected.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
    /// The pool no longer accepts submissions.
    #[error("worker pool has been shut down")]
    PoolShutdown,
    /// The pool queue is full.
    #[error("task queue is full")]
    QueueFull,
    /// A worker or dispatcher thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
