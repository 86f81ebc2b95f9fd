//! # Service Poller
//!
//! Polls a set of HTTP services on independent fixed-delay schedules using a
//! bounded worker pool, and appends every successful JSON response as one
//! line to a shared output sink.
//!
//! ## Engine
//!
//! - **`WorkerPool`**: Dedicated OS threads, each with its own single-threaded tokio runtime
//! - **`Scheduler`**: One timeline per service; the next firing is due `interval` after the
//!   previous one started, never while it is still running
//! - **`ServiceTask`**: fetch → parse → append, every failure reported and contained
//! - **`SinkWriter`**: Mutex-guarded newline-delimited JSON output
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use service_poller::config::ServiceDescriptor;
//! use service_poller::core::{Scheduler, SchedulerConfig, ServiceTask, TracingReporter};
//! use service_poller::infra::{HttpFetcher, SinkWriter};
//!
//! let sink = Arc::new(SinkWriter::new(std::io::stdout()));
//! let task = ServiceTask::new(HttpFetcher::new(Duration::from_secs(5))?, sink, Arc::new(TracingReporter));
//! let scheduler = Scheduler::new(SchedulerConfig::new(4, Duration::from_secs(10)), task)?;
//! let handle = scheduler.start(vec![ServiceDescriptor::new("status", "https://example.com/status.json")])?;
//! // ...
//! handle.stop();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling, execution and reporting.
pub mod core;
/// Configuration models for the poller, pool and service catalog.
pub mod config;
/// Builders to construct a poller from configuration.
pub mod builders;
/// Infrastructure adapters for HTTP and the output sink.
pub mod infra;
/// Stop signals and the blocking run loop.
pub mod runtime;
/// Command-line interface.
pub mod cli;
/// Shared utilities.
pub mod util;
