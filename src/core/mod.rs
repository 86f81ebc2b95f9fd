//! Core polling engine: scheduling, execution and failure reporting.

pub mod error;
pub mod executor;
pub mod record;
pub mod report;
pub mod scheduler;
pub mod task;
pub mod worker_pool;

pub use error::{
    AppResult, ConfigError, FetchError, ParseError, SchedulerError, TaskError, WriteError,
};
pub use executor::{TaskId, TaskMetadata, WorkerExecutor};
pub use record::ResponseRecord;
pub use report::{InMemoryReporter, OutcomeReporter, PollOutcome, TaskReport, TracingReporter};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle, SchedulerState, StopReport};
pub use task::ServiceTask;
pub use worker_pool::{PoolStats, ShutdownReport, WorkerPool};
