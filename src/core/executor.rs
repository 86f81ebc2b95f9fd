//! Task execution trait and per-firing metadata.

use std::time::Instant;

use async_trait::async_trait;

/// Identifier assigned to every firing submitted to the pool.
pub type TaskId = u64;

/// Metadata describing one firing of a service timeline.
#[derive(Debug, Clone, Copy)]
pub struct TaskMetadata {
    /// Unique, monotonically increasing firing identifier.
    pub id: TaskId,
    /// Zero-based ordinal of this firing within its service timeline.
    pub tick: u64,
    /// Instant the firing became due.
    pub due_at: Instant,
    /// Instant a worker began executing the firing. Equal to `due_at` until
    /// the worker picks it up.
    pub started_at: Instant,
}

/// Executor trait for worker pools.
///
/// The pool clones the executor once per worker thread and calls `execute`
/// from that thread's single-threaded tokio runtime. Executors own their
/// failure handling: there is no return value, so nothing a task does can
/// reach the code that submitted it.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use service_poller::core::{TaskMetadata, WorkerExecutor};
///
/// #[derive(Clone)]
/// struct Echo;
///
/// #[async_trait]
/// impl WorkerExecutor<String> for Echo {
///     async fn execute(&self, payload: String, meta: TaskMetadata) {
///         tracing::info!(tick = meta.tick, "{payload}");
///     }
/// }
/// ```
#[async_trait]
pub trait WorkerExecutor<P>: Send + Sync + Clone + 'static
where
    P: Send + 'static,
{
    /// Execute a task payload to completion.
    async fn execute(&self, payload: P, meta: TaskMetadata);
}
