//! Bounded worker pool backed by dedicated OS threads.
//!
//! Each worker owns a single-threaded tokio runtime and pulls firings from a
//! shared FIFO channel, so at most `worker_count` tasks run at any moment and
//! queued firings start in submission order.
//!
//! # Design Principles
//!
//! - **No polling**: Workers block on channel recv
//! - **Failure isolation**: A panicking task is caught, counted and logged; the worker keeps serving
//! - **Clean shutdown**: Closing the pool discards queued firings, dropping the sender unblocks idle workers

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::WorkerPoolConfig;
use crate::core::executor::{TaskMetadata, WorkerExecutor};
use crate::core::SchedulerError;

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,

    /// Currently executing tasks.
    pub active_tasks: u64,

    /// Tasks waiting in the queue.
    pub queued_tasks: u64,

    /// Total tasks accepted by `submit`.
    pub submitted_tasks: u64,

    /// Total tasks that ran to completion.
    pub completed_tasks: u64,

    /// Total tasks that panicked.
    pub panicked_tasks: u64,

    /// Queued tasks thrown away because the pool was closed before they started.
    pub discarded_tasks: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub active_tasks: AtomicU64,
    pub queued_tasks: AtomicU64,
    pub submitted_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub panicked_tasks: AtomicU64,
    pub discarded_tasks: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize) -> PoolStats {
        PoolStats {
            worker_count,
            active_tasks: self.active_tasks.load(Ordering::Relaxed),
            queued_tasks: self.queued_tasks.load(Ordering::Relaxed),
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            panicked_tasks: self.panicked_tasks.load(Ordering::Relaxed),
            discarded_tasks: self.discarded_tasks.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of joining the worker threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that exited within the grace period.
    pub joined: usize,
    /// Workers whose thread panicked outside a task.
    pub panicked: usize,
    /// Workers still busy when the grace period ran out; left detached.
    pub detached: usize,
}

/// A task submitted to the worker pool.
#[derive(Debug)]
struct WorkerTask<P> {
    payload: P,
    meta: TaskMetadata,
}

/// Worker pool with dedicated OS threads.
pub struct WorkerPool<P, E>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    /// Number of worker threads spawned.
    worker_count: usize,

    /// Task sender (to workers). Option allows clean shutdown by dropping.
    task_tx: Mutex<Option<Sender<WorkerTask<P>>>>,

    /// Pool statistics counters.
    counters: Arc<PoolCounters>,

    /// Set once the pool stops admitting work.
    shutdown: Arc<AtomicBool>,

    /// Worker thread handles.
    workers: Mutex<Vec<JoinHandle<()>>>,

    _executor: std::marker::PhantomData<E>,
}

impl<P, E> WorkerPool<P, E>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    /// Create a new worker pool with the given configuration and executor.
    ///
    /// This spawns `config.worker_count` OS threads, each with its own
    /// single-threaded tokio runtime and its own clone of `executor`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidWorkerCount` or
    /// `SchedulerError::InvalidConfig` for a rejected configuration, and
    /// `SchedulerError::Spawn` if a thread cannot be created.
    pub fn new(config: &WorkerPoolConfig, executor: E) -> Result<Self, SchedulerError> {
        if config.worker_count == 0 {
            return Err(SchedulerError::InvalidWorkerCount(0));
        }
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let (task_tx, task_rx) = bounded::<WorkerTask<P>>(config.max_queue_depth);
        let counters = Arc::new(PoolCounters::default());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            let spawned = spawn_worker(
                worker_id,
                task_rx.clone(),
                Arc::clone(&counters),
                Arc::clone(&shutdown),
                executor.clone(),
                config.thread_stack_size,
            );
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Release the workers that did start before bailing out.
                    shutdown.store(true, Ordering::Release);
                    drop(task_tx);
                    return Err(SchedulerError::Spawn(e));
                }
            }
        }

        info!(
            worker_count = config.worker_count,
            max_queue_depth = config.max_queue_depth,
            "WorkerPool initialized with dedicated OS threads"
        );

        Ok(Self {
            worker_count: config.worker_count,
            task_tx: Mutex::new(Some(task_tx)),
            counters,
            shutdown,
            workers: Mutex::new(workers),
            _executor: std::marker::PhantomData,
        })
    }

    /// Enqueue a task. Never blocks.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::QueueFull` if the task queue is full
    /// - `SchedulerError::PoolShutdown` if the pool has been closed
    pub fn submit(&self, payload: P, meta: TaskMetadata) -> Result<(), SchedulerError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::PoolShutdown);
        }

        let task_tx_guard = self.task_tx.lock();
        let Some(task_tx) = task_tx_guard.as_ref() else {
            return Err(SchedulerError::PoolShutdown);
        };

        // Count before sending so a fast worker never decrements below zero.
        self.counters.queued_tasks.fetch_add(1, Ordering::Relaxed);
        match task_tx.try_send(WorkerTask { payload, meta }) {
            Ok(()) => {
                self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
                debug!(task_id = meta.id, tick = meta.tick, "Task submitted to worker pool");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                warn!(task_id = meta.id, "Worker pool queue is full");
                Err(SchedulerError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                self.counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                Err(SchedulerError::PoolShutdown)
            }
        }
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.worker_count)
    }

    /// Whether the pool has stopped admitting work.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Stop admitting work.
    ///
    /// Tasks already running continue; queued tasks are discarded by the
    /// workers instead of being started.
    pub fn close(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            debug!("Worker pool closed to new submissions");
        }
        // Drop the sender to unblock all workers waiting on recv()
        self.task_tx.lock().take();
    }

    /// Close the pool and wait up to `grace` for every worker to exit.
    ///
    /// Workers that don't exit within the grace period are detached so the
    /// caller never hangs.
    pub fn shutdown(&self, grace: Duration) -> ShutdownReport {
        self.close();
        info!(grace_ms = grace.as_millis(), "Shutting down worker pool");

        // A grace period past the representable range waits without a deadline.
        let deadline = Instant::now().checked_add(grace);
        let mut report = ShutdownReport::default();
        let workers: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();

        for (idx, worker) in workers.into_iter().enumerate() {
            if worker.is_finished() {
                record_join(idx, worker.join().is_ok(), &mut report);
                continue;
            }

            // Join through a helper thread so the wait can time out.
            let (tx, rx) = bounded(1);
            let joiner = thread::Builder::new()
                .name(format!("poller-join-{idx}"))
                .spawn(move || {
                    let _ = tx.send(worker.join().is_ok());
                });
            if let Err(e) = joiner {
                warn!(worker_id = idx, error = %e, "Could not spawn join helper - detaching worker");
                report.detached += 1;
                continue;
            }

            let joined = match deadline {
                Some(deadline) => rx.recv_deadline(deadline).ok(),
                None => rx.recv().ok(),
            };
            match joined {
                Some(ok) => record_join(idx, ok, &mut report),
                None => {
                    warn!(worker_id = idx, "Worker did not exit within grace period - detaching");
                    report.detached += 1;
                }
            }
        }

        info!(
            joined = report.joined,
            panicked = report.panicked,
            detached = report.detached,
            "Worker pool shut down complete"
        );
        report
    }
}

fn record_join(worker_id: usize, ok: bool, report: &mut ShutdownReport) {
    if ok {
        debug!(worker_id = worker_id, "Worker joined successfully");
        report.joined += 1;
    } else {
        warn!(worker_id = worker_id, "Worker panicked");
        report.panicked += 1;
    }
}

impl<P, E> Drop for WorkerPool<P, E>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    fn drop(&mut self) {
        // Signal shutdown but don't join; explicit shutdown() waits for workers.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.task_tx.lock().take();
            debug!("WorkerPool dropped without explicit shutdown - workers will be detached");
        }
    }
}

/// Spawn a worker thread.
fn spawn_worker<P, E>(
    worker_id: usize,
    task_rx: Receiver<WorkerTask<P>>,
    counters: Arc<PoolCounters>,
    shutdown: Arc<AtomicBool>,
    executor: E,
    stack_size: usize,
) -> std::io::Result<JoinHandle<()>>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    thread::Builder::new()
        .name(format!("poller-worker-{worker_id}"))
        .stack_size(stack_size)
        .spawn(move || {
            debug!(worker_id = worker_id, "Worker thread started");

            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(worker_id = worker_id, error = %e, "Failed to create worker runtime");
                    return;
                }
            };

            // When the sender is dropped, recv drains what is left and then errors.
            while let Ok(mut task) = task_rx.recv() {
                counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);

                if shutdown.load(Ordering::Acquire) {
                    counters.discarded_tasks.fetch_add(1, Ordering::Relaxed);
                    debug!(worker_id = worker_id, task_id = task.meta.id, "Discarding task queued before shutdown");
                    continue;
                }

                counters.active_tasks.fetch_add(1, Ordering::Relaxed);
                task.meta.started_at = Instant::now();
                let task_id = task.meta.id;
                debug!(worker_id = worker_id, task_id = task_id, "Worker executing task");

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    rt.block_on(executor.execute(task.payload, task.meta));
                }));

                counters.active_tasks.fetch_sub(1, Ordering::Relaxed);
                if outcome.is_ok() {
                    counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
                    debug!(worker_id = worker_id, task_id = task_id, "Worker completed task");
                } else {
                    counters.panicked_tasks.fetch_add(1, Ordering::Relaxed);
                    error!(worker_id = worker_id, task_id = task_id, "Task panicked; worker continues");
                }
            }

            debug!(worker_id = worker_id, "Worker thread exiting");
        })
}
