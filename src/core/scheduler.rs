//! Periodic scheduler: one fixed-delay timeline per service over one bounded pool.
//!
//! A dispatcher thread owns every timeline. A timeline fires immediately at
//! registration; when a firing finishes on a worker its start instant is sent
//! back, and the next firing of that service becomes due `interval` after
//! that start, or at once if that moment has already passed. A service
//! therefore has at most one firing queued or running, successive starts are
//! at least `interval` apart, and a late firing is delayed rather than
//! dropped. Timelines due at the same instant are submitted in registration
//! order.
//!
//! ```text
//!  dispatcher ──submit──▶ [ FIFO queue ] ──▶ worker 0..k ──▶ executor
//!      ▲                                          │
//!      └──────── started_at, on finish ◀──────────┘
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ServiceDescriptor, WorkerPoolConfig};
use crate::core::executor::{TaskMetadata, WorkerExecutor};
use crate::core::worker_pool::{PoolStats, ShutdownReport, WorkerPool};
use crate::core::SchedulerError;

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Configured, no threads running.
    Created,
    /// Timelines are firing.
    Running,
    /// Stop requested; in-flight firings are draining.
    Stopping,
    /// All workers joined or detached. Terminal.
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of firings executing at once.
    pub worker_count: usize,
    /// Minimum delay between the starts of consecutive firings of one service.
    pub interval: Duration,
    /// Upper bound on how long `stop` waits for in-flight firings.
    pub shutdown_grace: Duration,
}

impl SchedulerConfig {
    /// Create settings with a 10 second shutdown grace period.
    #[must_use]
    pub const fn new(worker_count: usize, interval: Duration) -> Self {
        Self {
            worker_count,
            interval,
            shutdown_grace: Duration::from_secs(10),
        }
    }

    /// Set the shutdown grace period.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Validate settings.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidWorkerCount` or
    /// `SchedulerError::InvalidInterval`.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.worker_count == 0 {
            return Err(SchedulerError::InvalidWorkerCount(self.worker_count));
        }
        if self.interval.is_zero() {
            return Err(SchedulerError::InvalidInterval);
        }
        Ok(())
    }
}

/// What `stop` observed while shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// Worker join results.
    pub shutdown: ShutdownReport,
    /// Pool statistics after the last worker was joined or detached.
    pub stats: PoolStats,
}

/// A scheduler in the `Created` state.
///
/// `start` consumes it, so a scheduler runs at most once; build a new one to
/// poll again.
pub struct Scheduler<E> {
    config: SchedulerConfig,
    executor: E,
}

impl<E> Scheduler<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    /// Validate settings and create a scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` for a zero worker count or interval.
    pub fn new(config: SchedulerConfig, executor: E) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self { config, executor })
    }

    /// Always `SchedulerState::Created`.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        SchedulerState::Created
    }

    /// Scheduler settings.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Spawn the worker pool and the dispatcher and start every timeline.
    ///
    /// Each service fires immediately and then every `interval` measured
    /// from the start of its previous firing.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` if the pool or dispatcher cannot be spawned.
    pub fn start(self, services: Vec<ServiceDescriptor>) -> Result<SchedulerHandle<E>, SchedulerError> {
        let Self { config, executor } = self;
        let (finished_tx, finished_rx) = unbounded::<Finished>();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        // Each timeline has at most one firing outstanding.
        let pool_config = WorkerPoolConfig::new()
            .with_worker_count(config.worker_count)
            .with_max_queue_depth(services.len().max(1));
        let pool = Arc::new(WorkerPool::new(
            &pool_config,
            TimelineExecutor {
                inner: executor,
                finished_tx,
            },
        )?);

        let timelines: Vec<Timeline> = services
            .into_iter()
            .map(|service| Timeline {
                service: Arc::new(service),
                ticks: 0,
            })
            .collect();
        let service_count = timelines.len();

        let dispatcher = Dispatcher {
            timelines,
            interval: config.interval,
            pool: Arc::clone(&pool),
            finished_rx,
            stop_rx,
            next_id: 0,
        };
        let dispatcher = thread::Builder::new()
            .name("poller-dispatch".into())
            .spawn(move || dispatcher.run())
            .map_err(|e| {
                pool.close();
                SchedulerError::Spawn(e)
            })?;

        info!(
            services = service_count,
            worker_count = config.worker_count,
            interval_ms = config.interval.as_millis(),
            "Scheduler started"
        );

        Ok(SchedulerHandle {
            pool,
            state: Mutex::new(SchedulerState::Running),
            stop_tx: Mutex::new(Some(stop_tx)),
            dispatcher: Mutex::new(Some(dispatcher)),
            shutdown_grace: config.shutdown_grace,
            service_count,
        })
    }
}

/// Handle to a running scheduler.
pub struct SchedulerHandle<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    pool: Arc<WorkerPool<Firing, TimelineExecutor<E>>>,
    state: Mutex<SchedulerState>,
    stop_tx: Mutex<Option<Sender<()>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    shutdown_grace: Duration,
    service_count: usize,
}

impl<E> SchedulerHandle<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Number of registered timelines.
    #[must_use]
    pub const fn service_count(&self) -> usize {
        self.service_count
    }

    /// Current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Stop every timeline and wait for in-flight firings.
    ///
    /// Admission closes first, so nothing due after this call starts; queued
    /// firings that have not started are discarded. Running firings finish,
    /// bounded by the shutdown grace period. Returns `None` if the scheduler
    /// was already stopping or stopped.
    pub fn stop(&self) -> Option<StopReport> {
        {
            let mut state = self.state.lock();
            if *state != SchedulerState::Running {
                debug!(state = %*state, "Stop ignored");
                return None;
            }
            *state = SchedulerState::Stopping;
        }
        info!("Stopping scheduler");

        self.pool.close();
        self.stop_tx.lock().take();
        if let Some(dispatcher) = self.dispatcher.lock().take() {
            if dispatcher.join().is_err() {
                warn!("Dispatcher thread panicked");
            }
        }

        let shutdown = self.pool.shutdown(self.shutdown_grace);
        let stats = self.pool.stats();
        *self.state.lock() = SchedulerState::Stopped;
        info!(
            completed = stats.completed_tasks,
            discarded = stats.discarded_tasks,
            detached = shutdown.detached,
            "Scheduler stopped"
        );
        Some(StopReport { shutdown, stats })
    }
}

impl<E> Drop for SchedulerHandle<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    fn drop(&mut self) {
        // Signal only; stop() is the way to wait for in-flight work.
        if *self.state.get_mut() == SchedulerState::Running {
            self.pool.close();
            self.stop_tx.get_mut().take();
            debug!("SchedulerHandle dropped while running - threads will be detached");
        }
    }
}

/// One firing handed to the pool.
struct Firing {
    timeline: usize,
    service: Arc<ServiceDescriptor>,
}

/// Sent by a worker when a firing has finished, successfully or not.
struct Finished {
    timeline: usize,
    started_at: Instant,
}

/// Reports the firing as finished when dropped, including on panic unwind.
struct FinishGuard {
    tx: Sender<Finished>,
    timeline: usize,
    started_at: Instant,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        // The dispatcher may already be gone during shutdown.
        let _ = self.tx.send(Finished {
            timeline: self.timeline,
            started_at: self.started_at,
        });
    }
}

/// Wraps the user executor to report finished firings back to the dispatcher.
struct TimelineExecutor<E> {
    inner: E,
    finished_tx: Sender<Finished>,
}

impl<E: Clone> Clone for TimelineExecutor<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            finished_tx: self.finished_tx.clone(),
        }
    }
}

#[async_trait]
impl<E> WorkerExecutor<Firing> for TimelineExecutor<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    async fn execute(&self, firing: Firing, meta: TaskMetadata) {
        let _finished = FinishGuard {
            tx: self.finished_tx.clone(),
            timeline: firing.timeline,
            started_at: meta.started_at,
        };
        self.inner.execute(firing.service, meta).await;
    }
}

struct Timeline {
    service: Arc<ServiceDescriptor>,
    ticks: u64,
}

struct Dispatcher<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    timelines: Vec<Timeline>,
    interval: Duration,
    pool: Arc<WorkerPool<Firing, TimelineExecutor<E>>>,
    finished_rx: Receiver<Finished>,
    stop_rx: Receiver<()>,
    next_id: u64,
}

impl<E> Dispatcher<E>
where
    E: WorkerExecutor<Arc<ServiceDescriptor>>,
{
    fn run(mut self) {
        // Ordered by due instant, then registration index.
        let mut due: BinaryHeap<Reverse<(Instant, usize)>> = BinaryHeap::with_capacity(self.timelines.len());
        let registered_at = Instant::now();
        for idx in 0..self.timelines.len() {
            due.push(Reverse((registered_at, idx)));
        }

        loop {
            let now = Instant::now();
            while let Some(&Reverse((at, idx))) = due.peek() {
                if at > now {
                    break;
                }
                due.pop();
                if !self.fire(idx, at, &mut due) {
                    debug!("Pool closed, dispatcher exiting");
                    return;
                }
            }

            let timer = due
                .peek()
                .map_or_else(crossbeam_channel::never, |&Reverse((at, _))| crossbeam_channel::at(at));

            select! {
                recv(self.stop_rx) -> _ => {
                    debug!("Stop signal received, dispatcher exiting");
                    return;
                }
                recv(self.finished_rx) -> msg => match msg {
                    Ok(done) => self.reschedule(done.timeline, done.started_at, &mut due),
                    Err(_) => return,
                },
                recv(timer) -> _ => {}
            }
        }
    }

    /// Queue the next firing of `idx` one interval after `from`. An interval
    /// too large to represent as an `Instant` means the timeline never fires again.
    fn reschedule(&self, idx: usize, from: Instant, due: &mut BinaryHeap<Reverse<(Instant, usize)>>) {
        match from.checked_add(self.interval) {
            Some(at) => due.push(Reverse((at, idx))),
            None => warn!(
                service = %self.timelines[idx].service.name,
                interval_secs = self.interval.as_secs(),
                "Next firing is beyond the representable time range, timeline idle"
            ),
        }
    }

    /// Submit one firing. Returns false once the pool refuses work for good.
    fn fire(&mut self, idx: usize, due_at: Instant, due: &mut BinaryHeap<Reverse<(Instant, usize)>>) -> bool {
        let timeline = &mut self.timelines[idx];
        let meta = TaskMetadata {
            id: self.next_id,
            tick: timeline.ticks,
            due_at,
            started_at: due_at,
        };
        let firing = Firing {
            timeline: idx,
            service: Arc::clone(&timeline.service),
        };
        match self.pool.submit(firing, meta) {
            Ok(()) => {
                self.next_id += 1;
                timeline.ticks += 1;
                true
            }
            Err(SchedulerError::PoolShutdown) => false,
            Err(e) => {
                warn!(service = %timeline.service.name, error = %e, "Could not submit firing, retrying after interval");
                self.reschedule(idx, Instant::now(), due);
                true
            }
        }
    }
}
