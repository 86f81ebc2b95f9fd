//! Blocking run loop: load, start, wait for a stop signal, shut down.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::builders::build_poller;
use crate::config::{PollerConfig, ServiceCatalog};
use crate::core::{AppResult, OutcomeReporter, PoolStats, TracingReporter};
use crate::infra::SinkWriter;
use crate::runtime::control::{wait_for_stop_signal, StopReason};

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the run ended.
    pub reason: StopReason,
    /// Names of the services that were polled.
    pub services: Vec<String>,
    /// Final pool statistics.
    pub stats: PoolStats,
    /// Workers still busy when the grace period expired.
    pub detached_workers: usize,
}

/// Poll until Ctrl-C or an operator stop command, logging outcomes with tracing.
///
/// # Errors
///
/// Fails before any firing if the configuration, catalog or output is
/// invalid or the scheduler cannot start.
pub fn run(cfg: &PollerConfig) -> AppResult<RunSummary> {
    run_with(cfg, Arc::new(TracingReporter), wait_for_stop_signal)
}

/// Poll until `wait` returns, sending outcomes to `reporter`.
///
/// `wait` is called on the current thread once every timeline is running.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with<W>(cfg: &PollerConfig, reporter: Arc<dyn OutcomeReporter>, wait: W) -> AppResult<RunSummary>
where
    W: FnOnce() -> StopReason,
{
    cfg.validate().context("invalid poller configuration")?;
    let catalog = ServiceCatalog::load(&cfg.catalog)?;
    let sink = Arc::new(SinkWriter::open(&cfg.output_target())?);

    let poller = build_poller(cfg, &catalog, Arc::clone(&sink), reporter)?;
    let services: Vec<String> = poller.services.iter().map(|s| s.name.clone()).collect();
    let handle = poller
        .scheduler
        .start(poller.services)
        .context("failed to start scheduler")?;
    info!(services = ?services, "Polling started; press Ctrl-C or type `q` to stop");

    let reason = wait();
    info!(reason = %reason, "Stop requested");

    let (stats, detached_workers) = match handle.stop() {
        Some(report) => (report.stats, report.shutdown.detached),
        None => (handle.stats(), 0),
    };
    if let Err(e) = sink.close() {
        warn!(error = %e, "Failed to flush sink on close");
    }

    info!(
        completed = stats.completed_tasks,
        panicked = stats.panicked_tasks,
        discarded = stats.discarded_tasks,
        detached = detached_workers,
        "Poller stopped"
    );
    Ok(RunSummary {
        reason,
        services,
        stats,
        detached_workers,
    })
}
