//! Assemble the scheduler, HTTP fetcher and service selection from configuration.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{PollerConfig, ServiceCatalog, ServiceDescriptor};
use crate::core::{AppResult, OutcomeReporter, Scheduler, SchedulerConfig, ServiceTask};
use crate::infra::{HttpFetcher, SinkWriter};

/// A poller ready to start: the scheduler plus the services it will poll.
pub struct Poller {
    /// Scheduler in the `Created` state.
    pub scheduler: Scheduler<ServiceTask<HttpFetcher>>,
    /// Selected services, in catalog order.
    pub services: Vec<ServiceDescriptor>,
}

/// Build a poller from validated configuration.
///
/// Services are selected from `catalog` by `cfg.services`; unknown names are
/// dropped with a warning.
///
/// # Errors
///
/// Fails if the configuration is invalid, nothing is selected, the HTTP
/// client cannot be built or the scheduler rejects its settings.
pub fn build_poller(
    cfg: &PollerConfig,
    catalog: &ServiceCatalog,
    sink: Arc<SinkWriter>,
    reporter: Arc<dyn OutcomeReporter>,
) -> AppResult<Poller> {
    cfg.validate().context("invalid poller configuration")?;
    let services = catalog.select(&cfg.services)?;

    let fetcher = HttpFetcher::new(cfg.request_timeout()).context("failed to build HTTP client")?;
    let task = ServiceTask::new(fetcher, sink, reporter);

    let scheduler_config = SchedulerConfig::new(cfg.worker_count, cfg.interval())
        .with_shutdown_grace(cfg.shutdown_grace());
    let scheduler = Scheduler::new(scheduler_config, task)?;

    info!(
        selected = services.len(),
        catalog = catalog.len(),
        worker_count = cfg.worker_count,
        interval_secs = cfg.interval_secs,
        "Poller assembled"
    );
    Ok(Poller { scheduler, services })
}
