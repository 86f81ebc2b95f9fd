//! The per-service polling task: fetch, parse, append.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ServiceDescriptor;
use crate::core::executor::{TaskMetadata, WorkerExecutor};
use crate::core::record::ResponseRecord;
use crate::core::report::{OutcomeReporter, PollOutcome, TaskReport};
use crate::core::TaskError;
use crate::infra::{Fetch, SinkWriter};

/// Polls one service per firing and appends the response to the shared sink.
///
/// Any failure ends the firing early and is handed to the reporter; nothing
/// propagates to the scheduler.
pub struct ServiceTask<F> {
    fetcher: Arc<F>,
    sink: Arc<SinkWriter>,
    reporter: Arc<dyn OutcomeReporter>,
}

impl<F> Clone for ServiceTask<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            sink: Arc::clone(&self.sink),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<F: Fetch> ServiceTask<F> {
    /// Compose a task from its collaborators.
    pub fn new(fetcher: F, sink: Arc<SinkWriter>, reporter: Arc<dyn OutcomeReporter>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            sink,
            reporter,
        }
    }

    /// Run one firing for `service` and report its outcome.
    pub async fn run(&self, service: &ServiceDescriptor, tick: u64) -> PollOutcome {
        debug!(service = %service.name, tick = tick, "Start task");
        let started = Instant::now();

        let outcome = match self.poll(service).await {
            Ok(bytes) => PollOutcome::Success { bytes },
            Err(e) => PollOutcome::Failure(e),
        };

        self.reporter.report(&TaskReport {
            service: service.name.clone(),
            tick,
            outcome: outcome.clone(),
            elapsed: started.elapsed(),
        });
        debug!(service = %service.name, tick = tick, "End task");
        outcome
    }

    async fn poll(&self, service: &ServiceDescriptor) -> Result<usize, TaskError> {
        let body = self.fetcher.fetch(&service.url).await?;
        let record = ResponseRecord::parse(&body)?;
        Ok(self.sink.append(record.value())?)
    }
}

#[async_trait]
impl<F: Fetch> WorkerExecutor<Arc<ServiceDescriptor>> for ServiceTask<F> {
    async fn execute(&self, service: Arc<ServiceDescriptor>, meta: TaskMetadata) {
        self.run(&service, meta.tick).await;
    }
}
