//! Outcome reporters.
//!
//! Every firing of a service task ends in exactly one [`TaskReport`]. Reports
//! go to an [`OutcomeReporter`], never back to the scheduler.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::core::TaskError;

/// Result of one firing.
///
/// The response body goes to the sink and is not kept; a success only
/// records how many bytes were appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The body was fetched, parsed and appended to the sink.
    Success {
        /// Bytes appended, newline included.
        bytes: usize,
    },
    /// The task ended early at the step named by the error.
    Failure(TaskError),
}

impl PollOutcome {
    /// Whether a record reached the sink.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// What happened to one firing of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Service name.
    pub service: String,
    /// Ordinal of the firing within the service timeline.
    pub tick: u64,
    /// Outcome of the firing.
    pub outcome: PollOutcome,
    /// Time spent in the task.
    pub elapsed: Duration,
}

/// Consumer of task reports.
pub trait OutcomeReporter: Send + Sync + 'static {
    /// Record one task report.
    fn report(&self, report: &TaskReport);
}

/// Reporter that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn report(&self, report: &TaskReport) {
        let elapsed_ms = report.elapsed.as_millis();
        match &report.outcome {
            PollOutcome::Success { bytes } => debug!(
                service = %report.service,
                tick = report.tick,
                bytes = bytes,
                elapsed_ms = elapsed_ms,
                "Recorded response"
            ),
            PollOutcome::Failure(reason) => error!(
                service = %report.service,
                tick = report.tick,
                elapsed_ms = elapsed_ms,
                reason = %reason,
                "Error with service"
            ),
        }
    }
}

/// In-memory reporter with a bounded buffer, for tests and embedding.
#[derive(Debug)]
pub struct InMemoryReporter {
    reports: Mutex<VecDeque<TaskReport>>,
    max_reports: usize,
}

impl InMemoryReporter {
    /// Create a reporter keeping at most `max_reports` of the newest reports.
    #[must_use]
    pub fn new(max_reports: usize) -> Self {
        Self {
            reports: Mutex::new(VecDeque::with_capacity(max_reports.min(1024))),
            max_reports,
        }
    }

    /// Snapshot of stored reports, oldest first.
    #[must_use]
    pub fn reports(&self) -> Vec<TaskReport> {
        self.reports.lock().iter().cloned().collect()
    }

    /// Stored reports for one service.
    #[must_use]
    pub fn reports_for(&self, service: &str) -> Vec<TaskReport> {
        self.reports
            .lock()
            .iter()
            .filter(|r| r.service == service)
            .cloned()
            .collect()
    }

    /// Number of stored failures for one service.
    #[must_use]
    pub fn failures_for(&self, service: &str) -> usize {
        self.reports
            .lock()
            .iter()
            .filter(|r| r.service == service && !r.outcome.is_success())
            .count()
    }

    /// Number of stored successes for one service.
    #[must_use]
    pub fn successes_for(&self, service: &str) -> usize {
        self.reports
            .lock()
            .iter()
            .filter(|r| r.service == service && r.outcome.is_success())
            .count()
    }
}

impl OutcomeReporter for InMemoryReporter {
    fn report(&self, report: &TaskReport) {
        if self.max_reports == 0 {
            return;
        }
        let mut reports = self.reports.lock();
        if reports.len() >= self.max_reports {
            reports.pop_front();
        }
        reports.push_back(report.clone());
    }
}
