//! Tests for outcome reporters

use std::time::Duration;

use service_poller::core::{
    FetchError, InMemoryReporter, OutcomeReporter, PollOutcome, TaskError, TaskReport,
    TracingReporter,
};

fn report(service: &str, tick: u64, outcome: PollOutcome) -> TaskReport {
    TaskReport {
        service: service.into(),
        tick,
        outcome,
        elapsed: Duration::from_millis(3),
    }
}

#[test]
fn test_in_memory_reporter_counts_per_service() {
    let reporter = InMemoryReporter::new(10);
    reporter.report(&report("a", 0, PollOutcome::Success { bytes: 8 }));
    reporter.report(&report("b", 0, PollOutcome::Failure(TaskError::Fetch(FetchError::BadStatus(404)))));
    reporter.report(&report("a", 1, PollOutcome::Success { bytes: 8 }));

    assert_eq!(reporter.reports().len(), 3);
    assert_eq!(reporter.successes_for("a"), 2);
    assert_eq!(reporter.failures_for("a"), 0);
    assert_eq!(reporter.failures_for("b"), 1);
    assert_eq!(
        reporter.reports_for("a").iter().map(|r| r.tick).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn test_in_memory_reporter_keeps_newest() {
    let reporter = InMemoryReporter::new(2);
    for tick in 0..5 {
        reporter.report(&report("a", tick, PollOutcome::Success { bytes: 1 }));
    }
    let ticks: Vec<u64> = reporter.reports().iter().map(|r| r.tick).collect();
    assert_eq!(ticks, vec![3, 4]);
}

#[test]
fn test_tracing_reporter_accepts_both_outcomes() {
    let reporter = TracingReporter;
    reporter.report(&report("a", 0, PollOutcome::Success { bytes: 1 }));
    reporter.report(&report(
        "a",
        1,
        PollOutcome::Failure(TaskError::Fetch(FetchError::Network("refused".into()))),
    ));
}
