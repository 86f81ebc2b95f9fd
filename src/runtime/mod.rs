//! Process-level runtime: stop signals and the blocking run loop.

pub mod control;
pub mod run;

pub use control::{wait_for_stop_signal, StopReason};
pub use run::{run, run_with, RunSummary};
