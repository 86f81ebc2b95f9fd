//! Builders that assemble a ready-to-start poller from configuration.

pub mod poller_builder;

pub use poller_builder::{build_poller, Poller};
