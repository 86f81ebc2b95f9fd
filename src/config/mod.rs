//! Configuration models for the poller, its worker pool and the service catalog.

pub mod catalog;
pub mod poller;
pub mod pool;

pub use catalog::{ServiceCatalog, ServiceDescriptor};
pub use poller::{OutputTarget, PollerConfig};
pub use pool::WorkerPoolConfig;
