//! Infrastructure adapters: the HTTP client and the output sink.

pub mod http;
pub mod sink;

pub use http::{Fetch, HttpFetcher};
pub use sink::SinkWriter;
