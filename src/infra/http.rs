//! HTTP fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

use crate::core::FetchError;

/// Retrieves the raw body behind a url.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Issue one GET against `url` and return the body of a 2xx response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP GET client with a bounded request timeout.
///
/// One attempt per call, default redirect following. Idle connections are not
/// kept between calls, so every tick opens a fresh connection on the runtime
/// of the worker that issues it.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(error_chain(&e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(error_chain(&e)))?;
        trace!(url = url, bytes = body.len(), "Fetched response body");
        Ok(body.to_vec())
    }
}

/// Render an error with its source chain, e.g. `error sending request: connection refused`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
