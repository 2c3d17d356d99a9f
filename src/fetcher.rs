//! Single upstream GET: raw bytes plus status code, or a transport error.

use crate::error::FetchError;
use async_trait::async_trait;
use http::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Default client-side timeout for each upstream call.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Performs one GET against an arbitrary endpoint. No business logic.
///
/// Implementations must be re-entrant: the orchestrator shares one fetcher across
/// all concurrent requests. Non-2xx statuses are responses, not errors.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + std::fmt::Debug {
    async fn get(&self, endpoint: &str) -> Result<FetchResponse, FetchError>;
}

#[async_trait]
impl<T> ResourceFetcher for Arc<T>
where
    T: ResourceFetcher + ?Sized,
{
    async fn get(&self, endpoint: &str) -> Result<FetchResponse, FetchError> {
        (**self).get(endpoint).await
    }
}

/// [`ResourceFetcher`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn map_error(endpoint: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout { endpoint: endpoint.to_owned() }
        } else if err.is_builder() {
            FetchError::InvalidEndpoint { endpoint: endpoint.to_owned(), reason: err.to_string() }
        } else {
            FetchError::transport(endpoint, err)
        }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn get(&self, endpoint: &str) -> Result<FetchResponse, FetchError> {
        let response =
            self.client.get(endpoint).send().await.map_err(|e| Self::map_error(endpoint, e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| Self::map_error(endpoint, e))?;
        tracing::debug!(endpoint, status = status.as_u16(), bytes = body.len(), "upstream get");
        Ok(FetchResponse { status, body: body.to_vec() })
    }
}
