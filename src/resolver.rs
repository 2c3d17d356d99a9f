//! Turns a category / sub-category pair into a concrete resource URL.

use crate::error::FetchError;
use crate::fetcher::ResourceFetcher;
use http::StatusCode;
use serde::Deserialize;

/// Default upstream host serving the lookup API.
pub const DEFAULT_UPSTREAM: &str = "https://dog.ceo";

/// Status value the upstream puts in a successful envelope.
const ENVELOPE_SUCCESS: &str = "success";

/// Parsed body of the upstream lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Outcome of one lookup call.
///
/// `url` is empty whenever `status` is not `200 OK`; interpreting the status is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub status: StatusCode,
}

/// Hard resolver failures. A non-OK status is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Transport(#[from] FetchError),
    #[error("malformed upstream envelope: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Builds lookup endpoints and parses the upstream envelope.
#[derive(Debug, Clone)]
pub struct EndpointResolver<F> {
    fetcher: F,
    base_url: String,
}

impl<F> EndpointResolver<F>
where
    F: ResourceFetcher,
{
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { fetcher, base_url }
    }

    /// Lookup endpoint for the pair; the sub-category segment is present only when non-empty.
    ///
    /// No validation happens here: an empty category yields a well-formed endpoint that
    /// the upstream rejects.
    pub fn endpoint(&self, category: &str, sub_category: Option<&str>) -> String {
        match sub_category.filter(|s| !s.is_empty()) {
            Some(sub) => format!("{}/api/breed/{}/{}/images/random", self.base_url, category, sub),
            None => format!("{}/api/breed/{}/images/random", self.base_url, category),
        }
    }

    /// Query the upstream for a random resource of the given category.
    pub async fn resolve(
        &self,
        category: &str,
        sub_category: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let endpoint = self.endpoint(category, sub_category);
        let response = self.fetcher.get(&endpoint).await?;

        if response.status != StatusCode::OK {
            tracing::debug!(%endpoint, status = response.status.as_u16(), "lookup not ok");
            return Ok(Resolution { url: String::new(), status: response.status });
        }

        let envelope: UpstreamEnvelope =
            serde_json::from_slice(&response.body).map_err(ResolveError::Malformed)?;

        // An OK transport status with an error envelope resolves to nothing.
        let url = if envelope.status == ENVELOPE_SUCCESS { envelope.message } else { String::new() };
        Ok(Resolution { url, status: response.status })
    }
}
