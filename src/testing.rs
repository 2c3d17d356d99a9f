//! Test doubles for the upstream seam.
//!
//! [`ScriptedFetcher`] answers from a fixed table of endpoints so pipeline behaviour
//! can be exercised without network access.

use crate::error::FetchError;
use crate::fetcher::{FetchResponse, ResourceFetcher};
use async_trait::async_trait;
use http::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(FetchResponse),
    Fail(String),
    Reject(String),
    Delay(Duration, FetchResponse),
    Hang,
}

/// In-memory [`ResourceFetcher`] with canned answers per endpoint.
///
/// Unscripted endpoints answer `404` with an upstream-style error envelope.
/// Clones share the script and the call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFetcher {
    routes: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with `status` and `body`.
    pub fn respond(self, endpoint: impl Into<String>, status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        self.script(endpoint, Scripted::Respond(FetchResponse::new(status, body)))
    }

    /// Answer `endpoint` with a `200` lookup envelope pointing at `resource_url`.
    pub fn resolves_to(self, endpoint: impl Into<String>, resource_url: &str) -> Self {
        let body = serde_json::json!({ "message": resource_url, "status": "success" }).to_string();
        self.respond(endpoint, StatusCode::OK, body)
    }

    /// Fail `endpoint` with a transport error.
    pub fn fail(self, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        self.script(endpoint, Scripted::Fail(message.into()))
    }

    /// Refuse `endpoint` as unparsable, the way a real client rejects a bad URL.
    pub fn reject(self, endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        self.script(endpoint, Scripted::Reject(reason.into()))
    }

    /// Answer `endpoint` only after `delay` has elapsed.
    pub fn delayed(
        self,
        endpoint: impl Into<String>,
        delay: Duration,
        status: StatusCode,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.script(endpoint, Scripted::Delay(delay, FetchResponse::new(status, body)))
    }

    /// Never answer `endpoint`.
    pub fn hang(self, endpoint: impl Into<String>) -> Self {
        self.script(endpoint, Scripted::Hang)
    }

    /// Endpoints requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn script(self, endpoint: impl Into<String>, answer: Scripted) -> Self {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).insert(endpoint.into(), answer);
        self
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    async fn get(&self, endpoint: &str) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(endpoint.to_owned());
        let answer = self.routes.lock().unwrap_or_else(PoisonError::into_inner).get(endpoint).cloned();

        match answer {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(FetchError::transport(endpoint, message)),
            Some(Scripted::Reject(reason)) => {
                Err(FetchError::InvalidEndpoint { endpoint: endpoint.to_owned(), reason })
            }
            Some(Scripted::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Scripted::Hang) => std::future::pending().await,
            None => Ok(FetchResponse::new(
                StatusCode::NOT_FOUND,
                r#"{"status":"error","message":"Breed not found","code":404}"#,
            )),
        }
    }
}
