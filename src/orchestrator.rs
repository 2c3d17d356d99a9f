//! Request orchestration.
//!
//! Each request walks `Validating → Admitting → Resolving → Fetching → Completed`,
//! leaving for `Failed` at the first step that does not succeed. Resolve and fetch
//! are two result-returning steps, each applying [`check_status`] to its own upstream
//! answer. Nothing is retried, cached or queued.

use crate::admission::AdmissionController;
use crate::config::SearchConfig;
use crate::context::{Interrupt, RequestContext};
use crate::error::{FetchError, SearchError, Stage};
use crate::fetcher::ResourceFetcher;
use crate::query::SearchQuery;
use crate::resolver::{EndpointResolver, ResolveError};
use crate::telemetry::{
    emit_best_effort, AdmissionEvent, NullSink, RequestOutcome, SearchEvent, StageEvent,
    TelemetrySink,
};
use http::StatusCode;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;
use tracing::Instrument;

/// Successful search: the resolved URL and the bytes it served. Both are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub resource_url: String,
    pub payload: Vec<u8>,
}

/// A query together with the caller's cancellation and deadline.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: SearchQuery,
    pub context: RequestContext,
}

impl SearchRequest {
    pub fn new(query: SearchQuery, context: RequestContext) -> Self {
        Self { query, context }
    }
}

impl From<SearchQuery> for SearchRequest {
    fn from(query: SearchQuery) -> Self {
        Self { query, context: RequestContext::default() }
    }
}

/// Map an upstream status to the pipeline contract: `200` passes, `404` is not-found,
/// anything else is an internal failure carrying the code.
pub fn check_status(stage: Stage, status: StatusCode) -> Result<(), SearchError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(SearchError::NotFound { stage }),
        other => Err(SearchError::UnexpectedStatus { stage, status: other.as_u16() }),
    }
}

fn interrupted(stage: Stage, interrupt: Interrupt) -> SearchError {
    match interrupt {
        Interrupt::Canceled => SearchError::Canceled { stage },
        Interrupt::DeadlineExceeded => SearchError::DeadlineExceeded { stage },
    }
}

/// Validates, admits, resolves and fetches.
///
/// Re-entrant: clones share the admission controller, the fetcher and the sink, and
/// carry no per-call state. Concurrent requests only contend on admission.
#[derive(Debug, Clone)]
pub struct SearchService<F, S = NullSink> {
    admission: AdmissionController,
    resolver: EndpointResolver<F>,
    fetcher: F,
    sink: S,
}

impl<F> SearchService<F, NullSink>
where
    F: ResourceFetcher + Clone,
{
    /// Service resolving against `upstream`, sharing `admission` with other instances.
    pub fn new(fetcher: F, admission: AdmissionController, upstream: impl Into<String>) -> Self {
        Self {
            admission,
            resolver: EndpointResolver::new(fetcher.clone(), upstream),
            fetcher,
            sink: NullSink,
        }
    }

    pub fn from_config(fetcher: F, admission: AdmissionController, config: &SearchConfig) -> Self {
        Self::new(fetcher, admission, config.upstream())
    }
}

impl<F, S> SearchService<F, S> {
    /// Replace the telemetry sink.
    pub fn with_sink<T>(self, sink: T) -> SearchService<F, T> {
        SearchService {
            admission: self.admission,
            resolver: self.resolver,
            fetcher: self.fetcher,
            sink,
        }
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }
}

impl<F, S> SearchService<F, S>
where
    F: ResourceFetcher,
    S: TelemetrySink + Sync,
    S::Future: Send + 'static,
{
    /// Serve one search.
    pub async fn search(
        &self,
        query: &SearchQuery,
        ctx: &RequestContext,
    ) -> Result<SearchResult, SearchError> {
        let span = tracing::info_span!(
            "search",
            category = query.category(),
            sub_category = query.sub_category().unwrap_or("none"),
        );

        async {
            let started = Instant::now();
            let result = self.run(query, ctx).await;
            let duration = started.elapsed();

            let outcome = match &result {
                Ok(found) => {
                    tracing::info!(
                        url = %found.resource_url,
                        bytes = found.payload.len(),
                        "image fetched and served"
                    );
                    RequestOutcome::Completed { duration }
                }
                Err(err) => {
                    if err.is_invalid_argument() {
                        tracing::info!(error = %err, "request rejected");
                    } else {
                        tracing::warn!(error = %err, kind = %err.kind(), "search failed");
                    }
                    RequestOutcome::Failed { kind: err.kind(), stage: err.stage(), duration }
                }
            };
            self.emit(SearchEvent::Outcome(outcome)).await;
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        query: &SearchQuery,
        ctx: &RequestContext,
    ) -> Result<SearchResult, SearchError> {
        query.validate()?;
        self.admit().await?;
        let resource_url = self.resolve_step(query, ctx).await?;
        let payload = self.fetch_step(&resource_url, ctx).await?;
        Ok(SearchResult { resource_url, payload })
    }

    async fn admit(&self) -> Result<(), SearchError> {
        let capacity = self.admission.capacity();

        if self.admission.try_admit() {
            let in_use = self.admission.in_use();
            self.emit(SearchEvent::Admission(AdmissionEvent::Admitted { in_use, capacity })).await;
            return Ok(());
        }

        let in_use = self.admission.in_use();
        tracing::warn!(in_use, capacity, "admission denied");
        self.emit(SearchEvent::Admission(AdmissionEvent::Rejected { in_use, capacity })).await;
        Err(SearchError::ResourceExhausted { in_use, capacity })
    }

    async fn resolve_step(
        &self,
        query: &SearchQuery,
        ctx: &RequestContext,
    ) -> Result<String, SearchError> {
        let stage = Stage::Resolve;
        let resolution = ctx
            .guard(self.resolver.resolve(query.category(), query.sub_category()))
            .await
            .map_err(|interrupt| interrupted(stage, interrupt))?
            .map_err(|err| match err {
                ResolveError::Transport(source) => SearchError::Unavailable { stage, source },
                ResolveError::Malformed(source) => SearchError::MalformedEnvelope(source),
            })?;

        let status = resolution.status.as_u16();
        self.emit(SearchEvent::Stage(StageEvent::Resolved { status })).await;

        check_status(stage, resolution.status)?;
        if resolution.url.is_empty() {
            return Err(SearchError::NotFound { stage });
        }
        Ok(resolution.url)
    }

    async fn fetch_step(&self, url: &str, ctx: &RequestContext) -> Result<Vec<u8>, SearchError> {
        let stage = Stage::Fetch;
        let response = ctx
            .guard(self.fetcher.get(url))
            .await
            .map_err(|interrupt| interrupted(stage, interrupt))?
            .map_err(|source| match source {
                FetchError::InvalidEndpoint { endpoint, reason } => {
                    SearchError::MalformedResourceUrl { url: endpoint, reason }
                }
                source => SearchError::Unavailable { stage, source },
            })?;

        let status = response.status.as_u16();
        let bytes = response.body.len();
        self.emit(SearchEvent::Stage(StageEvent::Fetched { status, bytes })).await;

        check_status(stage, response.status)?;
        if response.body.is_empty() {
            return Err(SearchError::EmptyPayload { url: url.to_owned() });
        }
        Ok(response.body)
    }

    async fn emit(&self, event: SearchEvent) {
        emit_best_effort(self.sink.clone(), event).await;
    }
}

impl<F, S> Service<SearchRequest> for SearchService<F, S>
where
    F: ResourceFetcher + Clone + 'static,
    S: TelemetrySink + Sync,
    S::Future: Send + 'static,
{
    type Response = SearchResult;
    type Error = SearchError;
    type Future = Pin<Box<dyn Future<Output = Result<SearchResult, SearchError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SearchRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.search(&req.query, &req.context).await })
    }
}
