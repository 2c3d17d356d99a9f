//! Telemetry for the search pipeline.
//!
//! The orchestrator emits a [`SearchEvent`] at each decision point: admission,
//! each upstream stage, and the final outcome. Events flow through a
//! [`TelemetrySink`], which is a `tower::Service<SearchEvent>` so sinks compose
//! with ordinary tower combinators.
//!
//! ```rust
//! use breedlens::telemetry::{AdmissionEvent, SearchEvent};
//!
//! let event = SearchEvent::Admission(AdmissionEvent::Rejected { in_use: 10, capacity: 10 });
//! assert_eq!(event.to_string(), "Admission::Rejected(10/10)");
//! ```

use crate::error::{ErrorKind, Stage};
use std::convert::Infallible;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A telemetry sink that consumes search events.
pub trait TelemetrySink:
    tower::Service<SearchEvent, Response = (), Error = Self::SinkError> + Clone + Send + 'static
{
    /// The error type for this sink.
    type SinkError: std::error::Error + Send + 'static;
}

/// Best-effort emit helper that honors `poll_ready` and swallows errors.
///
/// A sink that is not ready or fails never affects the request being served.
pub async fn emit_best_effort<S>(sink: S, event: SearchEvent)
where
    S: tower::Service<SearchEvent, Response = ()> + Send + Clone + 'static,
    S::Error: std::error::Error + Send + 'static,
    S::Future: Send + 'static,
{
    use tower::ServiceExt;

    if let Ok(mut ready_sink) = sink.ready_oneshot().await {
        let _ = ready_sink.call(event).await;
    }
}

/// Events emitted while serving a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// Admission controller decisions
    Admission(AdmissionEvent),
    /// Upstream step results
    Stage(StageEvent),
    /// Final request outcome
    Outcome(RequestOutcome),
}

/// Admission decisions, with the counter as observed right after the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionEvent {
    Admitted { in_use: usize, capacity: usize },
    Rejected { in_use: usize, capacity: usize },
}

/// Raw upstream answers for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// Lookup answered.
    Resolved { status: u16 },
    /// Resource download answered.
    Fetched { status: u16, bytes: usize },
}

/// Final outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Completed { duration: Duration },
    Failed { kind: ErrorKind, stage: Option<Stage>, duration: Duration },
}

impl fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEvent::Admission(event) => write!(f, "Admission::{}", event),
            SearchEvent::Stage(event) => write!(f, "Stage::{}", event),
            SearchEvent::Outcome(event) => write!(f, "Outcome::{}", event),
        }
    }
}

impl fmt::Display for AdmissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionEvent::Admitted { in_use, capacity } => {
                write!(f, "Admitted({}/{})", in_use, capacity)
            }
            AdmissionEvent::Rejected { in_use, capacity } => {
                write!(f, "Rejected({}/{})", in_use, capacity)
            }
        }
    }
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageEvent::Resolved { status } => write!(f, "Resolved(status={})", status),
            StageEvent::Fetched { status, bytes } => {
                write!(f, "Fetched(status={}, bytes={})", status, bytes)
            }
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestOutcome::Completed { duration } => {
                write!(f, "Completed(duration={:?})", duration)
            }
            RequestOutcome::Failed { kind, stage: Some(stage), duration } => {
                write!(f, "Failed(kind={}, stage={}, duration={:?})", kind, stage, duration)
            }
            RequestOutcome::Failed { kind, stage: None, duration } => {
                write!(f, "Failed(kind={}, duration={:?})", kind, duration)
            }
        }
    }
}

type SinkFuture = Pin<Box<dyn std::future::Future<Output = Result<(), Infallible>> + Send>>;

/// A no-op telemetry sink that discards all events.
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl Service<SearchEvent> for NullSink {
    type Response = ();
    type Error = Infallible;
    type Future = SinkFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _event: SearchEvent) -> Self::Future {
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for NullSink {
    type SinkError = Infallible;
}

/// A telemetry sink that logs events using the `tracing` crate.
///
/// Events are logged at DEBUG level with the event rendered as a field.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl Service<SearchEvent> for LogSink {
    type Response = ();
    type Error = Infallible;
    type Future = SinkFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: SearchEvent) -> Self::Future {
        tracing::debug!(event = %event, "search_event");
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for LogSink {
    type SinkError = Infallible;
}

/// A telemetry sink that stores events in memory.
///
/// Bounded; the oldest events are evicted once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<SearchEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    /// Creates a bounded memory sink (default cap: 10,000).
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    /// Creates a bounded memory sink with explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns a snapshot of all events received so far.
    pub fn events(&self) -> Vec<SearchEvent> {
        self.lock().clone()
    }

    /// Only the final outcomes, in arrival order.
    pub fn outcomes(&self) -> Vec<RequestOutcome> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Outcome(outcome) => Some(*outcome),
                _ => None,
            })
            .collect()
    }

    /// Clears all stored events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the number of evicted events.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SearchEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<SearchEvent> for MemorySink {
    type Response = ();
    type Error = Infallible;
    type Future = SinkFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: SearchEvent) -> Self::Future {
        let mut guard = self.lock();
        if guard.len() >= self.capacity {
            guard.remove(0);
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push(event);
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for MemorySink {
    type SinkError = Infallible;
}
