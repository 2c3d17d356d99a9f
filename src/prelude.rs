//! Convenient re-exports for common breedlens types.
pub use crate::{
    admission::{AdmissionController, DecayHandle, DEFAULT_CAPACITY, DEFAULT_DECAY_INTERVAL},
    config::SearchConfig,
    context::RequestContext,
    error::{ErrorKind, SearchError},
    fetcher::{HttpFetcher, ResourceFetcher},
    orchestrator::{SearchRequest, SearchResult, SearchService},
    query::SearchQuery,
    telemetry::{LogSink, MemorySink, NullSink, SearchEvent, TelemetrySink},
};
