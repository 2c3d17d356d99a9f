#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # breedlens
//!
//! Admission-controlled lookup of random breed images.
//!
//! A request names a breed (and optionally a sub-breed). The service validates it,
//! admits it through a leaky counter shared by all callers, resolves a random image
//! URL from the upstream API, downloads the image and hands back both.
//!
//! ## Features
//!
//! - **Leaky admission counter**: at most 10 requests in flight per window, one slot
//!   freed every second, lock-free
//! - **Two-step upstream pipeline** with a stable error taxonomy ([`ErrorKind`])
//! - **Per-request cancellation and deadlines** honored during each network step
//! - **Telemetry sinks** as `tower::Service`s
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use breedlens::{AdmissionController, HttpFetcher, RequestContext, SearchConfig, SearchQuery, SearchService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::default();
//!     let admission = AdmissionController::with_capacity(config.capacity())?;
//!     let _decay = admission.start_decay(config.decay_interval());
//!
//!     let fetcher = HttpFetcher::new(config.http_timeout())?;
//!     let service = SearchService::from_config(fetcher, admission, &config);
//!
//!     let found = service
//!         .search(&SearchQuery::new("bulldog", "french"), &RequestContext::new())
//!         .await?;
//!     println!("{} ({} bytes)", found.resource_url, found.payload.len());
//!     Ok(())
//! }
//! ```

pub mod admission;
pub mod config;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod prelude;
pub mod query;
pub mod resolver;
pub mod telemetry;
pub mod testing;

// Re-exports
pub use admission::{AdmissionController, DecayHandle};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use context::{Interrupt, RequestContext};
pub use error::{ConfigError, ErrorKind, FetchError, Field, SearchError, Stage};
pub use fetcher::{FetchResponse, HttpFetcher, ResourceFetcher};
pub use orchestrator::{check_status, SearchRequest, SearchResult, SearchService};
pub use query::SearchQuery;
pub use resolver::{EndpointResolver, Resolution, ResolveError};
