#![forbid(unsafe_code)]

//! gRPC transport for `breedlens`.
//!
//! Exposes the search pipeline as `breed_image.BreedImageService/Search` and ships
//! the `breedlens-server` and `breedlens-client` binaries.
//!
//! ```rust,no_run
//! use breedlens::{AdmissionController, HttpFetcher, SearchConfig, SearchService};
//! use breedlens_grpc::server::{serve_with_shutdown, shutdown_signal};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SearchConfig::default();
//! let admission = AdmissionController::new();
//! let decay = admission.start_decay(config.decay_interval());
//! let search = SearchService::from_config(HttpFetcher::new(config.http_timeout())?, admission, &config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:22626").await?;
//! serve_with_shutdown(listener, search, shutdown_signal()).await?;
//! decay.shutdown().await;
//! # Ok(()) }
//! ```

pub mod client;
pub mod deadline;
pub mod logging;
pub mod persist;
pub mod proto;
pub mod server;
pub mod service;
pub mod status;

pub use proto::breed_image_service_client::BreedImageServiceClient;
pub use proto::breed_image_service_server::{BreedImageService, BreedImageServiceServer};
pub use proto::{BreedImageSearchRequest, BreedImageSearchResponse};
pub use service::BreedImageHandler;
