//! gRPC handler over the search pipeline.

use crate::deadline::timeout_from_metadata;
use crate::proto::breed_image_service_server::BreedImageService;
use crate::proto::{BreedImageSearchRequest, BreedImageSearchResponse};
use crate::status::to_status;
use breedlens::telemetry::{NullSink, TelemetrySink};
use breedlens::{RequestContext, ResourceFetcher, SearchQuery, SearchService};
use tonic::{Request, Response, Status};
use uuid::Uuid;

/// Adapts [`SearchService`] to `BreedImageService`.
///
/// Translates the inbound message into a query, the `grpc-timeout` header into a
/// deadline, and failures into status codes. A dropped call drops the in-flight
/// search with it.
#[derive(Debug, Clone)]
pub struct BreedImageHandler<F, S = NullSink> {
    search: SearchService<F, S>,
}

impl<F, S> BreedImageHandler<F, S> {
    pub fn new(search: SearchService<F, S>) -> Self {
        Self { search }
    }

    pub fn search_service(&self) -> &SearchService<F, S> {
        &self.search
    }
}

#[tonic::async_trait]
impl<F, S> BreedImageService for BreedImageHandler<F, S>
where
    F: ResourceFetcher + Clone + 'static,
    S: TelemetrySink + Sync,
    S::Future: Send + 'static,
{
    async fn search(
        &self,
        request: Request<BreedImageSearchRequest>,
    ) -> Result<Response<BreedImageSearchResponse>, Status> {
        let request_id = Uuid::new_v4();

        let mut ctx = RequestContext::new();
        if let Some(timeout) = timeout_from_metadata(request.metadata()) {
            ctx = ctx.with_timeout(timeout);
        }

        let BreedImageSearchRequest { breed, sub_breed } = request.into_inner();
        tracing::info!(%request_id, %breed, %sub_breed, "search request");

        let query = SearchQuery::new(breed, sub_breed);
        match self.search.search(&query, &ctx).await {
            Ok(found) => Ok(Response::new(BreedImageSearchResponse {
                image_url: found.resource_url,
                image: found.payload,
            })),
            Err(err) => {
                let status = to_status(&err);
                tracing::debug!(%request_id, code = ?status.code(), "search request failed");
                Err(status)
            }
        }
    }
}
