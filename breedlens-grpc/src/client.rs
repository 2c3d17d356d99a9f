//! Caller side: one search with a short deadline, and response checks.

use crate::proto::breed_image_service_client::BreedImageServiceClient;
use crate::proto::{BreedImageSearchRequest, BreedImageSearchResponse};
use crate::persist::PersistError;
use std::time::Duration;
use tonic::transport::Channel;

/// Server address used when `CLIENT_GRPC_ADDR` is unset.
pub const DEFAULT_SERVER_ADDR: &str = "localhost:22626";

/// Deadline attached to every call.
pub const CALL_DEADLINE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("search failed: {} ({})", .0.message(), .0.code())]
    Rpc(#[from] tonic::Status),
    #[error("server returned an invalid response: {0}")]
    InvalidResponse(&'static str),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl ClientError {
    /// gRPC code of a failed call, if the server answered.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::Rpc(status) => Some(status.code()),
            _ => None,
        }
    }
}

/// `http://` URI for a bare `host:port`; addresses with a scheme pass through.
pub fn endpoint_uri(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_owned()
    } else {
        format!("http://{}", addr)
    }
}

pub async fn connect(addr: &str) -> Result<BreedImageServiceClient<Channel>, ClientError> {
    BreedImageServiceClient::connect(endpoint_uri(addr))
        .await
        .map_err(|source| ClientError::Connect { addr: addr.to_owned(), source })
}

/// Ask for an image of `breed` (and `sub_breed`, empty for none) within [`CALL_DEADLINE`].
pub async fn search_image(
    client: &mut BreedImageServiceClient<Channel>,
    breed: &str,
    sub_breed: &str,
) -> Result<BreedImageSearchResponse, ClientError> {
    let mut request = tonic::Request::new(BreedImageSearchRequest {
        breed: breed.to_owned(),
        sub_breed: sub_breed.to_owned(),
    });
    request.set_timeout(CALL_DEADLINE);

    let response = client.search(request).await?.into_inner();
    check_response(&response)?;
    Ok(response)
}

/// Both the URL and the image must be present.
pub fn check_response(response: &BreedImageSearchResponse) -> Result<(), ClientError> {
    if response.image_url.is_empty() {
        return Err(ClientError::InvalidResponse("empty image url"));
    }
    if response.image.is_empty() {
        return Err(ClientError::InvalidResponse("empty image"));
    }
    Ok(())
}
