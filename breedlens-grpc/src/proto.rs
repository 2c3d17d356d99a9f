//! Wire types and service stubs for `breed_image.BreedImageService`.
//!
//! Mirrors `proto/breed_image.proto`. The stubs are the shape `tonic-prost-build`
//! emits, kept in-tree so building the crate does not require `protoc`.

/// Inbound search.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct BreedImageSearchRequest {
    #[prost(string, tag = "1")]
    pub breed: ::prost::alloc::string::String,
    /// Empty when no sub-breed is requested.
    #[prost(string, tag = "2")]
    pub sub_breed: ::prost::alloc::string::String,
}

/// Resolved image URL and its bytes.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct BreedImageSearchResponse {
    #[prost(string, tag = "1")]
    pub image_url: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub image: ::prost::alloc::vec::Vec<u8>,
}

/// Fully qualified service name.
pub const SERVICE_NAME: &str = "breed_image.BreedImageService";
const SEARCH_PATH: &str = "/breed_image.BreedImageService/Search";

/// Server side of `BreedImageService`.
pub mod breed_image_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait BreedImageService: std::marker::Send + std::marker::Sync + 'static {
        async fn search(
            &self,
            request: tonic::Request<super::BreedImageSearchRequest>,
        ) -> std::result::Result<tonic::Response<super::BreedImageSearchResponse>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct BreedImageServiceServer<T> {
        inner: Arc<T>,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }

    impl<T> BreedImageServiceServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner, max_decoding_message_size: None, max_encoding_message_size: None }
        }

        /// Limits the maximum size of a decoded message. Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.max_decoding_message_size = Some(limit);
            self
        }

        /// Limits the maximum size of an encoded message. Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.max_encoding_message_size = Some(limit);
            self
        }
    }

    impl<T, B> Service<http::Request<B>> for BreedImageServiceServer<T>
    where
        T: BreedImageService,
        B: Body + std::marker::Send + 'static,
        B::Error: Into<StdError> + std::marker::Send + 'static,
    {
        type Response = http::Response<tonic::body::Body>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                super::SEARCH_PATH => {
                    struct SearchSvc<T: BreedImageService>(pub Arc<T>);

                    impl<T: BreedImageService>
                        tonic::server::UnaryService<super::BreedImageSearchRequest> for SearchSvc<T>
                    {
                        type Response = super::BreedImageSearchResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

                        fn call(
                            &mut self,
                            request: tonic::Request<super::BreedImageSearchRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(async move {
                                <T as BreedImageService>::search(&inner, request).await
                            })
                        }
                    }

                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    Box::pin(async move {
                        let method = SearchSvc(inner);
                        let codec = tonic_prost::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                _ => Box::pin(async move {
                    let mut response = http::Response::new(tonic::body::Body::default());
                    let headers = response.headers_mut();
                    headers.insert(
                        tonic::Status::GRPC_STATUS,
                        (tonic::Code::Unimplemented as i32).into(),
                    );
                    headers.insert(http::header::CONTENT_TYPE, tonic::metadata::GRPC_CONTENT_TYPE);
                    Ok(response)
                }),
            }
        }
    }

    impl<T> Clone for BreedImageServiceServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
                max_decoding_message_size: self.max_decoding_message_size,
                max_encoding_message_size: self.max_encoding_message_size,
            }
        }
    }

    impl<T> tonic::server::NamedService for BreedImageServiceServer<T> {
        const NAME: &'static str = super::SERVICE_NAME;
    }
}

/// Client side of `BreedImageService`.
pub mod breed_image_service_client {
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct BreedImageServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl BreedImageServiceClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> BreedImageServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            Self { inner: tonic::client::Grpc::new(inner) }
        }

        pub async fn search(
            &mut self,
            request: impl tonic::IntoRequest<super::BreedImageSearchRequest>,
        ) -> std::result::Result<tonic::Response<super::BreedImageSearchResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(super::SEARCH_PATH);
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(super::SERVICE_NAME, "Search"));
            self.inner.unary(req, path, codec).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn request_wire_format_uses_proto_tags() {
        let req = BreedImageSearchRequest { breed: "bulldog".into(), sub_breed: "french".into() };
        let bytes = req.encode_to_vec();
        // field 1, length-delimited
        assert_eq!(bytes[0], 0x0A);
        assert_eq!(bytes[1] as usize, "bulldog".len());
        assert_eq!(BreedImageSearchRequest::decode(bytes.as_slice()).unwrap(), req);
    }

    #[test]
    fn empty_sub_breed_is_omitted_on_the_wire() {
        let req = BreedImageSearchRequest { breed: "husky".into(), sub_breed: String::new() };
        assert_eq!(req.encoded_len(), 2 + "husky".len());
    }
}
