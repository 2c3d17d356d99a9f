//! Serving `BreedImageService` on a bound listener.

use crate::proto::breed_image_service_server::BreedImageServiceServer;
use crate::service::BreedImageHandler;
use breedlens::telemetry::TelemetrySink;
use breedlens::{ResourceFetcher, SearchService};
use std::future::Future;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 22626;

/// Serve `search` on `listener` until `shutdown` resolves, then drain in-flight calls.
///
/// The listener is bound by the caller so bind failures surface before serving starts.
pub async fn serve_with_shutdown<F, S, Sig>(
    listener: TcpListener,
    search: SearchService<F, S>,
    shutdown: Sig,
) -> Result<(), tonic::transport::Error>
where
    F: ResourceFetcher + Clone + 'static,
    S: TelemetrySink + Sync,
    S::Future: Send + 'static,
    Sig: Future<Output = ()>,
{
    Server::builder()
        .add_service(BreedImageServiceServer::new(BreedImageHandler::new(search)))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
