//! breedlens server: admission-controlled breed image search over gRPC.

use anyhow::{Context, Result};
use breedlens::resolver::DEFAULT_UPSTREAM;
use breedlens::telemetry::LogSink;
use breedlens::{AdmissionController, HttpFetcher, SearchConfig, SearchService};
use breedlens_grpc::logging::{init_tracing, LogLevel};
use breedlens_grpc::server::{serve_with_shutdown, shutdown_signal, DEFAULT_PORT};
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Serve random breed images fetched from the upstream API.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Bind address (default: all interfaces)
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Base URL of the breed image API
    #[arg(long, env = "BREEDLENS_UPSTREAM", default_value = DEFAULT_UPSTREAM)]
    upstream: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_level).context("Failed to initialize logging")?;

    let config = SearchConfig::builder()
        .upstream(args.upstream.as_str())
        .build()
        .context("Invalid configuration")?;

    let admission = AdmissionController::with_capacity(config.capacity())?;
    let decay = admission.start_decay(config.decay_interval());

    let fetcher = HttpFetcher::new(config.http_timeout()).context("Failed to build HTTP client")?;
    let search = SearchService::from_config(fetcher, admission, &config).with_sink(LogSink);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .context("Failed to parse bind address")?;
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "breedlens server v{} listening on {} (upstream {})",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?,
        config.upstream()
    );

    serve_with_shutdown(listener, search, shutdown_signal()).await.context("gRPC server failed")?;

    decay.shutdown().await;
    info!("server stopped");
    Ok(())
}
