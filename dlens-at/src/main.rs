//! dlens-at (Annotation Tool) - Summary-phrase ranking UI
//!
//! Serves the browser UI for ranking summary phrases against examples
//! stored in the annotation backend.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use dlens_at::client::AnnotationClient;
use dlens_at::{build_router, AppState};
use dlens_common::config::ConfigResolver;

#[derive(Parser, Debug)]
#[command(name = "dlens-at", about = "DLENS Annotation Tool service")]
struct Args {
    /// Port to listen on (127.0.0.1)
    #[arg(long, env = "DLENS_AT_PORT")]
    port: Option<u16>,

    /// Base URL of the annotation backend
    #[arg(long, env = "DLENS_AT_BACKEND_URL")]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting DLENS Annotation Tool (dlens-at) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let resolver = ConfigResolver::new("annotate", "DLENS_AT", 5741, "http://localhost:5000");
    let config = resolver.resolve(args.port, args.backend_url);
    info!("Annotation backend: {}", config.backend_url);

    let backend = AnnotationClient::new(&config.backend_url)?;
    let state = AppState::new(backend);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("dlens-at listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
