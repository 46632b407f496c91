//! dlens-ex (Discussion Explorer) - Thread exploration UI
//!
//! Serves the browser UI for exploring clustered Reddit discussions
//! and hosts the thread annotation engine behind it.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use dlens_common::config::ConfigResolver;
use dlens_ex::backend::BackendClient;
use dlens_ex::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "dlens-ex", about = "DLENS Discussion Explorer service")]
struct Args {
    /// Port to listen on (127.0.0.1)
    #[arg(long, env = "DLENS_EX_PORT")]
    port: Option<u16>,

    /// Base URL of the clustering backend
    #[arg(long, env = "DLENS_EX_BACKEND_URL")]
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
        "Starting DLENS Discussion Explorer (dlens-ex) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let resolver = ConfigResolver::new("explorer", "DLENS_EX", 5740, "http://localhost:8000");
    let config = resolver.resolve(args.port, args.backend_url);
    info!("Clustering backend: {}", config.backend_url);

    let backend = BackendClient::new(&config.backend_url)?;
    let state = AppState::new(backend);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("dlens-ex listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
