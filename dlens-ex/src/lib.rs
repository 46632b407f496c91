//! dlens-ex library - Discussion Explorer module
//!
//! Serves the thread exploration UI and hosts the thread annotation
//! engine: per-session derived statistics, cross-view highlight
//! propagation, and the linked cluster/model selection state. Thread
//! data comes from the external clustering backend.

use std::sync::Arc;

use axum::Router;

use crate::backend::BackendClient;
use crate::sessions::SessionRegistry;

pub mod api;
pub mod backend;
pub mod sessions;
pub mod thread;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Open thread views
    pub sessions: SessionRegistry,
    /// Clustering backend client
    pub backend: Arc<BackendClient>,
}

impl AppState {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            backend: Arc::new(backend),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/precomputed", get(api::list_precomputed))
        .route("/api/stored", get(api::list_stored))
        .route("/api/thread", post(api::open_thread))
        .route("/api/thread/:session", delete(api::close_thread))
        .route("/api/thread/:session/register", post(api::register))
        .route("/api/thread/:session/unregister", post(api::unregister))
        .route("/api/thread/:session/hover", post(api::hover))
        .route("/api/thread/:session/click", post(api::click))
        .route("/api/thread/:session/selection", post(api::apply_selection))
        .route("/api/thread/:session/events/:side", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
