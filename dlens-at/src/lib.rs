//! dlens-at library - Annotation Tool module
//!
//! Serves the summary-phrase ranking UI. Examples and saved rankings
//! live in the external annotation backend; this service derives the
//! per-example boards, applies drag moves, and forwards ranking
//! updates with their before/after state for consistency checking.

use std::sync::Arc;

use axum::Router;

use crate::client::AnnotationClient;

pub mod api;
pub mod board;
pub mod client;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Annotation backend client
    pub backend: Arc<AnnotationClient>,
}

impl AppState {
    pub fn new(backend: AnnotationClient) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/:user", get(api::get_user_data))
        .route("/api/:user/:example", post(api::update_ranking))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
