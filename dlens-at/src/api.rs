//! HTTP API handlers for dlens-at
//!
//! The service is stateless: board state lives in the browser, the
//! saved rankings live in the annotation backend. Handlers apply list
//! operations on the state the client sends, forward the before/after
//! payload, and pass the backend's verdict through unchanged.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use dlens_common::error::{Error, RequestError};

use crate::board::{DragPosition, RankingBoard};
use crate::client::ExamplesReply;
use crate::AppState;

// ========================================
// Error mapping
// ========================================

/// Failures render as `{success: false, reason}` like the annotation
/// backend's own refusals; the status code marks where it happened.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError(Error::Request(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Request(RequestError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Error::Request(RequestError::Http { code, .. }) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::Request(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "success": false, "reason": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

// ========================================
// Health / build info / UI
// ========================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "dlens-at".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}

const INDEX_HTML: &str = include_str!("ui/index.html");
const APP_JS: &str = include_str!("ui/app.js");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

// ========================================
// Annotation endpoints
// ========================================

/// GET /api/:user
///
/// Proxies the user's examples and rankings and attaches the derived
/// board per example. A backend refusal (unknown user) passes through
/// as a 200 so the UI renders the reason.
pub async fn get_user_data(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let reply = state.backend.get_examples(&user).await?;
    match reply {
        ExamplesReply::Refused { reason } => {
            Ok(Json(json!({ "success": false, "reason": reason })))
        }
        ExamplesReply::Data(data) => {
            let mut boards = serde_json::Map::new();
            for (example_id, example) in &data.examples {
                let ranking = data
                    .rankings
                    .get(example_id)
                    .cloned()
                    .unwrap_or_default();
                let board =
                    RankingBoard::derive(example.hypotheses.keys().cloned(), &ranking);
                boards.insert(example_id.clone(), serde_json::to_value(board).map_err(
                    |e| Error::Internal(format!("failed to encode board: {e}")),
                )?);
            }
            Ok(Json(json!({
                "success": true,
                "data": {
                    "examples": data.examples,
                    "boards": boards,
                }
            })))
        }
    }
}

/// Body of `POST /api/:user/:example`: the client's current board and
/// the drag to apply
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub unranked: Vec<String>,
    pub ranking: Vec<String>,
    pub source: DragPosition,
    pub destination: DragPosition,
}

/// POST /api/:user/:example
///
/// Applies the move, forwards the before/after payload, and returns
/// the backend's verdict plus the next board on success. A refusal
/// (stale ranking, inconsistent keys) comes back verbatim so the UI
/// shows the backend's reason.
pub async fn update_ranking(
    State(state): State<AppState>,
    Path((user, example)): Path<(String, String)>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut board = RankingBoard {
        unranked: request.unranked,
        ranking: request.ranking,
    };
    let update = board.move_item(request.source, request.destination)?;

    let reply = state.backend.update_ranking(&user, &example, &update).await?;
    let mut body = serde_json::to_value(&reply)
        .map_err(|e| Error::Internal(format!("failed to encode reply: {e}")))?;
    if reply.success {
        body["board"] = serde_json::to_value(&board)
            .map_err(|e| Error::Internal(format!("failed to encode board: {e}")))?;
    }
    Ok(Json(body))
}
