//! Per-side event streams
//!
//! Each side of an open thread view gets one SSE stream carrying the
//! highlight / active / scroll / cluster events produced by its
//! registered hooks. The stream ends when the session is closed and
//! the channel senders are dropped.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use dlens_common::sse::channel_sse_stream;

use crate::api::ApiError;
use crate::thread::Side;
use crate::AppState;

/// GET /api/thread/:session/events/:side
pub async fn event_stream(
    State(state): State<AppState>,
    Path((session, side)): Path<(Uuid, Side)>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.sessions.get(session).await?;
    let receiver = view.lock().await.take_events(side)?;
    tracing::info!(session = %session, ?side, "SSE client connected");
    Ok(channel_sse_stream(receiver))
}
