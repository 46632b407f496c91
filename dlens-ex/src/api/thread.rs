//! Thread view endpoints
//!
//! Opening a thread fetches it from the clustering backend, derives
//! the full view payload (clusters, points, minimap, grouped frames,
//! initial selection), and registers a session the view endpoints and
//! the per-side event streams operate on.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use url::form_urlencoded;
use uuid::Uuid;

use dlens_common::types::FromUrlOptions;
use dlens_common::Error;

use crate::api::ApiError;
use crate::thread::{transpose, SelectionAction, SelectionKeys, SelectionState, Side};
use crate::AppState;

/// Body of `POST /api/thread`. Exactly one of `id` and `url` selects
/// the source; `stored` switches `id` from the precomputed examples to
/// the backend's stored computations. The remaining fields are the
/// deep-link keys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenThreadRequest {
    pub id: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub stored: bool,
    #[serde(default)]
    pub options: FromUrlOptions,
    pub label_model: Option<String>,
    pub frame_model: Option<String>,
    pub cluster: Option<i64>,
}

/// POST /api/thread
pub async fn open_thread(
    State(state): State<AppState>,
    Json(request): Json<OpenThreadRequest>,
) -> Result<Json<Value>, ApiError> {
    let thread = if let Some(url) = &request.url {
        state.backend.from_url(url, &request.options).await?
    } else if let Some(id) = &request.id {
        if request.stored {
            state.backend.stored(id).await?
        } else {
            state.backend.from_precomputed(id).await?
        }
    } else {
        return Err(Error::InvalidInput("request needs an id or a url".to_string()).into());
    };

    let keys = SelectionKeys {
        cluster: request.cluster,
        label_model: request.label_model.clone(),
        frame_model: request.frame_model.clone(),
    };
    let session = state.sessions.open(thread, keys).await?;
    let view = state.sessions.get(session).await?;
    let view = view.lock().await;

    let share = share_href(
        request.id.as_deref(),
        request.url.as_deref(),
        request.stored,
        &view.selection,
    );
    Ok(Json(json!({
        "success": true,
        "data": {
            "session": session,
            "title": view.thread.title,
            "url": view.thread.url,
            "numComments": view.thread.num_comments,
            "clusterModel": view.thread.cluster_model,
            "root": view.thread.root,
            "labels": view.thread.labels,
            "clusters": view.stats.clusters,
            "points": view.stats.points,
            "minimap": view.stats.minimap,
            "grouped": view.grouped,
            "selection": view.selection,
            // setting -> model, so the detail panel can tabulate
            // generation settings across models
            "meta": {
                "labels": transpose(&view.thread.meta.labels),
                "frames": transpose(&view.thread.meta.frames),
            },
            "share": share,
        }
    })))
}

/// DELETE /api/thread/:session
pub async fn close_thread(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.sessions.close(session).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub element: usize,
    pub side: Side,
    #[serde(default)]
    pub can_activate: bool,
}

/// POST /api/thread/:session/register
pub async fn register(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let view = state.sessions.get(session).await?;
    view.lock()
        .await
        .register(request.element, request.side, request.can_activate);
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRequest {
    pub element: usize,
    pub side: Side,
}

/// POST /api/thread/:session/unregister
pub async fn unregister(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(request): Json<SideRequest>,
) -> Result<Json<Value>, ApiError> {
    let view = state.sessions.get(session).await?;
    view.lock().await.unregister(request.element, request.side);
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverRequest {
    pub element: usize,
    pub on: bool,
}

/// POST /api/thread/:session/hover
pub async fn hover(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(request): Json<HoverRequest>,
) -> Result<Json<Value>, ApiError> {
    let view = state.sessions.get(session).await?;
    let mut view = view.lock().await;
    view.hover(request.element, request.on);
    Ok(Json(json!({
        "success": true,
        "data": { "highlighted": view.is_highlighted(request.element) }
    })))
}

/// POST /api/thread/:session/click
pub async fn click(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(request): Json<SideRequest>,
) -> Result<Json<Value>, ApiError> {
    let view = state.sessions.get(session).await?;
    view.lock().await.click(request.element, request.side);
    Ok(Json(json!({ "success": true })))
}

/// POST /api/thread/:session/selection
///
/// Applies one reducer action and answers with the resulting selection
/// and the (possibly regrouped) cluster ordering.
pub async fn apply_selection(
    State(state): State<AppState>,
    Path(session): Path<Uuid>,
    Json(action): Json<SelectionAction>,
) -> Result<Json<Value>, ApiError> {
    let view = state.sessions.get(session).await?;
    let mut view = view.lock().await;
    let selection = view.apply_selection(&action);
    Ok(Json(json!({
        "success": true,
        "data": { "selection": selection, "grouped": view.grouped }
    })))
}

/// Build the shareable deep link restoring this view: source
/// reference plus the current selection keys.
pub fn share_href(
    id: Option<&str>,
    url: Option<&str>,
    stored: bool,
    selection: &SelectionState,
) -> String {
    let (path, source_key, source_value) = match (id, url) {
        (_, Some(url)) => ("/from_url", "url", url),
        (Some(id), None) => (if stored { "/stored" } else { "/precomputed" }, "id", id),
        (None, None) => ("/precomputed", "", ""),
    };

    let mut query = form_urlencoded::Serializer::new(String::new());
    if !source_key.is_empty() {
        query.append_pair(source_key, source_value);
    }
    if let Some(label_model) = &selection.label_model.key {
        query.append_pair("labelModel", label_model);
    }
    if let Some(frame_model) = &selection.frame_model.key {
        query.append_pair("frameModel", frame_model);
    }
    if let Some(cluster) = selection.cluster.key {
        query.append_pair("cluster", &cluster.to_string());
    }
    format!("{}?{}", path, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::Selection;

    fn selection(cluster: Option<i64>, label: Option<&str>, frame: Option<&str>) -> SelectionState {
        SelectionState {
            cluster: Selection {
                index: if cluster.is_some() { 0 } else { -1 },
                key: cluster,
                value: cluster.map(|_| 1),
            },
            label_model: Selection {
                index: if label.is_some() { 0 } else { -1 },
                key: label.map(str::to_string),
                value: None,
            },
            frame_model: Selection {
                index: if frame.is_some() { 0 } else { -1 },
                key: frame.map(str::to_string),
                value: None,
            },
        }
    }

    #[test]
    fn test_share_href_precomputed() {
        let href = share_href(
            Some("42"),
            None,
            false,
            &selection(Some(3), Some("gpt-4"), Some("gpt-4")),
        );
        assert_eq!(
            href,
            "/precomputed?id=42&labelModel=gpt-4&frameModel=gpt-4&cluster=3"
        );
    }

    #[test]
    fn test_share_href_stored() {
        let href = share_href(Some("abc"), None, true, &selection(None, None, None));
        assert_eq!(href, "/stored?id=abc");
    }

    #[test]
    fn test_share_href_encodes_url() {
        let href = share_href(
            None,
            Some("https://www.reddit.com/r/rust/comments/x?a=1&b=2"),
            false,
            &selection(Some(0), None, None),
        );
        assert!(href.starts_with("/from_url?url=https%3A%2F%2Fwww.reddit.com"));
        assert!(href.contains("a%3D1%26b%3D2"));
        assert!(href.ends_with("&cluster=0"));
    }
}
