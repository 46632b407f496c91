//! Thread list endpoints
//!
//! Proxies the backend's precomputed and stored thread lists, keeping
//! the `{success, data}` envelope so the browser treats local and
//! remote responses alike. Entries are decorated with badge colors for
//! their label models.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use dlens_common::types::ThreadOverview;

use crate::api::ApiError;
use crate::thread::{model_badge, ModelBadge};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverviewEntry {
    #[serde(flatten)]
    overview: ThreadOverview,
    badges: Vec<ModelBadge>,
}

fn decorate(list: Vec<ThreadOverview>) -> Vec<OverviewEntry> {
    list.into_iter()
        .map(|overview| {
            let badges = overview.labels.iter().map(|m| model_badge(m)).collect();
            OverviewEntry { overview, badges }
        })
        .collect()
}

/// GET /api/precomputed
pub async fn list_precomputed(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let list = state.backend.list_precomputed().await?;
    Ok(Json(json!({ "success": true, "data": decorate(list) })))
}

/// GET /api/stored
pub async fn list_stored(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let list = state.backend.stored_list().await?;
    Ok(Json(json!({ "success": true, "data": decorate(list) })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorated_entries_carry_badges() {
        let list = vec![ThreadOverview {
            id: "1".to_string(),
            title: "t".to_string(),
            url: "https://example.com".to_string(),
            num_comments: 2,
            labels: vec!["GPT-4".to_string(), "mystery".to_string()],
        }];
        let decorated = decorate(list);
        assert_eq!(decorated[0].badges.len(), 2);
        assert_eq!(decorated[0].badges[0].color, "#6666c2");
        assert_eq!(decorated[0].badges[1].color, "#ffffff");
    }
}
