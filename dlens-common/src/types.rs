//! Backend REST contract types
//!
//! Types mirroring the JSON produced by the two external backends:
//! the clustering/labeling backend (thread envelopes, overview lists)
//! and the annotation backend (examples + rankings).
//!
//! The clustering backend camelizes its payloads, so those types carry
//! `#[serde(rename_all = "camelCase")]`. The annotation backend uses
//! snake_case and is left as-is.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RequestError, ValidationItem};

// ========================================
// Thread envelope
// ========================================

/// One node of the discussion tree. `name` is unique within a thread
/// and stable across requests for the same discussion; it keys into
/// [`ThreadData::result`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub is_submitter: bool,
}

/// Cluster assignment of a single sentence.
///
/// `true_value >= 0` is a real cluster id, `-1` means unclustered,
/// `-2` means noise (rendered struck through, excluded from clusters).
/// `value` is the pre-noise-collapse assignment kept for the minimap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterValue {
    pub value: i64,
    pub true_value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// One sentence of a discussion node: the atomic unit of clustering.
///
/// `x`/`y` are the 2D projection used by the scatter view; noise
/// sentences do not carry them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceElement {
    pub text: Vec<String>,
    pub cluster: ClusterValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Per-model generation metadata attached to labels and frames:
/// model name -> setting name -> value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadMeta {
    #[serde(default)]
    pub labels: HashMap<String, HashMap<String, Value>>,
    #[serde(default)]
    pub frames: HashMap<String, HashMap<String, Value>>,
}

/// Full thread payload from the clustering backend.
///
/// `labels`: model name -> cluster id (stringified) -> label.
/// `frames`: model name -> cluster id -> ranked frame categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadData {
    pub url: String,
    pub title: String,
    pub num_comments: i64,
    pub root: Comment,
    #[serde(default)]
    pub cluster_model: Option<String>,
    pub result: HashMap<String, Vec<SentenceElement>>,
    #[serde(default)]
    pub labels: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub frames: Option<HashMap<String, HashMap<String, Vec<String>>>>,
    #[serde(default)]
    pub meta: ThreadMeta,
}

/// Entry of `GET /api/list_precomputed` and `GET /api/stored`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadOverview {
    pub id: String,
    pub title: String,
    pub url: String,
    pub num_comments: i64,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Options forwarded to `POST /api/from_url`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromUrlOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens_per_cluster: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_label_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_frame_instruction: Option<String>,
}

// ========================================
// Envelope decoding
// ========================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct RawEnvelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<ValidationItem>>,
}

/// Decode a `{success, ...}` envelope into its payload.
///
/// A `success: false` body maps to [`RequestError::Validation`] when
/// the backend reports `error: "VALIDATION"`, otherwise to
/// [`RequestError::Application`]. A `success: true` body without
/// `data` is malformed and reported as an application error.
pub fn decode_envelope<T: DeserializeOwned>(body: Value) -> Result<T, RequestError> {
    let raw: RawEnvelope<T> = serde_json::from_value(body).map_err(|e| {
        RequestError::Application {
            error: "APPLICATION".to_string(),
            message: format!("malformed backend response: {e}"),
        }
    })?;
    if raw.success {
        raw.data.ok_or_else(|| RequestError::Application {
            error: "APPLICATION".to_string(),
            message: "backend reported success without data".to_string(),
        })
    } else {
        let error = raw.error.unwrap_or_else(|| "APPLICATION".to_string());
        if error == "VALIDATION" {
            Err(RequestError::Validation {
                errors: raw.errors.unwrap_or_default(),
            })
        } else {
            Err(RequestError::Application {
                error,
                message: raw.message.unwrap_or_default(),
            })
        }
    }
}

// ========================================
// Annotation backend
// ========================================

/// One ranking example: candidate summary phrases keyed by a stable
/// key, plus whatever extra fields the backend attaches (reference,
/// document, color indexes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleData {
    pub hypotheses: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Payload of `GET /api/{user}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationData {
    pub examples: HashMap<String, ExampleData>,
    pub rankings: HashMap<String, Vec<String>>,
}

/// Body of `POST /api/{user}/{example}`: the full before/after state
/// so the backend can reject stale or inconsistent updates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateRanking {
    pub previous_unranked: Vec<String>,
    pub previous_ranking: Vec<String>,
    pub next_unranked: Vec<String>,
    pub next_ranking: Vec<String>,
}

/// Reply of the annotation backend's write endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}
