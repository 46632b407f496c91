//! Annotation backend client
//!
//! The annotation backend speaks a small snake_case API: `GET
//! /api/{user}` for examples plus saved rankings, `POST
//! /api/{user}/{example}` to store one ranking update. Failures come
//! back as `{success: false, reason, instance}` with HTTP 200; those
//! are passed through to the caller, not mapped into errors, because
//! the UI displays the reason verbatim.

use std::time::Duration;

use serde_json::Value;

use dlens_common::types::{AnnotationData, AnnotationReply, UpdateRanking};
use dlens_common::RequestError;

const REQUEST_TIMEOUT_SECS: u64 = 3;

/// Client for the annotation backend
pub struct AnnotationClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// Reply of `GET /api/{user}`: either the payload or the backend's
/// refusal (e.g. `UNKNOWN USER`)
#[derive(Debug)]
pub enum ExamplesReply {
    Data(AnnotationData),
    Refused { reason: String },
}

impl AnnotationClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(RequestError::from_reqwest)?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all examples and the user's saved rankings
    pub async fn get_examples(&self, user: &str) -> Result<ExamplesReply, RequestError> {
        let body = self.request_json(&format!("/api/{user}"), None).await?;
        if body["success"] == Value::Bool(true) {
            let data: AnnotationData =
                serde_json::from_value(body["data"].clone()).map_err(|e| {
                    RequestError::Application {
                        error: "APPLICATION".to_string(),
                        message: format!("malformed annotation response: {e}"),
                    }
                })?;
            Ok(ExamplesReply::Data(data))
        } else {
            Ok(ExamplesReply::Refused {
                reason: body["reason"].as_str().unwrap_or("UNKNOWN").to_string(),
            })
        }
    }

    /// Store one ranking update; the backend's reply (including
    /// consistency refusals) is returned as-is
    pub async fn update_ranking(
        &self,
        user: &str,
        example: &str,
        update: &UpdateRanking,
    ) -> Result<AnnotationReply, RequestError> {
        let body = serde_json::to_value(update).map_err(|e| RequestError::Application {
            error: "APPLICATION".to_string(),
            message: format!("failed to encode ranking update: {e}"),
        })?;
        let reply = self
            .request_json(&format!("/api/{user}/{example}"), Some(body))
            .await?;
        serde_json::from_value(reply).map_err(|e| RequestError::Application {
            error: "APPLICATION".to_string(),
            message: format!("malformed annotation response: {e}"),
        })
    }

    async fn request_json(&self, path: &str, body: Option<Value>) -> Result<Value, RequestError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "querying annotation backend");
        let request = match body {
            Some(body) => self.http_client.post(&url).json(&body),
            None => self.http_client.get(&url),
        };
        let response = request.send().await.map_err(RequestError::from_reqwest)?;
        let status = response.status();
        let text = response.text().await.map_err(RequestError::from_reqwest)?;
        if !status.is_success() {
            return Err(RequestError::Http {
                code: status.as_u16(),
                detail: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| RequestError::Application {
            error: "APPLICATION".to_string(),
            message: format!("annotation backend returned a non-JSON body: {e}"),
        })
    }
}
