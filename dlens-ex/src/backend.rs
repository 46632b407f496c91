//! Clustering backend client
//!
//! Talks to the external clustering/labeling backend that fetches
//! Reddit threads and computes clusters, labels, and frames. Every
//! endpoint answers with a `{success, ...}` envelope, including the
//! list endpoints, so the response handling is uniform: transport
//! failures map through [`RequestError::from_reqwest`], enveloped
//! bodies decode regardless of HTTP status, and a non-2xx response
//! without an envelope becomes an HTTP error with the backend's
//! `detail` text.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use dlens_common::types::{decode_envelope, FromUrlOptions, ThreadData, ThreadOverview};
use dlens_common::RequestError;

const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Fetching and clustering a fresh thread can take minutes
const FROM_URL_TIMEOUT_SECS: u64 = 600;

/// Client for the clustering backend
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
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

    /// List the precomputed example threads
    pub async fn list_precomputed(&self) -> Result<Vec<ThreadOverview>, RequestError> {
        self.get("/api/list_precomputed").await
    }

    /// Fetch one precomputed thread by id
    pub async fn from_precomputed(&self, id: &str) -> Result<ThreadData, RequestError> {
        self.post("/api/from_precomputed", json!({ "id": id }), None)
            .await
    }

    /// Fetch and cluster a thread from a Reddit URL. The options are
    /// spread into the request body next to the url, matching what the
    /// backend expects.
    pub async fn from_url(
        &self,
        url: &str,
        options: &FromUrlOptions,
    ) -> Result<ThreadData, RequestError> {
        let mut body = serde_json::to_value(options).map_err(|e| RequestError::Application {
            error: "APPLICATION".to_string(),
            message: format!("failed to encode request options: {e}"),
        })?;
        body["url"] = Value::String(url.to_string());
        self.post(
            "/api/from_url",
            body,
            Some(Duration::from_secs(FROM_URL_TIMEOUT_SECS)),
        )
        .await
    }

    /// List previously computed threads stored by the backend
    pub async fn stored_list(&self) -> Result<Vec<ThreadOverview>, RequestError> {
        self.get("/api/stored").await
    }

    /// Fetch one stored thread by id
    pub async fn stored(&self, id: &str) -> Result<ThreadData, RequestError> {
        self.post("/api/stored", json!({ "id": id }), None).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "querying clustering backend");
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(RequestError::from_reqwest)?;
        decode_response(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
        timeout: Option<Duration>,
    ) -> Result<T, RequestError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "querying clustering backend");
        let mut request = self.http_client.post(&url).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(RequestError::from_reqwest)?;
        decode_response(response).await
    }
}

/// Map a backend response to its payload or the matching error kind.
///
/// Enveloped bodies win over the HTTP status: the backend reports
/// application and validation failures inside a 200. Only a non-2xx
/// response without an envelope (proxy errors, FastAPI `detail`
/// bodies) becomes [`RequestError::Http`].
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RequestError> {
    let status = response.status();
    let text = response.text().await.map_err(RequestError::from_reqwest)?;

    if let Ok(body) = serde_json::from_str::<Value>(&text) {
        if body.get("success").is_some() {
            return decode_envelope(body);
        }
        if !status.is_success() {
            let detail = body
                .get("detail")
                .and_then(Value::as_str)
                .unwrap_or(&text)
                .to_string();
            return Err(RequestError::Http {
                code: status.as_u16(),
                detail,
            });
        }
        return serde_json::from_value(body).map_err(|e| RequestError::Application {
            error: "APPLICATION".to_string(),
            message: format!("malformed backend response: {e}"),
        });
    }

    if !status.is_success() {
        return Err(RequestError::Http {
            code: status.as_u16(),
            detail: text,
        });
    }
    Err(RequestError::Application {
        error: "APPLICATION".to_string(),
        message: "backend returned a non-JSON body".to_string(),
    })
}
