//! Common error types for DLENS

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for DLENS operations
pub type Result<T> = std::result::Result<T, Error>;

/// One entry of a backend validation error list: the location of the
/// offending field plus the backend's message for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationItem {
    /// Field location path, e.g. `["body", "url"]`
    pub loc: Vec<serde_json::Value>,
    /// Human-readable message for this field
    pub msg: String,
}

/// Errors raised while talking to an external backend.
///
/// The taxonomy distinguishes transport-level failures (no response at
/// all) from HTTP failures (a status code plus detail) and from
/// application failures (a well-formed `success: false` envelope).
#[derive(Error, Debug)]
pub enum RequestError {
    /// The request was sent but no response was received (network down,
    /// backend offline, connection reset)
    #[error("the request was made but no response was received")]
    Transport,

    /// The request could not be constructed at all
    #[error("setting up the request triggered an error: {0}")]
    Setup(String),

    /// The request exceeded its timeout
    #[error("the request timed out")]
    Timeout,

    /// Non-2xx response with a status code and a detail message
    #[error("{code} {detail}")]
    Http { code: u16, detail: String },

    /// `success: false` envelope from the backend
    #[error("{error}: {message}")]
    Application { error: String, message: String },

    /// `success: false` envelope with a field-level validation report
    #[error("the backend rejected {} field(s)", errors.len())]
    Validation { errors: Vec<ValidationItem> },
}

impl RequestError {
    /// Short machine-readable kind tag, used in error panels
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::Transport => "TRANSPORT",
            RequestError::Setup(_) => "SETUP",
            RequestError::Timeout => "TIMEOUT",
            RequestError::Http { .. } => "HTTP",
            RequestError::Application { .. } => "APPLICATION",
            RequestError::Validation { .. } => "VALIDATION",
        }
    }

    /// Map a reqwest error to the taxonomy.
    ///
    /// Timeout takes precedence (reqwest reports timeouts as request
    /// errors too); builder failures mean the request never left the
    /// process; everything else that produced no response is transport.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::Setup(err.to_string())
        } else {
            RequestError::Transport
        }
    }
}

/// JSON body rendered to the browser when a request fails.
///
/// Mirrors the backend's own error envelope so the UI has a single
/// error-panel code path for local and proxied failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationItem>>,
}

impl From<&RequestError> for ErrorBody {
    fn from(err: &RequestError) -> Self {
        let (message, errors) = match err {
            RequestError::Validation { errors } => (None, Some(errors.clone())),
            RequestError::Application { message, .. } => (Some(message.clone()), None),
            other => (Some(other.to_string()), None),
        };
        ErrorBody {
            success: false,
            error: err.kind().to_string(),
            message,
            errors,
        }
    }
}

/// Common error types across DLENS services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend request error
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_from_application() {
        let err = RequestError::Application {
            error: "APPLICATION".to_string(),
            message: "the reddit client failed".to_string(),
        };
        let body = ErrorBody::from(&err);
        assert!(!body.success);
        assert_eq!(body.error, "APPLICATION");
        assert_eq!(body.message.as_deref(), Some("the reddit client failed"));
        assert!(body.errors.is_none());
    }

    #[test]
    fn test_error_body_from_validation_keeps_all_items() {
        let err = RequestError::Validation {
            errors: vec![
                ValidationItem {
                    loc: vec!["body".into(), "url".into()],
                    msg: "invalid or missing URL scheme".to_string(),
                },
                ValidationItem {
                    loc: vec!["body".into(), "topP".into()],
                    msg: "value is not a valid float".to_string(),
                },
            ],
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.error, "VALIDATION");
        assert_eq!(body.errors.as_ref().map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(RequestError::Transport.kind(), "TRANSPORT");
        assert_eq!(RequestError::Timeout.kind(), "TIMEOUT");
        assert_eq!(
            RequestError::Http {
                code: 404,
                detail: "Not Found".to_string()
            }
            .kind(),
            "HTTP"
        );
    }
}
