//! Error-to-response mapping
//!
//! Every failing handler answers with the same `{success: false,
//! error, message?, errors?}` body the clustering backend uses, so the
//! browser has one error-panel code path for local and proxied
//! failures. The HTTP status distinguishes where the failure happened.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use dlens_common::error::{Error, ErrorBody, RequestError};

/// Newtype making service errors usable as handler return values
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
        let (status, body) = match &self.0 {
            Error::Request(req) => (request_status(req), ErrorBody::from(req)),
            Error::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    success: false,
                    error: "NOT_FOUND".to_string(),
                    message: Some(message.clone()),
                    errors: None,
                },
            ),
            Error::InvalidInput(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    success: false,
                    error: "INVALID_INPUT".to_string(),
                    message: Some(message.clone()),
                    errors: None,
                },
            ),
            other => {
                tracing::error!(error = %other, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        success: false,
                        error: "INTERNAL".to_string(),
                        message: Some(other.to_string()),
                        errors: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Status for a failed backend request. Enveloped backend failures map
/// to gateway statuses; the original status is kept when the backend
/// answered with a plain HTTP error.
fn request_status(err: &RequestError) -> StatusCode {
    match err {
        RequestError::Transport => StatusCode::BAD_GATEWAY,
        RequestError::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RequestError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        RequestError::Http { code, .. } => {
            StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        RequestError::Application { .. } => StatusCode::BAD_GATEWAY,
        RequestError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_unprocessable() {
        let err = RequestError::Validation { errors: vec![] };
        assert_eq!(request_status(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_http_status_is_preserved() {
        let err = RequestError::Http {
            code: 404,
            detail: "User not found".to_string(),
        };
        assert_eq!(request_status(&err), StatusCode::NOT_FOUND);
        let err = RequestError::Http {
            code: 999,
            detail: "bogus".to_string(),
        };
        assert_eq!(request_status(&err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        assert_eq!(request_status(&RequestError::Timeout), StatusCode::GATEWAY_TIMEOUT);
    }
}
