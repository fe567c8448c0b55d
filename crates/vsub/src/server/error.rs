//! Error-to-HTTP response conversion for the proxy routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::VsubError;

/// Error body returned by every route: `{ "error": "<message>" }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Upstream failures stay in the 4xx range; only local I/O is a 500.
fn status_for(error: &VsubError) -> StatusCode {
    match error {
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        e if e.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
        VsubError::Status { status, .. } if *status == StatusCode::NOT_FOUND => *status,
        VsubError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl From<VsubError> for ApiError {
    fn from(error: VsubError) -> Self {
        Self {
            status: status_for(&error),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "handler failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.message, "request rejected");
        }

        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
