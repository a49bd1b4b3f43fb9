//! Response mapping.
//!
//! Every status code the API returns is decided here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::form::{FailureKind, Rejection, SubmissionReply};
use crate::store::StoreError;

// =============================================================================
// Form Response
// =============================================================================

/// Status code for a rejected submission.
///
/// - a structural edit or single-field validation is a normal re-render:
///   `200 OK`
/// - a plain save with field errors: `422 Unprocessable Entity`
/// - an unreadable intent: `400 Bad Request`
/// - a valid form the store could not take: `503 Service Unavailable`
#[must_use]
pub const fn status_for(rejection: &Rejection) -> StatusCode {
    match rejection.kind {
        FailureKind::PendingEdit => StatusCode::OK,
        FailureKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::MalformedIntent => StatusCode::BAD_REQUEST,
        FailureKind::StoreFailure => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// A submission reply with its status code.
#[derive(Debug, Clone)]
pub struct FormResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Reply body.
    pub reply: SubmissionReply,
}

impl FormResponse {
    /// Creates a `200 OK` response.
    #[must_use]
    pub const fn ok(reply: SubmissionReply) -> Self {
        Self {
            status: StatusCode::OK,
            reply,
        }
    }

    /// Creates the response for a rejected submission.
    #[must_use]
    pub fn rejected(rejection: &Rejection) -> Self {
        Self {
            status: status_for(rejection),
            reply: rejection.to_reply(),
        }
    }
}

impl IntoResponse for FormResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.reply)).into_response()
    }
}

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 503 Service Unavailable response.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("STORE_UNAVAILABLE", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<StoreError> for ApiErrorResponse {
    fn from(error: StoreError) -> Self {
        tracing::error!(%error, "todo store failed");
        Self::unavailable("The todo list is currently unavailable")
    }
}
