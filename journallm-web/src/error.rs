//! Error types for journallm-web
//!
//! Every handler error renders as `{"error": "<message>"}` with the
//! matching HTTP status, which is what the upload page displays.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Request body over the upload limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Pipeline error, mapped by kind
    #[error(transparent)]
    Common(#[from] journallm_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use journallm_common::Error as E;

        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Common(err) => match err {
                E::UnsupportedFormat(_) | E::MalformedInput { .. } | E::MissingCredential => {
                    StatusCode::BAD_REQUEST
                }
                E::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                E::GenerationServiceFailure(_) | E::TransportFailure(_) => StatusCode::BAD_GATEWAY,
                E::Io(_) | E::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
