//! HTTP handlers and the shared error-to-response mapping.

pub mod analyze;
pub mod chat;
pub mod clips;
pub mod extract;
pub mod feedback;
pub mod health;
pub mod style_guide;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Route-level error: a status code plus a message serialized as
/// `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "api.error");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "api.rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<quill_common::QuillError> for ApiError {
    fn from(e: quill_common::QuillError) -> Self {
        Self::internal(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// LLM-backed routes need a configured provider; everything else works
/// without one.
pub(crate) fn require_llm(
    state: &crate::AppState,
) -> ApiResult<&std::sync::Arc<dyn quill_llm::traits::LlmClient + Send + Sync>> {
    state
        .llm
        .as_ref()
        .ok_or_else(|| ApiError::internal("No LLM configured"))
}
