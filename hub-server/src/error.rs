//! Server error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hub_core::HubError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur running the hub server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

/// A core error on its way to becoming an HTTP response
#[derive(Debug)]
pub struct ApiError(pub HubError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HubError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            HubError::AccessDenied(_) => StatusCode::FORBIDDEN,
            HubError::NotFound | HubError::UnknownReviewFlag(_) => StatusCode::NOT_FOUND,
            HubError::Validation(_) | HubError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            HubError::BackendUnavailable(_) | HubError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<HubError> for ApiError {
    fn from(error: HubError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: self.0.code().to_string(),
            }),
        )
            .into_response()
    }
}
