//! Error types for hub-core

use thiserror::Error;
use uuid::Uuid;

use crate::review::ReviewStatus;

/// Top-level error type for hub-core
///
/// Document reads never surface `AccessDenied`: a denied read is reported as
/// [`HubError::NotFound`] so callers cannot discover documents they may not see.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("document not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid review transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: ReviewStatus,
        to: ReviewStatus,
    },

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("review flag not found: {0}")]
    UnknownReviewFlag(Uuid),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HubError {
    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::UnknownReviewFlag(_) => "UNKNOWN_REVIEW_FLAG",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type HubResult<T> = Result<T, HubError>;
