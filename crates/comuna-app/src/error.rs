//! # Application Error Taxonomy
//!
//! The error kinds handlers and repositories raise. Handlers raise the most
//! specific kind possible and never catch and swallow; the API layer is the
//! single point of translation to transport responses.

use thiserror::Error;

use comuna_core::{AnnouncementError, ValidationError};

/// Application-level error taxonomy.
///
/// `Clone` so the API middleware can carry the error through response
/// extensions when building the envelope.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Bad input (400). Carries the field-level detail from the domain.
    #[error("{0}")]
    Validation(ValidationError),

    /// Operation invalid in the aggregate's current state (400).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authorized for this operation (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict with an existing resource (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence failure (500). Detail is logged; clients only see it in
    /// development mode.
    #[error("database error: {0}")]
    Database(String),

    /// Anything unclassified (500). Same disclosure policy as `Database`.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Explicit bad-request return for route-level control flow.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(message))
    }

    /// Explicit not-found return.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Explicit conflict return.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<AnnouncementError> for AppError {
    fn from(err: AnnouncementError) -> Self {
        match &err {
            AnnouncementError::AlreadyPublished { .. } => Self::InvalidOperation(err.to_string()),
        }
    }
}
