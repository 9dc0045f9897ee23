//! # Error Envelope
//!
//! The uniform JSON error shape every failed request returns, plus the pure
//! mapping from the application error taxonomy to `(status, code, message)`.
//! Handlers return [`ApiError`]; the envelope middleware is the single point
//! where errors become transport responses, so no handler carries its own
//! status-mapping code.
//!
//! Message disclosure is environment-gated: database and internal detail is
//! returned only in development, never in production.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use comuna_app::AppError;

use crate::state::Environment;

/// Structured JSON error response body.
///
/// All error responses use this format, whether the failure was raised by a
/// handler or returned explicitly. Field names are camelCase on the wire.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Stable machine-readable code (e.g. "NOT_FOUND") clients can branch on.
    pub code: String,
    /// Human-readable message, safe to display.
    pub message: String,
    /// Per-field validation messages, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    /// Correlation identifier tying this response to the server logs.
    pub trace_id: String,
}

/// Map an application error to its HTTP status, stable code, and the message
/// the client is allowed to see.
///
/// Pure function of the error and the injected environment flag — no ambient
/// global state is consulted.
pub fn map_error(error: &AppError, env: Environment) -> (StatusCode, &'static str, String) {
    match error {
        AppError::Validation(inner) => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", inner.message.clone())
        }
        AppError::InvalidOperation(msg) => {
            (StatusCode::BAD_REQUEST, "INVALID_OPERATION", msg.clone())
        }
        AppError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "The requested resource was not found".to_string(),
        ),
        AppError::Unauthorized(_) => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "You are not authorized to perform this operation".to_string(),
        ),
        AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        AppError::Database(detail) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            if env.is_development() {
                detail.clone()
            } else {
                "A database error occurred".to_string()
            },
        ),
        AppError::Internal(detail) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            if env.is_development() {
                detail.clone()
            } else {
                "An internal error occurred".to_string()
            },
        ),
    }
}

/// Field-level validation detail, when the error carries any.
pub fn field_errors(error: &AppError) -> Option<BTreeMap<String, Vec<String>>> {
    match error {
        AppError::Validation(inner) if !inner.fields.is_empty() => Some(inner.fields.clone()),
        _ => None,
    }
}

/// Handler-level error carrier.
///
/// `IntoResponse` only sets the status and stashes the [`AppError`] in the
/// response extensions; the envelope middleware reads it back, logs it with
/// the correlation identifier, and writes the [`ApiErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The status must be correct even if a caller bypasses the
        // middleware; message policy is applied there.
        let (status, _, _) = map_error(&self.0, Environment::Production);
        let mut response = status.into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}
