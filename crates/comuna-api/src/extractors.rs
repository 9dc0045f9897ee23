//! # Request Body Extraction
//!
//! Handlers accept `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_json`], so malformed bodies surface as the same 400 envelope
//! as any other validation failure instead of axum's plain-text rejection.
//!
//! Business validation does not happen here — that belongs to the command
//! handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use comuna_app::AppError;

use crate::error::ApiError;

/// Unwrap a JSON body, converting a rejection into a validation error.
pub fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError(AppError::bad_request(rejection.body_text()))),
    }
}
