//! # Correlation & Error Normalization
//!
//! The outermost request wrapper. It generates the per-request correlation
//! identifier, exposes it as an `x-trace-id` header on every response, and
//! rewrites any error a handler surfaced into the serialized
//! [`ApiErrorResponse`](crate::error::ApiErrorResponse) envelope. Nothing
//! downstream writes error bodies; this is the single translation point.

use axum::extract::{Request, State};
use axum::http::header::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use comuna_app::AppError;

use crate::error::{field_errors, map_error, ApiErrorResponse};
use crate::state::AppState;

/// Per-request correlation identifier, generated when the request enters
/// the pipeline and attached to the request extensions for downstream use.
#[derive(Debug, Clone)]
pub struct TraceId(String);

impl TraceId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wrap the whole pipeline: correlate, run, normalize.
pub async fn envelope_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let trace_id = TraceId::generate();
    request.extensions_mut().insert(trace_id.clone());

    let mut response = next.run(request).await;

    if let Some(error) = response.extensions_mut().remove::<AppError>() {
        response = render(&error, &trace_id, &state);
    }

    // Every response carries the correlation id, success or failure.
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert("x-trace-id", value);
    }
    response
}

/// Build the envelope response for an error, logging it with the
/// correlation identifier. Server-side failures log the full detail even
/// when the client only sees a generic message.
fn render(error: &AppError, trace_id: &TraceId, state: &AppState) -> Response {
    let (status, code, message) = map_error(error, state.config.environment);

    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, code, error = %error, "request failed");
    } else {
        tracing::warn!(trace_id = %trace_id, code, error = %error, "request rejected");
    }

    let body = ApiErrorResponse {
        code: code.to_string(),
        message,
        errors: field_errors(error),
        trace_id: trace_id.to_string(),
    };

    // Json sets the application/json content type.
    (status, Json(body)).into_response()
}
