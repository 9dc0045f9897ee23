//! # comuna-api — Axum HTTP Surface for the Comuna Backend
//!
//! The HTTP edge of the residential community platform. Route handlers
//! translate requests into commands, dispatch them through the
//! [`comuna_app::Mediator`], and return plain resource representations.
//! All error shaping happens in one place: the envelope middleware.
//!
//! ## API Surface
//!
//! | Prefix                         | Module                     | Domain        |
//! |--------------------------------|----------------------------|---------------|
//! | `/v1/groups/*`                 | [`routes::groups`]         | Resident groups |
//! | `/v1/announcements/*`          | [`routes::announcements`]  | Announcements |
//! | `/v1/groups/{id}/announcements`| [`routes::announcements`]  | Per-group feed |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → EnvelopeMiddleware → MetricsMiddleware → Handler
//! ```
//!
//! The envelope middleware sits outside the handlers so that every error,
//! regardless of which layer raised it, leaves the service as the same
//! `{code, message, errors?, traceId}` body with an `x-trace-id` header.
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use comuna_app::AppError;

use crate::error::ApiError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the
/// envelope middleware; their plain-text bodies are consumed by orchestrators
/// and scrapers, not API clients.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    // API routes.
    //
    // Body size limit: 1 MiB. Announcement bodies are capped well below
    // this at the domain layer; the limit guards against oversized payloads
    // reaching deserialization at all.
    let api = Router::new()
        .merge(routes::groups::router())
        .merge(routes::announcements::router())
        .merge(openapi::router())
        .fallback(unknown_route);

    let mut api = api.layer(DefaultBodyLimit::max(1024 * 1024));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(from_fn_with_state(
            state.clone(),
            middleware::envelope::envelope_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Operational endpoints, outside the envelope.
    let mut operational = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        operational = operational
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let operational = operational.with_state(state);

    Router::new().merge(operational).merge(api)
}

/// Fallback for unmatched paths, so even a bad URL yields the envelope.
async fn unknown_route() -> ApiError {
    ApiError(AppError::not_found("Resource not found"))
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Updates domain gauges on each scrape (pull model), then gathers and
/// encodes all metrics in Prometheus text exposition format. Against
/// Postgres the counts come from aggregate queries; the in-memory store
/// is walked directly.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    match &state.db_pool {
        Some(pool) => {
            match db::groups::count(pool).await {
                Ok(count) => metrics.groups_total().set(count as f64),
                Err(e) => tracing::warn!(error = %e, "metrics scrape: group count unavailable"),
            }
            match db::announcements::count_by_status(pool).await {
                Ok(counts) => {
                    metrics.announcements_total().reset();
                    for (status, count) in &counts {
                        metrics
                            .announcements_total()
                            .with_label_values(&[status.as_str()])
                            .set(*count as f64);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "metrics scrape: announcement count unavailable")
                }
            }
        }
        None => update_gauges_from_store(&state, &metrics).await,
    }

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Set the domain gauges by walking the in-memory store.
async fn update_gauges_from_store(state: &AppState, metrics: &ApiMetrics) {
    let scope = state.store.begin();
    let groups = match scope.groups().list().await {
        Ok(groups) => groups,
        Err(e) => {
            tracing::warn!(error = %e, "metrics scrape: group count unavailable");
            return;
        }
    };
    metrics.groups_total().set(groups.len() as f64);

    let mut draft = 0usize;
    let mut published = 0usize;
    for group in &groups {
        match scope.announcements().list_for_group(group.id).await {
            Ok(announcements) => {
                for a in &announcements {
                    match a.status {
                        comuna_core::AnnouncementStatus::Draft => draft += 1,
                        comuna_core::AnnouncementStatus::Published => published += 1,
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "metrics scrape: announcement count unavailable");
                return;
            }
        }
    }
    metrics.announcements_total().reset();
    metrics
        .announcements_total()
        .with_label_values(&["draft"])
        .set(draft as f64);
    metrics
        .announcements_total()
        .with_label_values(&["published"])
        .set(published as f64);
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks that the store answers a read and that the database connection
/// is healthy when configured. Returns 200 "ready" or 503 with a
/// diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.store.begin().groups().list().await {
        tracing::warn!("Store health check failed: {e}");
        return (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response();
    }

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
