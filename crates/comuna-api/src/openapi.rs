//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Comuna API — Residential Community Backend",
        version = "0.1.0",
        description = "Backend API for residential community management.\n\nProvides:\n- **Resident groups** — creation and lookup of the groups announcements are addressed to\n- **Announcements** — draft creation, one-way publishing, and per-group listing\n\nEvery error response carries a uniform envelope (`code`, `message`, optional `errors` field map, `traceId`) and the `x-trace-id` header for correlation with server logs.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::groups::create_group,
        crate::routes::groups::get_group,
        crate::routes::groups::list_groups,
        crate::routes::announcements::create_announcement,
        crate::routes::announcements::get_announcement,
        crate::routes::announcements::publish_announcement,
        crate::routes::announcements::list_for_group,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::routes::CreatedResponse,
            crate::routes::groups::CreateGroupRequest,
            crate::routes::groups::GroupResponse,
            crate::routes::announcements::CreateAnnouncementRequest,
            crate::routes::announcements::AnnouncementResponse,
        ),
    ),
    tags(
        (name = "groups", description = "Resident groups — the audience an announcement is addressed to"),
        (name = "announcements", description = "Community announcements — draft, publish, and per-group listing"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
