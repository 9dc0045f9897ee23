//! # Announcement API
//!
//! Drafting, publishing, and reading community announcements.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use comuna_app::handlers::announcements::{
    CreateAnnouncementCommand, PublishAnnouncementCommand,
};
use comuna_app::AppError;
use comuna_core::Announcement;

use crate::error::ApiError;
use crate::extractors::extract_json;
use crate::routes::CreatedResponse;
use crate::state::AppState;

/// Request to create a draft announcement.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub group_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// An announcement resource as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub body: String,
    pub status: String,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(announcement: Announcement) -> Self {
        Self {
            id: *announcement.id.as_uuid(),
            group_id: *announcement.group_id.as_uuid(),
            title: announcement.title,
            body: announcement.body,
            status: announcement.status.as_str().to_string(),
            published_at: announcement.published_at,
            created_at: announcement.created_at,
            updated_at: announcement.updated_at,
        }
    }
}

/// Build the announcements router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/announcements", post(create_announcement))
        .route("/v1/announcements/:id", get(get_announcement))
        .route("/v1/announcements/:id/publish", post(publish_announcement))
        .route("/v1/groups/:id/announcements", get(list_for_group))
}

/// POST /v1/announcements — Create a draft announcement.
#[utoipa::path(
    post,
    path = "/v1/announcements",
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created", body = CreatedResponse,
         headers(("Location" = String, description = "URL of the new announcement"))),
        (status = 400, description = "Validation failure", body = crate::error::ApiErrorResponse),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorResponse),
    ),
    tag = "announcements"
)]
async fn create_announcement(
    State(state): State<AppState>,
    body: Result<Json<CreateAnnouncementRequest>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CreatedResponse>), ApiError> {
    let req = extract_json(body)?;

    let id = state
        .mediator
        .send(CreateAnnouncementCommand {
            group_id: req.group_id.into(),
            title: req.title,
            body: req.body,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/announcements/{id}"))],
        Json(CreatedResponse { id: *id.as_uuid() }),
    ))
}

/// GET /v1/announcements/:id — Fetch one announcement.
#[utoipa::path(
    get,
    path = "/v1/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement found", body = AnnouncementResponse),
        (status = 404, description = "Not found", body = crate::error::ApiErrorResponse),
    ),
    tag = "announcements"
)]
async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnnouncementResponse>, ApiError> {
    let uow = state.store.begin();
    let announcement = uow
        .announcements()
        .get(id.into())
        .await?
        .ok_or_else(|| AppError::not_found(format!("announcement {id} not found")))?;
    Ok(Json(announcement.into()))
}

/// POST /v1/announcements/:id/publish — Publish a draft announcement.
#[utoipa::path(
    post,
    path = "/v1/announcements/{id}/publish",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement published", body = AnnouncementResponse),
        (status = 400, description = "Already published", body = crate::error::ApiErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ApiErrorResponse),
    ),
    tag = "announcements"
)]
async fn publish_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnnouncementResponse>, ApiError> {
    state
        .mediator
        .send(PublishAnnouncementCommand { id: id.into() })
        .await?;

    // Re-read so the client sees the committed state.
    let uow = state.store.begin();
    let announcement = uow
        .announcements()
        .get(id.into())
        .await?
        .ok_or_else(|| AppError::not_found(format!("announcement {id} not found")))?;
    Ok(Json(announcement.into()))
}

/// GET /v1/groups/:id/announcements — List a group's announcements.
#[utoipa::path(
    get,
    path = "/v1/groups/{id}/announcements",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Announcements listed", body = [AnnouncementResponse]),
    ),
    tag = "announcements"
)]
async fn list_for_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let uow = state.store.begin();
    let announcements = uow.announcements().list_for_group(id.into()).await?;
    Ok(Json(announcements.into_iter().map(Into::into).collect()))
}
