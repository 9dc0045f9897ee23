//! # Group API
//!
//! Resident group creation and retrieval.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use comuna_app::handlers::groups::CreateGroupCommand;
use comuna_app::AppError;
use comuna_core::Group;

use crate::error::ApiError;
use crate::extractors::extract_json;
use crate::routes::CreatedResponse;
use crate::state::AppState;

/// Request to create a resident group.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A group resource as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: *group.id.as_uuid(),
            name: group.name,
            description: group.description,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// Build the groups router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/groups", post(create_group).get(list_groups))
        .route("/v1/groups/:id", get(get_group))
}

/// POST /v1/groups — Create a resident group.
#[utoipa::path(
    post,
    path = "/v1/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = CreatedResponse,
         headers(("Location" = String, description = "URL of the new group"))),
        (status = 400, description = "Validation failure", body = crate::error::ApiErrorResponse),
    ),
    tag = "groups"
)]
async fn create_group(
    State(state): State<AppState>,
    body: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CreatedResponse>), ApiError> {
    let req = extract_json(body)?;

    let id = state
        .mediator
        .send(CreateGroupCommand {
            name: req.name,
            description: req.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/groups/{id}"))],
        Json(CreatedResponse { id: *id.as_uuid() }),
    ))
}

/// GET /v1/groups/:id — Fetch one group.
#[utoipa::path(
    get,
    path = "/v1/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group found", body = GroupResponse),
        (status = 404, description = "Not found", body = crate::error::ApiErrorResponse),
    ),
    tag = "groups"
)]
async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupResponse>, ApiError> {
    let uow = state.store.begin();
    let group = uow
        .groups()
        .get(id.into())
        .await?
        .ok_or_else(|| AppError::not_found(format!("group {id} not found")))?;
    Ok(Json(group.into()))
}

/// GET /v1/groups — List all groups, newest first.
#[utoipa::path(
    get,
    path = "/v1/groups",
    responses(
        (status = 200, description = "Groups listed", body = [GroupResponse]),
    ),
    tag = "groups"
)]
async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let uow = state.store.begin();
    let groups = uow.groups().list().await?;
    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::middleware::envelope::envelope_middleware;

    /// Helper: groups router with a fresh in-memory state and the envelope
    /// middleware layered, as in the full application.
    fn test_app() -> (Router, AppState) {
        let state = AppState::new();
        let app = router()
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                envelope_middleware,
            ))
            .with_state(state.clone());
        (app, state)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_group_returns_201_with_location() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/v1/groups")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"name":"Block A","description":"Ground floor"}"#,
            ))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let location = resp
            .headers()
            .get("location")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let created: CreatedResponse = body_json(resp).await;
        assert_eq!(location, format!("/v1/groups/{}", created.id));
    }

    #[tokio::test]
    async fn create_group_empty_name_returns_400_envelope() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/v1/groups")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":""}"#))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: crate::error::ApiErrorResponse = body_json(resp).await;
        assert_eq!(body.code, "BAD_REQUEST");
        assert_eq!(body.message, "Group name cannot be empty");
        assert!(!body.trace_id.is_empty());
    }

    #[tokio::test]
    async fn create_group_bad_json_returns_400() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/v1/groups")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: crate::error::ApiErrorResponse = body_json(resp).await;
        assert_eq!(body.code, "BAD_REQUEST");
    }

    #[tokio::test]
    async fn get_group_not_found_returns_404_generic_message() {
        let (app, _) = test_app();
        let id = Uuid::new_v4();
        let req = Request::builder()
            .uri(format!("/v1/groups/{id}"))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: crate::error::ApiErrorResponse = body_json(resp).await;
        assert_eq!(body.code, "NOT_FOUND");
        assert!(!body.message.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let (app, _) = test_app();
        let create = Request::builder()
            .method("POST")
            .uri("/v1/groups")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Gardeners"}"#))
            .unwrap();
        let created: CreatedResponse = body_json(app.clone().oneshot(create).await.unwrap()).await;

        let get = Request::builder()
            .uri(format!("/v1/groups/{}", created.id))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(get).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let group: GroupResponse = body_json(resp).await;
        assert_eq!(group.id, created.id);
        assert_eq!(group.name, "Gardeners");
    }

    #[tokio::test]
    async fn list_groups_returns_created_groups() {
        let (app, _) = test_app();
        for name in ["One", "Two"] {
            let req = Request::builder()
                .method("POST")
                .uri("/v1/groups")
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"name":"{name}"}}"#)))
                .unwrap();
            assert_eq!(
                app.clone().oneshot(req).await.unwrap().status(),
                StatusCode::CREATED
            );
        }

        let resp = app
            .oneshot(Request::builder().uri("/v1/groups").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let groups: Vec<GroupResponse> = body_json(resp).await;
        assert_eq!(groups.len(), 2);
    }
}
