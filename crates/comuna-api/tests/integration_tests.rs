//! # Integration Tests for comuna-api
//!
//! Exercises the full router end to end: group and announcement flows,
//! error envelope normalization, trace correlation, health probes,
//! metrics scrape, and OpenAPI spec serving.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use comuna_api::state::{AppConfig, AppState, Environment};

/// Helper: build the test app on the in-memory store.
fn test_app() -> axum::Router {
    comuna_api::app(AppState::new())
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create_group(app: &axum::Router, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/v1/groups", json!({"name": name})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Group Flow ---------------------------------------------------------------

#[tokio::test]
async fn test_create_group_returns_201_with_location_and_id() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/groups",
            json!({"name": "Tower B", "description": "Second tower residents"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    let id = body["id"].as_str().unwrap();
    assert_eq!(location, format!("/v1/groups/{id}"));
}

#[tokio::test]
async fn test_created_groups_have_distinct_ids() {
    let app = test_app();
    let first = create_group(&app, "Tower A").await;
    let second = create_group(&app, "Tower B").await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_create_then_get_group() {
    let app = test_app();
    let id = create_group(&app, "Tower C").await;
    let response = app
        .oneshot(get(&format!("/v1/groups/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Tower C");
    assert_eq!(body["id"], Value::String(id));
}

// -- Error Envelope -----------------------------------------------------------

#[tokio::test]
async fn test_empty_group_name_yields_validation_envelope() {
    let app = test_app();
    let response = app
        .oneshot(post_json("/v1/groups", json!({"name": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["message"], "Group name cannot be empty");
    assert_eq!(body["errors"]["name"][0], "Group name cannot be empty");
    assert!(body["traceId"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_group_yields_generic_not_found_envelope() {
    let app = test_app();
    let response = app
        .oneshot(get("/v1/groups/5f0c9a9e-8a9b-4c6d-9a2b-1f2e3d4c5b6a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "The requested resource was not found");
    // The missing identifier is never echoed back.
    assert!(!body["message"].as_str().unwrap().contains("5f0c9a9e"));
}

#[tokio::test]
async fn test_malformed_json_yields_envelope() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/groups")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["traceId"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_route_yields_not_found_envelope() {
    let app = test_app();
    let response = app.oneshot(get("/v1/no-such-resource")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

// -- Trace Correlation --------------------------------------------------------

#[tokio::test]
async fn test_trace_id_header_present_on_success() {
    let app = test_app();
    let response = app.oneshot(get("/v1/groups")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-trace-id").is_some());
}

#[tokio::test]
async fn test_trace_id_header_matches_envelope_body() {
    let app = test_app();
    let response = app
        .oneshot(post_json("/v1/groups", json!({"name": ""})))
        .await
        .unwrap();
    let header_value = response
        .headers()
        .get("x-trace-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    assert_eq!(body["traceId"], Value::String(header_value));
}

#[tokio::test]
async fn test_trace_ids_differ_between_requests() {
    let app = test_app();
    let first = app.clone().oneshot(get("/v1/groups")).await.unwrap();
    let second = app.oneshot(get("/v1/groups")).await.unwrap();
    assert_ne!(
        first.headers().get("x-trace-id").unwrap(),
        second.headers().get("x-trace-id").unwrap()
    );
}

// -- Announcement Flow --------------------------------------------------------

#[tokio::test]
async fn test_announcement_lifecycle() {
    let app = test_app();
    let group_id = create_group(&app, "Tower D").await;

    // Create a draft.
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/announcements",
            json!({
                "groupId": group_id,
                "title": "Pool maintenance",
                "body": "The pool closes next Monday."
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let ann_id = body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Draft status before publishing.
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/announcements/{ann_id}")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "draft");
    assert!(body["publishedAt"].is_null());

    // Publish.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/announcements/{ann_id}/publish"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "published");
    assert!(body["publishedAt"].is_string());

    // It now shows up in the group's feed.
    let response = app
        .oneshot(get(&format!("/v1/groups/{group_id}/announcements")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], Value::String(ann_id));
}

#[tokio::test]
async fn test_publish_twice_yields_invalid_operation_envelope() {
    let app = test_app();
    let group_id = create_group(&app, "Tower E").await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/announcements",
            json!({"groupId": group_id, "title": "Notice", "body": "text"}),
        ))
        .await
        .unwrap();
    let ann_id = body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let publish = || {
        Request::builder()
            .method("POST")
            .uri(format!("/v1/announcements/{ann_id}/publish"))
            .body(Body::empty())
            .unwrap()
    };
    let first = app.clone().oneshot(publish()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(publish()).await.unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = body_json(second).await;
    assert_eq!(body["code"], "INVALID_OPERATION");
    assert!(body["message"].as_str().unwrap().contains("already published"));
}

#[tokio::test]
async fn test_announcement_for_unknown_group_yields_404() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/announcements",
            json!({
                "groupId": "5f0c9a9e-8a9b-4c6d-9a2b-1f2e3d4c5b6a",
                "title": "Orphan",
                "body": "No group"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// -- Environment Gating -------------------------------------------------------
//
// A custom route raising a database error, wrapped in the real envelope
// middleware, shows the detail in development and redacts it in production.

fn failing_app(environment: Environment) -> axum::Router {
    use axum::middleware::from_fn_with_state;
    use comuna_api::error::ApiError;

    let config = AppConfig {
        port: 8080,
        environment,
        metrics_enabled: false,
    };
    let state = AppState::with_config(config, None);
    axum::Router::new()
        .route(
            "/boom",
            axum::routing::get(|| async {
                Err::<(), ApiError>(ApiError(comuna_app::AppError::Database(
                    "connection refused at db:5432".to_string(),
                )))
            }),
        )
        .layer(from_fn_with_state(
            state.clone(),
            comuna_api::middleware::envelope::envelope_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_database_detail_redacted_in_production() {
    let response = failing_app(Environment::Production)
        .oneshot(get("/boom"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "DATABASE_ERROR");
    assert_eq!(body["message"], "A database error occurred");
}

#[tokio::test]
async fn test_database_detail_visible_in_development() {
    let response = failing_app(Environment::Development)
        .oneshot(get("/boom"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "DATABASE_ERROR");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_scrape_reports_domain_gauges() {
    let app = test_app();
    let group_id = create_group(&app, "Tower F").await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/announcements",
            json!({"groupId": group_id, "title": "Notice", "body": "text"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("comuna_groups_total 1"));
    assert!(body.contains("comuna_announcements_total{status=\"draft\"} 1"));
    assert!(body.contains("comuna_http_requests_total"));
}

#[tokio::test]
async fn test_metrics_endpoint_absent_when_disabled() {
    let config = AppConfig {
        port: 8080,
        environment: Environment::Production,
        metrics_enabled: false,
    };
    let app = comuna_api::app(AppState::with_config(config, None));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = test_app();
    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/v1/groups"].is_object());
    assert!(body["paths"]["/v1/announcements/{id}/publish"].is_object());
}
