//! API 路由测试
//!
//! 使用内存存储和开发配置中的 API Key，通过 `oneshot` 驱动完整路由。

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{app_state::AppState, create_router};
use crate::services::llm::DisabledLlmClient;
use crate::services::narrator::{COACH_FALLBACK, PROFILE_SUMMARY_FALLBACK};

const PATIENT_KEY: &str = "dev-patient-key";
const ADMIN_KEY: &str = "dev-admin-key";

fn app() -> Router {
    create_router(AppState::development(Arc::new(DisabledLlmClient)))
}

fn request(method: &str, uri: &str, key: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("Authorization", format!("ApiKey {}", key));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_missing_credentials_are_rejected() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/api/v1/me/profile", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_api_key_is_rejected() {
    let app = app();
    let (status, _) = send(
        &app,
        request("GET", "/api/v1/me/dashboard", Some("nope"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_without_activity_is_insufficient_data() {
    let app = app();
    let (status, body) = send(
        &app,
        request("GET", "/api/v1/me/profile", Some(PATIENT_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "INSUFFICIENT_DATA");
}

#[tokio::test]
async fn test_check_in_then_game_yields_profile() {
    let app = app();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/me/check-ins",
            Some(PATIENT_KEY),
            Some(json!({"sleep_hours": 5.0, "mood": 3, "fatigue": 3})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["log"]["mood"], 3);
    assert_eq!(body["forecast"]["rule"], "short_sleep");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/me/game-sessions",
            Some(PATIENT_KEY),
            Some(json!({"game_type": "MEMORY_WORK", "score": 40, "level": 5})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["game_type"], "MEMORY_WORK");

    let (status, body) = send(
        &app,
        request("GET", "/api/v1/me/profile", Some(PATIENT_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], PROFILE_SUMMARY_FALLBACK);
    assert!(body["scores"].get("flexibility").is_none());

    let (status, body) = send(
        &app,
        request("GET", "/api/v1/me/dashboard", Some(PATIENT_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"].as_array().unwrap().len(), 1);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_check_in_is_bad_request() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/me/check-ins",
            Some(PATIENT_KEY),
            Some(json!({"sleep_hours": 7.0, "mood": 9, "fatigue": 2})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_insights_are_never_empty() {
    let app = app();
    let (status, body) = send(
        &app,
        request("GET", "/api/v1/me/insights", Some(PATIENT_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insights"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_forecast_without_match_is_no_content() {
    let app = app();
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/forecast",
            Some(PATIENT_KEY),
            Some(json!({"sleep_hours": 7.0, "mood": 3, "fatigue": 3})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/forecast",
            Some(PATIENT_KEY),
            Some(json!({"sleep_hours": 8.0, "mood": 5, "fatigue": 1})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rule"], "all_positive");
}

#[tokio::test]
async fn test_coach_falls_back_without_model() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/coach/chat",
            Some(PATIENT_KEY),
            Some(json!({"message": "How can I focus better?"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], COACH_FALLBACK);
}

#[tokio::test]
async fn test_patient_cannot_reach_admin_routes() {
    let app = app();
    let (status, body) = send(
        &app,
        request("GET", "/api/v1/admin/overview", Some(PATIENT_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_cannot_write_activity() {
    let app = app();
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/me/check-ins",
            Some(ADMIN_KEY),
            Some(json!({"sleep_hours": 7.0, "mood": 3, "fatigue": 3})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_enrols_and_lists_patients() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/admin/patients",
            Some(ADMIN_KEY),
            Some(json!({"email": "Ana@Clinic.org"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ana@clinic.org");
    let patient_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/admin/patients",
            Some(ADMIN_KEY),
            Some(json!({"email": "ana@clinic.org"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        request("GET", "/api/v1/admin/patients", Some(ADMIN_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], patient_id.as_str());
    assert_eq!(body[0]["session_count"], 0);

    let uri = format!("/api/v1/admin/patients/{}/profile", patient_id);
    let (status, body) = send(&app, request("GET", &uri, Some(ADMIN_KEY), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "INSUFFICIENT_DATA");

    let (status, _) = send(
        &app,
        request("GET", "/api/v1/admin/patients/missing", Some(ADMIN_KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_account_removes_activity() {
    let app = app();
    send(
        &app,
        request(
            "POST",
            "/api/v1/me/check-ins",
            Some(PATIENT_KEY),
            Some(json!({"sleep_hours": 7.0, "mood": 3, "fatigue": 3})),
        ),
    )
    .await;

    let (status, body) = send(&app, request("DELETE", "/api/v1/me", Some(PATIENT_KEY), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs_removed"], 1);

    let (_, body) = send(
        &app,
        request("GET", "/api/v1/me/dashboard", Some(PATIENT_KEY), None),
    )
    .await;
    assert!(body["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_is_public_and_headers_are_set() {
    let app = app();
    let response = app
        .clone()
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}

#[tokio::test]
async fn test_error_body_carries_request_id() {
    let app = app();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/me/profile", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let header = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], header.as_str());

    let mut req = request("GET", "/api/v1/me/profile", Some(PATIENT_KEY), None);
    req.headers_mut()
        .insert("x-request-id", "client-7".parse().unwrap());
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "INSUFFICIENT_DATA");
    assert_eq!(body["request_id"], "client-7");
}
