//! End-to-end tests for the HTTP surface, driven through the real router
//! with an in-memory SQLite database and a stubbed consultation provider.

use api_lib::adapters::db::DbAdapter;
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

use aidoctor_core::ports::{ConsultationService, PortResult};

//=========================================================================================
// Test Harness
//=========================================================================================

struct StubConsultationAdapter;

#[async_trait]
impl ConsultationService for StubConsultationAdapter {
    async fn consult(
        &self,
        symptom: &str,
        _sex: &str,
        _age: &str,
        _country: &str,
    ) -> PortResult<String> {
        Ok(format!("You described {}. Please rest and hydrate.", symptom))
    }
}

async fn test_app() -> Router {
    // One connection keeps every request on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    let db = Arc::new(DbAdapter::new(pool));
    db.run_migrations().await.expect("migrations");

    let config = Arc::new(Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        log_level: tracing::Level::INFO,
        session_secret: "test-secret".to_string(),
        openai_api_key: None,
        consultation_model: "gpt-3.5-turbo".to_string(),
    });

    build_router(Arc::new(AppState {
        db,
        config,
        consultation_adapter: Arc::new(StubConsultationAdapter),
    }))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

/// Extracts the `session=...` pair from a Set-Cookie header.
fn session_cookie(headers: &HeaderMap) -> String {
    headers
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn signup(app: &Router, email: &str, name: &str) -> String {
    let (status, headers, _) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": "pw123",
            "name": name,
            "phone": "1",
            "country": "US"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    session_cookie(&headers)
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn condition_lifecycle_is_ownership_scoped() {
    let app = test_app().await;
    let alice = signup(&app, "a@x.com", "A").await;
    let bob = signup(&app, "b@x.com", "B").await;

    // Create a condition as Alice, with camelCase date and medications.
    let (status, _, created) = send(
        &app,
        "POST",
        "/api/medical-conditions",
        Some(&alice),
        Some(json!({
            "title": "Flu",
            "description": "fever",
            "diagnosisDate": "2024-01-15",
            "medications": ["Tylenol"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Flu");
    assert_eq!(created["description"], "fever");
    assert_eq!(created["diagnosisDate"], "2024-01-15");
    assert_eq!(created["medications"], json!(["Tylenol"]));
    let condition_id = created["id"].as_str().unwrap().to_string();

    // Alice sees her record; Bob does not.
    let (_, _, alices) = send(&app, "GET", "/api/medical-conditions", Some(&alice), None).await;
    assert_eq!(alices.as_array().unwrap().len(), 1);
    let (_, _, bobs) = send(&app, "GET", "/api/medical-conditions", Some(&bob), None).await;
    assert_eq!(bobs.as_array().unwrap().len(), 0);

    // Bob cannot delete Alice's record, and cannot tell it exists.
    let uri = format!("/api/medical-conditions/{}", condition_id);
    let (status, _, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice deletes it herself.
    let (status, _, body) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Condition deleted successfully");

    let (_, _, remaining) = send(&app, "GET", "/api/medical-conditions", Some(&alice), None).await;
    assert_eq!(remaining.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn snake_case_diagnosis_date_is_accepted() {
    let app = test_app().await;
    let cookie = signup(&app, "a@x.com", "A").await;

    let (status, _, created) = send(
        &app,
        "POST",
        "/api/medical-conditions",
        Some(&cookie),
        Some(json!({
            "title": "Asthma",
            "description": "wheezing",
            "diagnosis_date": "2023-06-30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["diagnosisDate"], "2023-06-30");
    // Medications default to an empty list when omitted.
    assert_eq!(created["medications"], json!([]));
}

#[tokio::test]
async fn invalid_diagnosis_date_is_a_validation_error() {
    let app = test_app().await;
    let cookie = signup(&app, "a@x.com", "A").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/medical-conditions",
        Some(&cookie),
        Some(json!({
            "title": "Flu",
            "description": "fever",
            "diagnosisDate": "15/01/2024"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Invalid date format"));
}

#[tokio::test]
async fn graph_save_then_list_returns_sorted_data() {
    let app = test_app().await;
    let cookie = signup(&app, "a@x.com", "A").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/medicine-graphs",
        Some(&cookie),
        Some(json!([{
            "id": "g1",
            "name": "Metformin",
            "data": [
                {"date": "2024-02-01", "dosage": 500},
                {"date": "2024-01-01", "dosage": 250}
            ]
        }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Graphs saved successfully");

    let (status, _, graphs) = send(&app, "GET", "/api/medicine-graphs", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let graphs = graphs.as_array().unwrap();
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0]["id"], "g1");
    assert_eq!(graphs[0]["name"], "Metformin");
    assert_eq!(graphs[0]["data"][0]["date"], "2024-01-01");
    assert_eq!(graphs[0]["data"][1]["date"], "2024-02-01");

    // Saving replaces the whole set.
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/medicine-graphs",
        Some(&cookie),
        Some(json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, graphs) = send(&app, "GET", "/api/medicine-graphs", Some(&cookie), None).await;
    assert_eq!(graphs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let app = test_app().await;
    signup(&app, "a@x.com", "A").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "email": "a@x.com",
            "password": "other-pw",
            "name": "Other",
            "phone": "2",
            "country": "FR"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app().await;
    signup(&app, "a@x.com", "A").await;

    let (wrong_pw_status, _, wrong_pw) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "nope"})),
    )
    .await;
    let (unknown_status, _, unknown) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "ghost@x.com", "password": "pw123"})),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);

    // The correct password still works.
    let (status, headers, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "pw123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(session_cookie(&headers).starts_with("session="));
}

#[tokio::test]
async fn protected_routes_require_a_valid_session() {
    let app = test_app().await;

    let (status, _, _) = send(&app, "GET", "/api/medical-conditions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = send(
        &app,
        "GET",
        "/api/medical-conditions",
        Some("session=not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn profile_update_and_session_rehydration() {
    let app = test_app().await;
    let cookie = signup(&app, "a@x.com", "A").await;

    let (status, _, updated) = send(
        &app,
        "PUT",
        "/auth/update-profile",
        Some(&cookie),
        Some(json!({"name": "Alice", "phone": "555", "country": "GB"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["user"]["name"], "Alice");
    assert_eq!(updated["user"]["country"], "GB");
    // Email is untouched by a profile update.
    assert_eq!(updated["user"]["email"], "a@x.com");

    let (status, _, session) = send(&app, "GET", "/auth/session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["name"], "Alice");
}

#[tokio::test]
async fn logout_clears_the_cookie_without_a_session() {
    let app = test_app().await;

    let (status, headers, body) = send(&app, "POST", "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn consultation_echoes_input_and_needs_no_session() {
    let app = test_app().await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/ai-doctor",
        None,
        Some(json!({
            "symptom": "headache",
            "sex": "female",
            "age": 34,
            "country": "Kenya"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Consultation generated successfully");
    assert!(body["data"]["consultation"]
        .as_str()
        .unwrap()
        .contains("headache"));
    assert_eq!(body["data"]["original_input"]["symptom"], "headache");
    assert_eq!(body["data"]["original_input"]["age"], 34);
    assert_eq!(body["data"]["original_input"]["country"], "Kenya");
}
