mod stub;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use coursegen_backend::config::{AppConfig, GenerationConfig, Prompts, VideoSearchConfig};
use coursegen_backend::routes::build_router;
use coursegen_backend::state::AppState;
use serde_json::{json, Value};
use stub::{Stub, StubConfig, WeeklyBehavior};
use tower::ServiceExt as _;

fn router(stub: &Stub) -> axum::Router {
    let config = AppConfig {
        port: 0,
        generation: GenerationConfig {
            api_key: Some("test-key".into()),
            base_url: stub.chat_base_url.clone(),
            request_timeout: Some(Duration::from_secs(5)),
            ..GenerationConfig::default()
        },
        video: VideoSearchConfig {
            api_key: None,
            base_url: stub.video_base_url.clone(),
            timeout: Duration::from_secs(2),
        },
        prompts: Prompts::default(),
    };
    build_router(Arc::new(AppState::new(config).expect("build state")))
}

async fn call(app: &axum::Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn course_body() -> Value {
    json!({
        "title": "Rust Basics",
        "duration": 1,
        "hours_per_day": 2,
        "level_has": "beginner",
        "level_required": "intermediate",
        "language": "English",
    })
}

#[tokio::test]
async fn health_is_ok() {
    let stub = Stub::spawn(StubConfig::default());
    let (status, body) = call(&router(&stub), "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn create_requires_user_header() {
    let stub = Stub::spawn(StubConfig::default());
    let (status, body) = call(&router(&stub), "POST", "/api/v1/courses", None, Some(course_body())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn invalid_course_is_a_bad_request() {
    let stub = Stub::spawn(StubConfig::default());
    let mut body = course_body();
    body["hours_per_day"] = json!("-1");
    let (status, body) = call(&router(&stub), "POST", "/api/v1/courses", Some("ana"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("hours_per_day"));
}

#[tokio::test]
async fn course_week_and_progress_round_trip_over_http() {
    let stub = Stub::spawn(StubConfig { weekly: WeeklyBehavior::Fail, ..StubConfig::default() });
    let app = router(&stub);

    let (status, created) = call(&app, "POST", "/api/v1/courses", Some("ana"), Some(course_body())).await;
    assert_eq!(status, StatusCode::OK);
    let course_id = created["course"]["id"].as_str().expect("course id").to_string();
    assert_eq!(created["weeks"].as_array().map(Vec::len), Some(4));

    let (status, list) = call(&app, "GET", "/api/v1/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, week) = call(&app, "GET", &format!("/api/v1/courses/{course_id}/weeks/1"), Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(week["source"], json!("fallback"));
    assert!(week["notice"].is_string());
    let day_id = week["days"][0]["id"].as_str().expect("day id").to_string();

    let (status, update) = call(
        &app,
        "POST",
        "/api/v1/progress",
        Some("ana"),
        Some(json!({ "course_id": course_id, "day_id": day_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["success"], json!(true));
    assert!(update["progress_percentage"].as_f64().unwrap_or_default() > 0.0);

    let (status, dash) = call(&app, "GET", "/api/v1/dashboard", Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["total_courses"], json!(1));
    assert_eq!(dash["completed_courses"], json!(0));

    let (status, _) = call(&app, "GET", &format!("/api/v1/courses/{course_id}/weeks/1"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let stub = Stub::spawn(StubConfig::default());
    let uri = format!("/api/v1/courses/{}", uuid::Uuid::new_v4());
    let (status, body) = call(&router(&stub), "GET", &uri, Some("ana"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("course not found"));
}

#[tokio::test]
async fn quiz_and_assignment_submissions_over_http() {
    let stub = Stub::spawn(StubConfig::default());
    let app = router(&stub);

    let (status, created) = call(&app, "POST", "/api/v1/courses", Some("ana"), Some(course_body())).await;
    assert_eq!(status, StatusCode::OK);
    let week_id = created["weeks"][0]["id"].as_str().expect("week id").to_string();

    let (status, quiz) = call(
        &app,
        "POST",
        &format!("/api/v1/weeks/{week_id}/quizzes"),
        None,
        Some(json!({ "title": "Week 1 quiz" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quiz["total_marks"], json!(10));
    let quiz_id = quiz["id"].as_str().expect("quiz id").to_string();

    let (status, assignment) = call(
        &app,
        "POST",
        &format!("/api/v1/weeks/{week_id}/assignments"),
        None,
        Some(json!({ "title": "Essay", "description": "Write it", "due_date": "2030-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assignment["max_marks"], json!(100));
    let assignment_id = assignment["id"].as_str().expect("assignment id").to_string();

    let quiz_uri = format!("/api/v1/quizzes/{quiz_id}/submit");
    let (status, out) = call(&app, "POST", &quiz_uri, Some("ana"), Some(json!({ "score": 7.5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["success"], json!(true));
    let after_quiz = out["progress_percentage"].as_f64().unwrap_or_default();
    assert!(after_quiz > 0.0);

    let (status, body) = call(&app, "POST", &quiz_uri, Some("ana"), Some(json!({ "score": 9.0 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let assignment_uri = format!("/api/v1/assignments/{assignment_id}/submit");
    let (status, out) = call(&app, "POST", &assignment_uri, Some("ana"), Some(json!({ "submitted_text": "done" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(out["progress_percentage"].as_f64().unwrap_or_default() > after_quiz);

    let (status, _) = call(&app, "POST", &assignment_uri, Some("ana"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, "POST", &quiz_uri, Some("bob"), Some(json!({ "score": 1.0 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
