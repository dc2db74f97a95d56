//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/v1/...`
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Courses
        .route("/api/v1/courses", get(http::http_list_courses).post(http::http_create_course))
        .route("/api/v1/courses/:course_id", get(http::http_get_course))
        .route("/api/v1/courses/:course_id/enroll", post(http::http_enroll))
        .route("/api/v1/courses/:course_id/weeks/:week_number", get(http::http_get_week))
        // Progress
        .route("/api/v1/progress", post(http::http_post_progress))
        .route("/api/v1/dashboard", get(http::http_dashboard))
        // Quizzes & assignments
        .route("/api/v1/weeks/:week_id/quizzes", post(http::http_post_quiz))
        .route("/api/v1/quizzes/:quiz_id/submit", post(http::http_submit_quiz))
        .route("/api/v1/weeks/:week_id/assignments", post(http::http_post_assignment))
        .route("/api/v1/assignments/:assignment_id/submit", post(http::http_submit_assignment))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
