//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; the caller is identified by the `X-User` header.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::HeaderMap, Json, response::IntoResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{Assignment, CourseRequest, Quiz};
use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

pub const USER_HEADER: &str = "x-user";

/// Non-empty user name from the `X-User` header.
fn user_from(headers: &HeaderMap) -> Result<String, ApiError> {
  headers
    .get(USER_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
    .ok_or(ApiError::MissingUser)
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_courses(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(list_courses(&state).await)
}

#[instrument(level = "info", skip(state, headers, body))]
pub async fn http_create_course(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(body): Json<CourseRequest>,
) -> Result<Json<CourseDetailOut>, ApiError> {
  let user = user_from(&headers)?;
  let out = create_course(&state, &user, body).await?;
  info!(target: "coursegen", course_id = %out.course.id, weeks = out.weeks.len(), "HTTP course created");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, headers), fields(%course_id))]
pub async fn http_get_course(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetailOut>, ApiError> {
  let user = user_from(&headers)?;
  Ok(Json(course_detail(&state, &user, course_id).await?))
}

#[instrument(level = "info", skip(state, headers), fields(%course_id))]
pub async fn http_enroll(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(course_id): Path<Uuid>,
) -> Result<Json<EnrollOut>, ApiError> {
  let user = user_from(&headers)?;
  Ok(Json(enroll(&state, &user, course_id).await?))
}

#[instrument(level = "info", skip(state, headers), fields(%course_id))]
pub async fn http_get_week(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Path((course_id, week_number)): Path<(Uuid, u32)>,
) -> Result<Json<WeekDetailOut>, ApiError> {
  let user = user_from(&headers)?;
  let out = open_week(&state, &user, course_id, week_number).await?;
  info!(target: "coursegen", days = out.days.len(), source = ?out.source, "HTTP week served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, headers, body), fields(course_id = %body.course_id, day_id = %body.day_id))]
pub async fn http_post_progress(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(body): Json<ProgressIn>,
) -> Result<Json<ProgressUpdateOut>, ApiError> {
  let user = user_from(&headers)?;
  Ok(Json(complete_day(&state, &user, body).await?))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_dashboard(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<DashboardOut>, ApiError> {
  let user = user_from(&headers)?;
  Ok(Json(dashboard(&state, &user).await))
}

#[instrument(level = "info", skip(state, body), fields(%week_id))]
pub async fn http_post_quiz(
  State(state): State<Arc<AppState>>,
  Path(week_id): Path<Uuid>,
  Json(body): Json<QuizIn>,
) -> Result<Json<Quiz>, ApiError> {
  Ok(Json(add_quiz(&state, week_id, body).await?))
}

#[instrument(level = "info", skip(state, headers, body), fields(%quiz_id))]
pub async fn http_submit_quiz(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(quiz_id): Path<Uuid>,
  Json(body): Json<QuizSubmitIn>,
) -> Result<Json<SubmissionOut>, ApiError> {
  let user = user_from(&headers)?;
  Ok(Json(submit_quiz(&state, &user, quiz_id, body).await?))
}

#[instrument(level = "info", skip(state, body), fields(%week_id))]
pub async fn http_post_assignment(
  State(state): State<Arc<AppState>>,
  Path(week_id): Path<Uuid>,
  Json(body): Json<AssignmentIn>,
) -> Result<Json<Assignment>, ApiError> {
  Ok(Json(add_assignment(&state, week_id, body).await?))
}

#[instrument(level = "info", skip(state, headers, body), fields(%assignment_id))]
pub async fn http_submit_assignment(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(assignment_id): Path<Uuid>,
  Json(body): Json<AssignmentSubmitIn>,
) -> Result<Json<SubmissionOut>, ApiError> {
  let user = user_from(&headers)?;
  Ok(Json(submit_assignment(&state, &user, assignment_id, body).await?))
}
