//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Course creation (validate → outline → split → persist → enroll creator)
//!   - Lazy day generation for a week (weekly detail → parse chain → video → format)
//!   - Progress updates, enrollment and the dashboard summary
//!   - Quiz and assignment records with per-user submissions

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
  Assignment, AssignmentSubmission, Course, CourseRequest, CourseSpec, Day, Quiz, QuizSubmission, Week,
};
use crate::error::ApiError;
use crate::format::markdown_to_html;
use crate::outline::{generate_outline, split_weeks};
use crate::parser::{plan_days, DayBody, DayPlan, ParsedDay};
use crate::protocol::*;
use crate::state::AppState;
use crate::weekly::generate_weekly_detail;

/// Validate the request, generate and split the outline, persist the course
/// and its weeks, and enroll the requesting user. Nothing is stored if the
/// outline call fails.
#[instrument(level = "info", skip(state, req), fields(%user))]
pub async fn create_course(state: &AppState, user: &str, req: CourseRequest) -> Result<CourseDetailOut, ApiError> {
  let spec = CourseSpec::try_from(req)?;

  let outline = generate_outline(state.openai.as_ref(), &state.generation.outline, &state.prompts, &spec).await?;
  let split = split_weeks(&outline);
  if split.len() != spec.total_weeks() as usize {
    warn!(target: "pipeline", expected = spec.total_weeks(), found = split.len(), "outline week count differs from request");
  }

  let course = Course::from_spec(&spec, outline);
  let mut weeks: Vec<Week> = Vec::with_capacity(split.len());
  for entry in split {
    let Some(week_number) = entry.week_number else { continue };
    if weeks.iter().any(|w| w.week_number == week_number) {
      warn!(target: "pipeline", week_number, title = %entry.title, "skipping repeated week number");
      continue;
    }
    weeks.push(Week {
      id: Uuid::new_v4(),
      course_id: course.id,
      week_number,
      title: entry.title,
      content: entry.body,
    });
  }
  weeks.sort_by_key(|w| w.week_number);

  let week_summaries: Vec<WeekSummaryOut> = weeks.iter().map(WeekSummaryOut::from).collect();
  let course_id = course.id;
  state.insert_course(course.clone(), weeks).await;
  state.enroll(user, course_id).await;
  info!(target: "coursegen", %course_id, weeks = week_summaries.len(), "course created");

  let progress = progress_out(state, user, course_id).await;
  Ok(CourseDetailOut { course, weeks: week_summaries, progress })
}

pub async fn list_courses(state: &AppState) -> Vec<CourseSummaryOut> {
  state.list_courses().await.iter().map(CourseSummaryOut::from).collect()
}

#[instrument(level = "info", skip(state), fields(%user, %course_id))]
pub async fn course_detail(state: &AppState, user: &str, course_id: Uuid) -> Result<CourseDetailOut, ApiError> {
  let course = state.get_course(course_id).await.ok_or_else(|| ApiError::NotFound("course".into()))?;
  let weeks = state.weeks_for(course_id).await.iter().map(WeekSummaryOut::from).collect();
  let progress = progress_out(state, user, course_id).await;
  Ok(CourseDetailOut { course, weeks, progress })
}

#[instrument(level = "info", skip(state), fields(%user, %course_id))]
pub async fn enroll(state: &AppState, user: &str, course_id: Uuid) -> Result<EnrollOut, ApiError> {
  let course = state.get_course(course_id).await.ok_or_else(|| ApiError::NotFound("course".into()))?;
  let enrolled = state.enroll(user, course_id).await;
  let message = if enrolled {
    format!("Enrolled in {}", course.title)
  } else {
    "You are already enrolled in this course.".to_string()
  };
  Ok(EnrollOut { enrolled, message })
}

/// Week with its days, generating the days on first visit.
#[instrument(level = "info", skip(state), fields(%user, %course_id))]
pub async fn open_week(state: &AppState, user: &str, course_id: Uuid, week_number: u32) -> Result<WeekDetailOut, ApiError> {
  let course = state.get_course(course_id).await.ok_or_else(|| ApiError::NotFound("course".into()))?;
  let week = state.week_by_number(course_id, week_number).await
    .ok_or_else(|| ApiError::NotFound(format!("week {week_number}")))?;
  require_enrollment(state, user, course_id).await?;

  let plan = ensure_week_days(state, &course, &week).await;
  let days = state.days_for(week.id).await;
  Ok(WeekDetailOut {
    course_id,
    source: plan.as_ref().map(|p| p.source),
    notice: plan.as_ref().and_then(|p| p.notice()).map(str::to_string),
    week,
    days,
  })
}

/// Generate and store the week's days if it has none. Returns the plan when
/// this call did the generation, `None` if days already existed.
///
/// The per-week lock plus the re-check make concurrent first visits commit at
/// most one day set.
pub async fn ensure_week_days(state: &AppState, course: &Course, week: &Week) -> Option<DayPlan> {
  if !state.days_for(week.id).await.is_empty() {
    return None;
  }
  let lock = state.week_lock(week.id).await;
  let _guard = lock.lock().await;
  if !state.days_for(week.id).await.is_empty() {
    state.release_week_lock(week.id).await;
    return None;
  }

  let plan = plan_week(state, week, course.hours_per_day).await;
  let days = materialize_days(state, week.id, &plan.days).await;
  state.insert_days(week.id, days).await;
  state.release_week_lock(week.id).await;
  Some(plan)
}

/// Weekly generation call plus the parser chain. API failures are recovered
/// here by going straight to fallback content.
#[instrument(level = "info", skip(state, week), fields(week_id = %week.id, week_number = week.week_number))]
async fn plan_week(state: &AppState, week: &Week, hours_per_day: u32) -> DayPlan {
  let detail = generate_weekly_detail(
    state.openai.as_ref(),
    &state.generation.detail,
    &state.prompts,
    &week.content,
    week.week_number,
    hours_per_day,
  ).await;

  match detail {
    Ok(text) => plan_days(Some(&text), &week.content, week.week_number, hours_per_day),
    Err(e) => {
      warn!(target: "pipeline", week_number = week.week_number, error = %e, "weekly detail generation failed; using fallback days");
      plan_days(None, &week.content, week.week_number, hours_per_day)
    }
  }
}

/// Attach videos (sequentially, one lookup per day) and render content.
async fn materialize_days(state: &AppState, week_id: Uuid, parsed: &[ParsedDay]) -> Vec<Day> {
  let mut days = Vec::with_capacity(parsed.len());
  for p in parsed {
    let video = state.videos.find(&p.topic).await;
    let content = match &p.body {
      DayBody::Markdown(md) => markdown_to_html(md),
      DayBody::Html(html) => html.clone(),
    };
    days.push(Day {
      id: Uuid::new_v4(),
      week_id,
      day_number: p.day_number,
      title: p.title.clone(),
      content,
      video,
    });
  }
  days
}

/// Mark a day complete for the user and return the new percentage.
#[instrument(level = "info", skip(state, body), fields(%user, course_id = %body.course_id, day_id = %body.day_id))]
pub async fn complete_day(state: &AppState, user: &str, body: ProgressIn) -> Result<ProgressUpdateOut, ApiError> {
  state.get_course(body.course_id).await.ok_or_else(|| ApiError::NotFound("course".into()))?;
  let day = state.get_day(body.day_id).await.ok_or_else(|| ApiError::NotFound("day".into()))?;
  let week = state.get_week(day.week_id).await
    .filter(|w| w.course_id == body.course_id)
    .ok_or_else(|| ApiError::NotFound("day in this course".into()))?;

  let totals = state.course_totals(body.course_id).await;
  let day_key = day.id.to_string();
  let progress_percentage = state
    .update_progress(user, body.course_id, |p| {
      p.record_day(&day_key, week.week_number, day.day_number, totals.weeks);
      p.percentage(&totals)
    })
    .await
    .ok_or_else(|| ApiError::NotFound("enrollment".into()))?;

  info!(target: "coursegen", progress_percentage, "day completed");
  Ok(ProgressUpdateOut { success: true, progress_percentage })
}

#[instrument(level = "info", skip(state), fields(%user))]
pub async fn dashboard(state: &AppState, user: &str) -> DashboardOut {
  let mut rows = Vec::new();
  for p in state.progress_for_user(user).await {
    let Some(course) = state.get_course(p.course_id).await else { continue };
    let totals = state.course_totals(p.course_id).await;
    rows.push(DashboardRow {
      course: CourseSummaryOut::from(&course),
      progress: p.percentage(&totals),
      current_week: p.current_week,
      current_day: p.current_day,
      is_completed: p.is_completed,
    });
  }

  let completed_courses = rows.iter().filter(|r| r.is_completed).count();
  let incomplete: Vec<f64> = rows.iter().filter(|r| !r.is_completed).map(|r| r.progress).collect();
  let average_progress = if incomplete.is_empty() {
    0.0
  } else {
    incomplete.iter().sum::<f64>() / incomplete.len() as f64
  };

  DashboardOut { total_courses: rows.len(), completed_courses, average_progress, progress_data: rows }
}

#[instrument(level = "info", skip(state, body), fields(%week_id))]
pub async fn add_quiz(state: &AppState, week_id: Uuid, body: QuizIn) -> Result<Quiz, ApiError> {
  state.get_week(week_id).await.ok_or_else(|| ApiError::NotFound("week".into()))?;
  let quiz = Quiz {
    id: Uuid::new_v4(),
    week_id,
    title: body.title,
    content: body.content,
    total_marks: body.total_marks,
    created_at: Utc::now(),
  };
  state.insert_quiz(quiz.clone()).await;
  Ok(quiz)
}

#[instrument(level = "info", skip(state, body), fields(%user, %quiz_id))]
pub async fn submit_quiz(state: &AppState, user: &str, quiz_id: Uuid, body: QuizSubmitIn) -> Result<SubmissionOut, ApiError> {
  let quiz = state.get_quiz(quiz_id).await.ok_or_else(|| ApiError::NotFound("quiz".into()))?;
  let course_id = course_of_week(state, quiz.week_id).await?;
  require_enrollment(state, user, course_id).await?;

  let submission = QuizSubmission { user: user.to_string(), quiz_id, score: body.score, submitted_at: Utc::now() };
  if !state.insert_quiz_submission(submission).await {
    return Err(ApiError::Conflict("quiz already submitted".into()));
  }

  let totals = state.course_totals(course_id).await;
  let key = quiz_id.to_string();
  let progress_percentage = state
    .update_progress(user, course_id, |p| {
      p.record_quiz(&key);
      p.percentage(&totals)
    })
    .await
    .ok_or_else(|| ApiError::NotFound("enrollment".into()))?;
  Ok(SubmissionOut { success: true, progress_percentage })
}

#[instrument(level = "info", skip(state, body), fields(%week_id))]
pub async fn add_assignment(state: &AppState, week_id: Uuid, body: AssignmentIn) -> Result<Assignment, ApiError> {
  state.get_week(week_id).await.ok_or_else(|| ApiError::NotFound("week".into()))?;
  let assignment = Assignment {
    id: Uuid::new_v4(),
    week_id,
    title: body.title,
    description: body.description,
    due_date: body.due_date,
    max_marks: body.max_marks,
    content: body.content,
    created_at: Utc::now(),
  };
  state.insert_assignment(assignment.clone()).await;
  Ok(assignment)
}

#[instrument(level = "info", skip(state, body), fields(%user, %assignment_id))]
pub async fn submit_assignment(state: &AppState, user: &str, assignment_id: Uuid, body: AssignmentSubmitIn) -> Result<SubmissionOut, ApiError> {
  let assignment = state.get_assignment(assignment_id).await.ok_or_else(|| ApiError::NotFound("assignment".into()))?;
  let course_id = course_of_week(state, assignment.week_id).await?;
  require_enrollment(state, user, course_id).await?;

  let submission = AssignmentSubmission {
    user: user.to_string(),
    assignment_id,
    submitted_text: body.submitted_text,
    grade: None,
    submitted_at: Utc::now(),
  };
  if !state.insert_assignment_submission(submission).await {
    return Err(ApiError::Conflict("assignment already submitted".into()));
  }

  let totals = state.course_totals(course_id).await;
  let key = assignment_id.to_string();
  let progress_percentage = state
    .update_progress(user, course_id, |p| {
      p.record_assignment(&key);
      p.percentage(&totals)
    })
    .await
    .ok_or_else(|| ApiError::NotFound("enrollment".into()))?;
  Ok(SubmissionOut { success: true, progress_percentage })
}

/// Enrollment must exist before a submission is stored; rows are never
/// removed, so the check stays valid for the rest of the call.
async fn require_enrollment(state: &AppState, user: &str, course_id: Uuid) -> Result<(), ApiError> {
  match state.get_progress(user, course_id).await {
    Some(_) => Ok(()),
    None => Err(ApiError::NotFound("enrollment".into())),
  }
}

/// Course owning a week.
async fn course_of_week(state: &AppState, week_id: Uuid) -> Result<Uuid, ApiError> {
  state.get_week(week_id).await
    .map(|w| w.course_id)
    .ok_or_else(|| ApiError::NotFound("week".into()))
}

async fn progress_out(state: &AppState, user: &str, course_id: Uuid) -> Option<ProgressOut> {
  let progress = state.get_progress(user, course_id).await?;
  let totals = state.course_totals(course_id).await;
  let progress_percentage = progress.percentage(&totals);
  Some(ProgressOut { progress, progress_percentage })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{AppConfig, GenerationConfig, Prompts, VideoSearchConfig};
  use serde_json::json;

  fn offline_state() -> AppState {
    AppState::new(AppConfig {
      port: 0,
      generation: GenerationConfig::default(),
      video: VideoSearchConfig::default(),
      prompts: Prompts::default(),
    })
    .unwrap()
  }

  async fn seeded_course(state: &AppState, weeks: u32) -> Course {
    let req: CourseRequest = serde_json::from_value(json!({
      "title": "Rust", "duration": 1, "hours_per_day": 2,
      "level_has": "beginner", "level_required": "intermediate", "language": "English",
    }))
    .unwrap();
    let spec = CourseSpec::try_from(req).unwrap();
    let course = Course::from_spec(&spec, String::new());
    let weeks = (1..=weeks)
      .map(|n| Week {
        id: Uuid::new_v4(),
        course_id: course.id,
        week_number: n,
        title: format!("Week {n}"),
        content: "- Day 1: Basics\n- Day 2: More".into(),
      })
      .collect();
    state.insert_course(course.clone(), weeks).await;
    course
  }

  #[tokio::test]
  async fn week_locks_are_released_after_days_are_stored() {
    let state = offline_state();
    let course = seeded_course(&state, 3).await;
    state.enroll("ana", course.id).await;

    for n in 1..=3 {
      let week = open_week(&state, "ana", course.id, n).await.unwrap();
      assert_eq!(week.days.len(), 6);
      assert_eq!(week.source, Some(crate::parser::DaySource::Fallback));
    }
    assert_eq!(state.week_lock_count().await, 0);

    let again = open_week(&state, "ana", course.id, 1).await.unwrap();
    assert!(again.source.is_none());
    assert_eq!(state.week_lock_count().await, 0);
  }

  #[tokio::test]
  async fn submissions_before_enrollment_leave_no_trace() {
    let state = offline_state();
    let course = seeded_course(&state, 1).await;
    let week_id = state.weeks_for(course.id).await[0].id;
    let quiz = add_quiz(&state, week_id, QuizIn { title: "Q".into(), content: String::new(), total_marks: 10 })
      .await
      .unwrap();

    let err = submit_quiz(&state, "bob", quiz.id, QuizSubmitIn { score: 5.0 }).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    state.enroll("bob", course.id).await;
    let out = submit_quiz(&state, "bob", quiz.id, QuizSubmitIn { score: 5.0 }).await.unwrap();
    assert!(out.success);
    let progress = state.get_progress("bob", course.id).await.unwrap();
    assert_eq!(progress.completed_quizzes, vec![quiz.id.to_string()]);
  }
}
