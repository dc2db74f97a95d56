//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Course, Day, Week};
use crate::parser::DaySource;
use crate::progress::UserProgress;

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

/// Course without its full outline text, for listings.
#[derive(Debug, Serialize)]
pub struct CourseSummaryOut {
  pub id: Uuid,
  pub title: String,
  pub duration_months: u32,
  pub hours_per_day: u32,
  pub level_has: String,
  pub level_required: String,
  pub language: String,
  pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseSummaryOut {
  fn from(c: &Course) -> Self {
    Self {
      id: c.id,
      title: c.title.clone(),
      duration_months: c.duration_months,
      hours_per_day: c.hours_per_day,
      level_has: c.level_has.clone(),
      level_required: c.level_required.clone(),
      language: c.language.clone(),
      created_at: c.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct WeekSummaryOut {
  pub id: Uuid,
  pub week_number: u32,
  pub title: String,
}

impl From<&Week> for WeekSummaryOut {
  fn from(w: &Week) -> Self {
    Self { id: w.id, week_number: w.week_number, title: w.title.clone() }
  }
}

#[derive(Debug, Serialize)]
pub struct CourseDetailOut {
  pub course: Course,
  pub weeks: Vec<WeekSummaryOut>,
  pub progress: Option<ProgressOut>,
}

#[derive(Debug, Serialize)]
pub struct ProgressOut {
  #[serde(flatten)]
  pub progress: UserProgress,
  pub progress_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct EnrollOut {
  pub enrolled: bool,
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WeekDetailOut {
  pub course_id: Uuid,
  pub week: Week,
  pub days: Vec<Day>,
  /// Set only when this request generated the days.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source: Option<DaySource>,
  /// Informational message (e.g. fallback content in use).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressIn {
  pub course_id: Uuid,
  pub day_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProgressUpdateOut {
  pub success: bool,
  pub progress_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardRow {
  pub course: CourseSummaryOut,
  pub progress: f64,
  pub current_week: u32,
  pub current_day: u32,
  pub is_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardOut {
  pub progress_data: Vec<DashboardRow>,
  pub total_courses: usize,
  pub completed_courses: usize,
  /// Mean progress over courses that are not completed.
  pub average_progress: f64,
}

#[derive(Debug, Deserialize)]
pub struct QuizIn {
  pub title: String,
  #[serde(default)]
  pub content: String,
  #[serde(default = "default_quiz_marks")]
  pub total_marks: u32,
}

fn default_quiz_marks() -> u32 { 10 }

#[derive(Debug, Deserialize)]
pub struct QuizSubmitIn {
  #[serde(default)]
  pub score: f32,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentIn {
  pub title: String,
  pub description: String,
  pub due_date: DateTime<Utc>,
  #[serde(default = "default_assignment_marks")]
  pub max_marks: u32,
  #[serde(default)]
  pub content: Option<String>,
}

fn default_assignment_marks() -> u32 { 100 }

#[derive(Debug, Deserialize)]
pub struct AssignmentSubmitIn {
  #[serde(default)]
  pub submitted_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionOut {
  pub success: bool,
  pub progress_percentage: f64,
}
