//! Domain models: course request/spec, course, week, day, video reference,
//! quizzes, assignments and their submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Number of study days per week. The seventh day is rest.
pub const DAYS_PER_WEEK: u32 = 6;

/// Longest course that can be requested, in months.
pub const MAX_DURATION_MONTHS: u32 = 24;
/// A study day cannot exceed the day itself.
pub const MAX_HOURS_PER_DAY: u32 = 24;

/// Raw course request as submitted by a client. Everything is optional text
/// until validated into a `CourseSpec`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CourseRequest {
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub duration: Option<serde_json::Value>,
  #[serde(default)] pub hours_per_day: Option<serde_json::Value>,
  #[serde(default)] pub level_has: Option<String>,
  #[serde(default)] pub level_required: Option<String>,
  #[serde(default)] pub language: Option<String>,
}

/// Validated course parameters. Only constructible through `TryFrom<CourseRequest>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CourseSpec {
  title: String,
  duration_months: u32,
  hours_per_day: u32,
  level_has: String,
  level_required: String,
  language: String,
}

impl CourseSpec {
  pub fn title(&self) -> &str { &self.title }
  pub fn duration_months(&self) -> u32 { self.duration_months }
  pub fn hours_per_day(&self) -> u32 { self.hours_per_day }
  pub fn level_has(&self) -> &str { &self.level_has }
  pub fn level_required(&self) -> &str { &self.level_required }
  pub fn language(&self) -> &str { &self.language }

  /// Four weeks per requested month.
  pub fn total_weeks(&self) -> u32 {
    self.duration_months.saturating_mul(4)
  }
}

impl TryFrom<CourseRequest> for CourseSpec {
  type Error = ValidationError;

  fn try_from(req: CourseRequest) -> Result<Self, Self::Error> {
    Ok(Self {
      title: required_text("title", req.title)?,
      duration_months: bounded_int("duration", req.duration, MAX_DURATION_MONTHS)?,
      hours_per_day: bounded_int("hours_per_day", req.hours_per_day, MAX_HOURS_PER_DAY)?,
      level_has: required_text("level_has", req.level_has)?,
      level_required: required_text("level_required", req.level_required)?,
      language: required_text("language", req.language)?,
    })
  }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
    _ => Err(ValidationError::Missing(field)),
  }
}

/// Positive integer no greater than `max`.
fn bounded_int(field: &'static str, value: Option<serde_json::Value>, max: u32) -> Result<u32, ValidationError> {
  let n = positive_int(field, value)?;
  if n > max {
    return Err(ValidationError::TooLarge { field, max, value: n });
  }
  Ok(n)
}

/// Accepts a JSON number or a numeric string ("3", " 3 ").
fn positive_int(field: &'static str, value: Option<serde_json::Value>) -> Result<u32, ValidationError> {
  let value = value.ok_or(ValidationError::Missing(field))?;
  let parsed = match &value {
    serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
    serde_json::Value::String(s) if s.trim().is_empty() => return Err(ValidationError::Missing(field)),
    serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
    serde_json::Value::Null => return Err(ValidationError::Missing(field)),
    _ => None,
  };
  match parsed {
    Some(n) if n >= 1 => Ok(n),
    _ => Err(ValidationError::NotPositiveInteger {
      field,
      value: match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
      },
    }),
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Course {
  pub id: Uuid,
  pub title: String,
  pub duration_months: u32,
  pub hours_per_day: u32,
  pub level_has: String,
  pub level_required: String,
  pub language: String,
  pub outline: String,
  pub created_at: DateTime<Utc>,
}

impl Course {
  pub fn from_spec(spec: &CourseSpec, outline: String) -> Self {
    Self {
      id: Uuid::new_v4(),
      title: spec.title.clone(),
      duration_months: spec.duration_months,
      hours_per_day: spec.hours_per_day,
      level_has: spec.level_has.clone(),
      level_required: spec.level_required.clone(),
      language: spec.language.clone(),
      outline,
      created_at: Utc::now(),
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Week {
  pub id: Uuid,
  pub course_id: Uuid,
  pub week_number: u32,
  pub title: String,
  /// Raw outline text for this week (bullet list of day topics).
  pub content: String,
}

/// Embed URL plus thumbnail. A day either has both or neither.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
  pub embed_url: String,
  pub thumbnail_url: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Day {
  pub id: Uuid,
  pub week_id: Uuid,
  pub day_number: u32,
  pub title: String,
  /// Display markup (already sanitized HTML).
  pub content: String,
  pub video: Option<VideoRef>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Quiz {
  pub id: Uuid,
  pub week_id: Uuid,
  pub title: String,
  pub content: String,
  pub total_marks: u32,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuizSubmission {
  pub user: String,
  pub quiz_id: Uuid,
  pub score: f32,
  pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Assignment {
  pub id: Uuid,
  pub week_id: Uuid,
  pub title: String,
  pub description: String,
  pub due_date: DateTime<Utc>,
  pub max_marks: u32,
  pub content: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssignmentSubmission {
  pub user: String,
  pub assignment_id: Uuid,
  pub submitted_text: Option<String>,
  pub grade: Option<f32>,
  pub submitted_at: DateTime<Utc>,
}
