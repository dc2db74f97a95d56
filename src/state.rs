//! Application state: in-memory stores, generation clients, prompts.
//!
//! This module owns:
//!   - course / week / day tables (create-once, immutable afterwards)
//!   - per (user, course) progress rows
//!   - quizzes, assignments and their per-user submissions
//!   - per-week generation locks for lazy day creation
//!   - the optional generation client and the video matcher
//!
//! Progress rows are modified while holding the table's write lock, so
//! concurrent completions for the same user cannot overwrite each other.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{AppConfig, GenerationConfig, Prompts};
use crate::domain::{Assignment, AssignmentSubmission, Course, Day, Quiz, QuizSubmission, Week};
use crate::openai::OpenAI;
use crate::progress::{CourseTotals, UserProgress};
use crate::video::VideoMatcher;

type UserKey = (String, Uuid);

#[derive(Clone)]
pub struct AppState {
  pub courses: Arc<RwLock<HashMap<Uuid, Course>>>,
  pub weeks: Arc<RwLock<HashMap<Uuid, Week>>>,
  /// Days keyed by week id; a present entry always holds the full set.
  pub days: Arc<RwLock<HashMap<Uuid, Vec<Day>>>>,
  pub progress: Arc<RwLock<HashMap<UserKey, UserProgress>>>,
  pub quizzes: Arc<RwLock<HashMap<Uuid, Quiz>>>,
  pub quiz_submissions: Arc<RwLock<HashMap<UserKey, QuizSubmission>>>,
  pub assignments: Arc<RwLock<HashMap<Uuid, Assignment>>>,
  pub assignment_submissions: Arc<RwLock<HashMap<UserKey, AssignmentSubmission>>>,
  week_locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
  pub openai: Option<OpenAI>,
  pub videos: VideoMatcher,
  pub generation: GenerationConfig,
  pub prompts: Prompts,
}

impl AppState {
  /// Build state from configuration: clients are constructed here, once.
  #[instrument(level = "info", skip_all)]
  pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
    let openai = OpenAI::from_config(&config.generation)?;
    if let Some(oa) = &openai {
      info!(target: "coursegen", base_url = %oa.base_url, outline_model = %config.generation.outline.model, detail_model = %config.generation.detail.model, "Text generation enabled.");
    } else {
      info!(target: "coursegen", "Text generation disabled (no GROQ_API_KEY). Course creation will fail; weeks use fallback content.");
    }
    let videos = VideoMatcher::from_config(&config.video)?;

    Ok(Self {
      courses: Arc::default(),
      weeks: Arc::default(),
      days: Arc::default(),
      progress: Arc::default(),
      quizzes: Arc::default(),
      quiz_submissions: Arc::default(),
      assignments: Arc::default(),
      assignment_submissions: Arc::default(),
      week_locks: Arc::default(),
      openai,
      videos,
      generation: config.generation,
      prompts: config.prompts,
    })
  }

  // --- courses & weeks ---

  /// Persist a course with its weeks in one step.
  #[instrument(level = "debug", skip_all, fields(course_id = %course.id, weeks = weeks.len()))]
  pub async fn insert_course(&self, course: Course, weeks: Vec<Week>) {
    let mut course_map = self.courses.write().await;
    let mut week_map = self.weeks.write().await;
    for week in weeks {
      week_map.insert(week.id, week);
    }
    course_map.insert(course.id, course);
  }

  pub async fn get_course(&self, id: Uuid) -> Option<Course> {
    self.courses.read().await.get(&id).cloned()
  }

  /// All courses, newest first.
  pub async fn list_courses(&self) -> Vec<Course> {
    let mut courses: Vec<Course> = self.courses.read().await.values().cloned().collect();
    courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    courses
  }

  pub async fn get_week(&self, id: Uuid) -> Option<Week> {
    self.weeks.read().await.get(&id).cloned()
  }

  /// Weeks of a course ordered by week number.
  pub async fn weeks_for(&self, course_id: Uuid) -> Vec<Week> {
    let mut weeks: Vec<Week> = self.weeks.read().await
      .values()
      .filter(|w| w.course_id == course_id)
      .cloned()
      .collect();
    weeks.sort_by_key(|w| w.week_number);
    weeks
  }

  pub async fn week_by_number(&self, course_id: Uuid, week_number: u32) -> Option<Week> {
    self.weeks.read().await
      .values()
      .find(|w| w.course_id == course_id && w.week_number == week_number)
      .cloned()
  }

  // --- days ---

  /// Days of a week ordered by day number (empty if not generated yet).
  pub async fn days_for(&self, week_id: Uuid) -> Vec<Day> {
    self.days.read().await.get(&week_id).cloned().unwrap_or_default()
  }

  /// Store the day set for a week unless one already exists. Returns whether it was stored.
  pub async fn insert_days(&self, week_id: Uuid, mut days: Vec<Day>) -> bool {
    let mut map = self.days.write().await;
    if map.get(&week_id).is_some_and(|existing| !existing.is_empty()) {
      return false;
    }
    days.sort_by_key(|d| d.day_number);
    map.insert(week_id, days);
    true
  }

  pub async fn get_day(&self, id: Uuid) -> Option<Day> {
    self.days.read().await.values().flatten().find(|d| d.id == id).cloned()
  }

  /// Lock serializing day generation for one week.
  pub async fn week_lock(&self, week_id: Uuid) -> Arc<Mutex<()>> {
    self.week_locks.lock().await.entry(week_id).or_default().clone()
  }

  /// Drop the week's lock entry once its days are committed. Waiters keep
  /// their own `Arc` and re-check the stored days after acquiring it.
  pub async fn release_week_lock(&self, week_id: Uuid) {
    self.week_locks.lock().await.remove(&week_id);
  }

  #[cfg(test)]
  pub(crate) async fn week_lock_count(&self) -> usize {
    self.week_locks.lock().await.len()
  }

  // --- progress ---

  /// Create a progress row if the user has none for this course. Returns true if created.
  pub async fn enroll(&self, user: &str, course_id: Uuid) -> bool {
    let mut map = self.progress.write().await;
    let key = (user.to_string(), course_id);
    if map.contains_key(&key) {
      return false;
    }
    map.insert(key, UserProgress::new(user, course_id));
    true
  }

  pub async fn get_progress(&self, user: &str, course_id: Uuid) -> Option<UserProgress> {
    self.progress.read().await.get(&(user.to_string(), course_id)).cloned()
  }

  pub async fn progress_for_user(&self, user: &str) -> Vec<UserProgress> {
    let mut rows: Vec<UserProgress> = self.progress.read().await
      .values()
      .filter(|p| p.user == user)
      .cloned()
      .collect();
    rows.sort_by(|a, b| a.enrolled_at.cmp(&b.enrolled_at));
    rows
  }

  /// Apply `f` to the user's progress row under the write lock.
  pub async fn update_progress<R>(&self, user: &str, course_id: Uuid, f: impl FnOnce(&mut UserProgress) -> R) -> Option<R> {
    let mut map = self.progress.write().await;
    map.get_mut(&(user.to_string(), course_id)).map(f)
  }

  /// Weeks, quizzes and assignments of a course.
  pub async fn course_totals(&self, course_id: Uuid) -> CourseTotals {
    let week_ids: Vec<Uuid> = self.weeks_for(course_id).await.into_iter().map(|w| w.id).collect();
    let quizzes = self.quizzes.read().await.values().filter(|q| week_ids.contains(&q.week_id)).count();
    let assignments = self.assignments.read().await.values().filter(|a| week_ids.contains(&a.week_id)).count();
    CourseTotals { weeks: week_ids.len(), quizzes, assignments }
  }

  // --- quizzes & assignments ---

  pub async fn insert_quiz(&self, quiz: Quiz) {
    self.quizzes.write().await.insert(quiz.id, quiz);
  }

  pub async fn get_quiz(&self, id: Uuid) -> Option<Quiz> {
    self.quizzes.read().await.get(&id).cloned()
  }

  /// Store a submission unless the user already submitted this quiz.
  pub async fn insert_quiz_submission(&self, submission: QuizSubmission) -> bool {
    let mut map = self.quiz_submissions.write().await;
    let key = (submission.user.clone(), submission.quiz_id);
    if map.contains_key(&key) {
      return false;
    }
    map.insert(key, submission);
    true
  }

  pub async fn insert_assignment(&self, assignment: Assignment) {
    self.assignments.write().await.insert(assignment.id, assignment);
  }

  pub async fn get_assignment(&self, id: Uuid) -> Option<Assignment> {
    self.assignments.read().await.get(&id).cloned()
  }

  /// Store a submission unless the user already submitted this assignment.
  pub async fn insert_assignment_submission(&self, submission: AssignmentSubmission) -> bool {
    let mut map = self.assignment_submissions.write().await;
    let key = (submission.user.clone(), submission.assignment_id);
    if map.contains_key(&key) {
      return false;
    }
    map.insert(key, submission);
    true
  }
}
