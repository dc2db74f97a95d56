//! Per (user, course) completion tracking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::DAYS_PER_WEEK;

/// Item counts of a course that feed the completion percentage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CourseTotals {
  pub weeks: usize,
  pub quizzes: usize,
  pub assignments: usize,
}

impl CourseTotals {
  pub fn total_items(&self) -> usize {
    self.weeks * DAYS_PER_WEEK as usize + self.quizzes + self.assignments
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct UserProgress {
  pub user: String,
  pub course_id: Uuid,
  pub current_week: u32,
  pub current_day: u32,
  /// String-encoded ids, in completion order. Never shrinks.
  pub completed_days: Vec<String>,
  pub completed_quizzes: Vec<String>,
  pub completed_assignments: Vec<String>,
  pub is_completed: bool,
  pub enrolled_at: DateTime<Utc>,
  pub last_accessed: DateTime<Utc>,
}

impl UserProgress {
  pub fn new(user: impl Into<String>, course_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      user: user.into(),
      course_id,
      current_week: 1,
      current_day: 1,
      completed_days: Vec::new(),
      completed_quizzes: Vec::new(),
      completed_assignments: Vec::new(),
      is_completed: false,
      enrolled_at: now,
      last_accessed: now,
    }
  }

  /// Mark a day complete. Returns false if it was already recorded.
  ///
  /// The current pointers move to the day's position unless they are already
  /// further along; the course completes once `weeks * 6` days are recorded.
  pub fn record_day(&mut self, day_id: &str, week_number: u32, day_number: u32, weeks: usize) -> bool {
    self.last_accessed = Utc::now();
    let added = insert_unique(&mut self.completed_days, day_id);

    if (week_number, day_number) > (self.current_week, self.current_day) {
      self.current_week = week_number;
      self.current_day = day_number;
    }
    if self.completed_days.len() >= weeks * DAYS_PER_WEEK as usize {
      self.is_completed = true;
    }
    added
  }

  pub fn record_quiz(&mut self, quiz_id: &str) -> bool {
    self.last_accessed = Utc::now();
    insert_unique(&mut self.completed_quizzes, quiz_id)
  }

  pub fn record_assignment(&mut self, assignment_id: &str) -> bool {
    self.last_accessed = Utc::now();
    insert_unique(&mut self.completed_assignments, assignment_id)
  }

  pub fn completed_count(&self) -> usize {
    self.completed_days.len() + self.completed_quizzes.len() + self.completed_assignments.len()
  }

  /// Completion in percent, capped at 100; 0 for a course with no items.
  pub fn percentage(&self, totals: &CourseTotals) -> f64 {
    let total = totals.total_items();
    if total == 0 {
      return 0.0;
    }
    (self.completed_count() as f64 * 100.0 / total as f64).min(100.0)
  }
}

fn insert_unique(set: &mut Vec<String>, id: &str) -> bool {
  if set.iter().any(|existing| existing == id) {
    return false;
  }
  set.push(id.to_string());
  true
}
