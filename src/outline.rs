//! Course outline: prompt construction, the single generation call, and
//! splitting the returned Markdown into per-week blocks.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument, warn};

use crate::config::{ModelProfile, Prompts};
use crate::domain::CourseSpec;
use crate::error::GenerationError;
use crate::openai::OpenAI;
use crate::util::{fill_template, trunc_for_log};

static WEEK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)Week\s*\d+").expect("week header pattern is valid")
});

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digits pattern is valid"));

/// One entry of the split outline, in outline order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineWeek {
  /// Header text as matched, e.g. `Week 3`.
  pub title: String,
  pub week_number: Option<u32>,
  pub body: String,
}

pub fn outline_prompt(prompts: &Prompts, spec: &CourseSpec) -> String {
  let duration = spec.duration_months().to_string();
  let total_weeks = spec.total_weeks().to_string();
  let hours = spec.hours_per_day().to_string();
  fill_template(
    &prompts.outline_template,
    &[
      ("title", spec.title()),
      ("level_has", spec.level_has()),
      ("level_required", spec.level_required()),
      ("language", spec.language()),
      ("duration", &duration),
      ("total_weeks", &total_weeks),
      ("hours_per_day", &hours),
    ],
  )
}

/// Ask the model for the full course outline. Errors propagate; there is no
/// retry and no fallback at this stage.
#[instrument(level = "info", skip_all, fields(title = %spec.title(), total_weeks = spec.total_weeks()))]
pub async fn generate_outline(
  openai: Option<&OpenAI>,
  profile: &ModelProfile,
  prompts: &Prompts,
  spec: &CourseSpec,
) -> Result<String, GenerationError> {
  let openai = openai.ok_or(GenerationError::NotConfigured)?;
  let prompt = outline_prompt(prompts, spec);
  let outline = openai.complete(profile, &prompt).await?;
  info!(
    target: "pipeline",
    outline_len = outline.len(),
    preview = %trunc_for_log(&outline, 80),
    "course outline generated"
  );
  Ok(outline)
}

/// Split an outline on `Week <n>` markers (case-insensitive).
///
/// The body of each week is the text up to the next marker or the end of the
/// outline. A repeated title keeps its first position and takes the later
/// body. Weeks the model skipped are simply absent.
pub fn split_weeks(outline: &str) -> Vec<OutlineWeek> {
  let headers: Vec<_> = WEEK_HEADER.find_iter(outline).collect();
  let mut weeks: Vec<OutlineWeek> = Vec::with_capacity(headers.len());

  for (idx, header) in headers.iter().enumerate() {
    let end = headers.get(idx + 1).map_or(outline.len(), |next| next.start());
    let body = clean_body(&outline[header.end()..end]);
    let title = header.as_str().trim().to_string();
    let week_number = DIGITS.find(&title).and_then(|m| m.as_str().parse().ok());

    match weeks.iter_mut().find(|w| w.title == title) {
      Some(existing) => {
        warn!(target: "pipeline", %title, "duplicate week header in outline; keeping later body");
        existing.body = body;
      }
      None => weeks.push(OutlineWeek { title, week_number, body }),
    }
  }

  weeks
}

/// Trim whitespace and the heading markers that belong to the next header
/// (`## ` before `Week 2` ends up at the tail of week 1).
fn clean_body(raw: &str) -> String {
  raw.trim().trim_end_matches('#').trim().to_string()
}
