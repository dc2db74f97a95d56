//! Weekly detail: one generation call per week, producing the six-day
//! breakdown that `parser` turns into day records.

use tracing::{info, instrument};

use crate::config::{ModelProfile, Prompts};
use crate::error::GenerationError;
use crate::openai::OpenAI;
use crate::util::{fill_template, trunc_for_log};

pub fn weekly_prompt(prompts: &Prompts, week_content: &str, week_number: u32, hours_per_day: u32) -> String {
  let week_number = week_number.to_string();
  let hours = hours_per_day.to_string();
  fill_template(
    &prompts.weekly_template,
    &[
      ("week_number", &week_number),
      ("week_content", week_content),
      ("hours_per_day", &hours),
    ],
  )
}

/// Generate the day-by-day plan for one week. The caller recovers from
/// errors by synthesizing fallback days.
#[instrument(level = "info", skip(openai, profile, prompts, week_content), fields(content_len = week_content.len()))]
pub async fn generate_weekly_detail(
  openai: Option<&OpenAI>,
  profile: &ModelProfile,
  prompts: &Prompts,
  week_content: &str,
  week_number: u32,
  hours_per_day: u32,
) -> Result<String, GenerationError> {
  let openai = openai.ok_or(GenerationError::NotConfigured)?;
  let prompt = weekly_prompt(prompts, week_content, week_number, hours_per_day);
  let detail = openai.complete(profile, &prompt).await?;
  info!(
    target: "pipeline",
    week_number,
    detail_len = detail.len(),
    preview = %trunc_for_log(&detail, 80),
    "weekly detail generated"
  );
  Ok(detail)
}
