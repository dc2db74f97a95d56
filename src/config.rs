//! Runtime configuration: credentials, endpoints, model profiles and prompt
//! templates.
//!
//! Everything is read once in `main` and handed to the components that need
//! it; nothing here is process-global. Prompts can be overridden through a
//! TOML file named by `COURSEGEN_CONFIG_PATH` (see `Prompts`).

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Clone, Debug)]
pub struct AppConfig {
  pub port: u16,
  pub generation: GenerationConfig,
  pub video: VideoSearchConfig,
  pub prompts: Prompts,
}

/// Model + sampling temperature used for one kind of generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelProfile {
  pub model: String,
  pub temperature: f32,
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
  /// `None` disables generation: outlines fail, weeks use fallback content.
  pub api_key: Option<String>,
  pub base_url: String,
  pub outline: ModelProfile,
  pub detail: ModelProfile,
  pub request_timeout: Option<Duration>,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      base_url: DEFAULT_GROQ_BASE_URL.into(),
      outline: ModelProfile { model: "llama-3.1-8b-instant".into(), temperature: 0.7 },
      detail: ModelProfile { model: "llama3-8b-8192".into(), temperature: 0.3 },
      request_timeout: None,
    }
  }
}

#[derive(Clone, Debug)]
pub struct VideoSearchConfig {
  pub api_key: Option<String>,
  pub base_url: String,
  pub timeout: Duration,
}

impl Default for VideoSearchConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      base_url: DEFAULT_YOUTUBE_BASE_URL.into(),
      timeout: Duration::from_secs(10),
    }
  }
}

/// Prompt templates. Placeholders use `{name}` syntax (see `util::fill_template`).
///
/// Outline placeholders: `title`, `level_has`, `level_required`, `language`,
/// `duration`, `total_weeks`, `hours_per_day`.
/// Weekly placeholders: `week_number`, `week_content`, `hours_per_day`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub outline_template: String,
  pub weekly_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      outline_template: DEFAULT_OUTLINE_TEMPLATE.into(),
      weekly_template: DEFAULT_WEEKLY_TEMPLATE.into(),
    }
  }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct FileConfig {
  #[serde(default)]
  prompts: Prompts,
}

impl AppConfig {
  /// Build configuration from environment variables.
  pub fn from_env() -> Self {
    let defaults = GenerationConfig::default();
    let generation = GenerationConfig {
      api_key: env_nonempty("GROQ_API_KEY"),
      base_url: env_nonempty("GROQ_BASE_URL").unwrap_or(defaults.base_url),
      outline: ModelProfile {
        model: env_nonempty("OUTLINE_MODEL").unwrap_or(defaults.outline.model),
        temperature: env_parse("OUTLINE_TEMPERATURE").unwrap_or(defaults.outline.temperature),
      },
      detail: ModelProfile {
        model: env_nonempty("DETAIL_MODEL").unwrap_or(defaults.detail.model),
        temperature: env_parse("DETAIL_TEMPERATURE").unwrap_or(defaults.detail.temperature),
      },
      request_timeout: env_parse::<u64>("GENERATION_TIMEOUT_SECS").map(Duration::from_secs),
    };

    let video_defaults = VideoSearchConfig::default();
    let video = VideoSearchConfig {
      api_key: env_nonempty("YOUTUBE_API_KEY"),
      base_url: env_nonempty("YOUTUBE_BASE_URL").unwrap_or(video_defaults.base_url),
      timeout: env_parse::<u64>("YOUTUBE_TIMEOUT_SECS")
        .map(Duration::from_secs)
        .unwrap_or(video_defaults.timeout),
    };

    let prompts = load_prompts_from_env().unwrap_or_default();
    let port = env_parse::<u16>("PORT").unwrap_or(3000);

    Self { port, generation, video, prompts }
  }
}

fn env_nonempty(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
  env_nonempty(key).and_then(|v| v.trim().parse().ok())
}

/// Attempt to load prompts from COURSEGEN_CONFIG_PATH. On any parsing/IO error, returns None.
fn load_prompts_from_env() -> Option<Prompts> {
  let path = std::env::var("COURSEGEN_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_prompts(&s) {
      Ok(prompts) => {
        info!(target: "coursegen", %path, "Loaded prompt config (TOML)");
        Some(prompts)
      }
      Err(e) => {
        error!(target: "coursegen", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "coursegen", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

fn parse_prompts(raw: &str) -> Result<Prompts, toml::de::Error> {
  toml::from_str::<FileConfig>(raw).map(|cfg| cfg.prompts)
}

const DEFAULT_OUTLINE_TEMPLATE: &str = r#"Create an extremely detailed course outline for a course titled "{title}".
The course should be designed for learners with a "{level_has}" level of knowledge and aims to bring them to a "{level_required}" level.
The outline generated should be in "{language}" and will span approximately "{duration}" months ({total_weeks} weeks).
The student can study for {hours_per_day} hours per day.

Important instructions:
- The total number of weeks = {duration} * 4 = {total_weeks}.
- Generate an outline that covers all weeks without skipping.
- Use clear headings in the exact format:
## Week 1
## Week 2
... until ## Week {total_weeks}.

- For each week, provide exactly 6 bullet points (one for each day of the week, assuming one rest day).
- Ensure progression is logical from beginner to advanced concepts.
- Include both theoretical concepts and practical exercises.
- Consider that the student has {hours_per_day} hours available per day when planning the content.
- Format the response in Markdown.

Example structure:

## Week 1
- Day 1: Introduction to [Topic] - Basic concepts and definitions
- Day 2: [Topic] Fundamentals - Core principles and examples
- Day 3: Practical Exercise - Hands-on practice with guidance
- Day 4: Advanced Concepts - Deeper understanding
- Day 5: Real-world Application - How to apply in practice
- Day 6: Review and Assessment - Test your knowledge
"#;

const DEFAULT_WEEKLY_TEMPLATE: &str = r###"Create a detailed 6-day learning plan for Week {week_number} with the following topics: {week_content}

The student has {hours_per_day} hours available per day for study.

CRITICAL FORMATTING REQUIREMENTS:
- You MUST use EXACTLY this format for each day, no variations:

## Day 1: [Specific Topic Title]
**Topic:** [Clear, concise topic description for video search]
**Content:**
[Detailed learning content for {hours_per_day} hours of study including clear learning objectives, theoretical explanations, practical examples, hands-on exercises and real-world applications]

## Day 2: [Specific Topic Title]
**Topic:** [Clear topic description]
**Content:**
[Detailed content for {hours_per_day} hours...]

Continue this exact pattern for all 6 days.

IMPORTANT:
- Each day MUST start with "## Day X: " exactly
- Each day MUST have "**Topic:**" on the next line with a clear topic description
- Each day MUST have "**Content:**" on the line after that
- Content should be detailed enough for {hours_per_day} hours of study
- Make each day's content self-contained and ensure logical progression from day to day
- The topic line should be specific enough to find relevant educational videos
"###;
