//! Weekly-detail parsing: model text → `ParsedDay` records.
//!
//! Tiers run in order and the first non-empty result wins:
//! 1. `parse_structured`: `## Day n: title` / `**Topic:**` / `**Content:**` blocks.
//! 2. `parse_headings`: day headings only; first line is the title.
//! 3. `fallback::synthesize_week`: templated days from the week outline.
//!
//! `plan_days` also normalizes the winner to exactly six days numbered 1..6,
//! filling any missing day from the fallback topics for that position.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::DAYS_PER_WEEK;
use crate::fallback::{fallback_day, outline_topics, synthesize_week};
use crate::format::strip_emphasis;

static DAY_HEADING: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)##[ \t]*Day[ \t]*(\d+)[ \t]*:").expect("day heading pattern is valid")
});

/// Optional topic line, then a required content marker; the rest is the content block.
static DAY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)\A\s*(?:\*\*Topic:\*\*[ \t]*([^\r\n]*)\r?\n)?\s*\*\*Content:\*\*(.*)\z")
    .expect("day block pattern is valid")
});

const CONTENT_PLACEHOLDER: &str = "Content not available";

pub const FALLBACK_NOTICE: &str = "Using enhanced content format for this week.";

/// Day content before rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DayBody {
  /// Model Markdown; must go through `format::markdown_to_html` once.
  Markdown(String),
  /// Already-rendered display HTML.
  Html(String),
}

/// One parsed day, independent of the raw text shape it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDay {
  pub day_number: u32,
  pub title: String,
  /// Query text for the video matcher.
  pub topic: String,
  pub body: DayBody,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySource {
  Structured,
  Headings,
  Fallback,
}

#[derive(Clone, Debug)]
pub struct DayPlan {
  /// Exactly six days, ordered 1..6.
  pub days: Vec<ParsedDay>,
  pub source: DaySource,
  /// Days filled in from fallback topics because the model skipped them.
  pub padded: usize,
}

impl DayPlan {
  /// User-facing note when the week uses templated content.
  pub fn notice(&self) -> Option<&'static str> {
    (self.source == DaySource::Fallback).then_some(FALLBACK_NOTICE)
  }
}

/// Tier 1: the exact format requested from the model.
///
/// Entries whose day number does not parse, whose title is blank or that lack
/// a `**Content:**` marker are skipped.
pub fn parse_structured(text: &str) -> Vec<ParsedDay> {
  let mut days = Vec::new();

  for (segment, number) in day_segments(text) {
    let Ok(day_number) = number.parse::<u32>() else {
      debug!(target: "pipeline", %number, "skipping day with unparseable number");
      continue;
    };
    let (title_line, rest) = segment.split_once('\n').unwrap_or((segment, ""));
    let title = title_line.trim();
    if title.is_empty() {
      continue;
    }
    let Some(caps) = DAY_BLOCK.captures(rest) else {
      continue;
    };

    let topic = caps.get(1).map(|m| m.as_str().trim()).filter(|t| !t.is_empty()).unwrap_or(title);
    let content = caps.get(2).map(|m| m.as_str().trim()).filter(|c| !c.is_empty()).unwrap_or(CONTENT_PLACEHOLDER);

    days.push(ParsedDay {
      day_number,
      title: title.to_string(),
      topic: topic.to_string(),
      body: DayBody::Markdown(strip_emphasis(content)),
    });
  }

  days
}

/// Tier 2: split on day headings only and number segments sequentially.
pub fn parse_headings(text: &str, week_number: u32) -> Vec<ParsedDay> {
  day_segments(text)
    .into_iter()
    .zip(1u32..)
    .map(|((segment, _), day_number)| {
      let mut lines = segment.trim().lines().map(str::trim).skip_while(|l| l.is_empty());
      let title = lines
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Week {week_number} Day {day_number}"));

      let content_lines: Vec<&str> = lines.filter(|l| !l.is_empty() && !l.starts_with("**")).collect();
      let content = if content_lines.is_empty() {
        format!("Detailed content for {title}.")
      } else {
        content_lines.join("\n\n")
      };

      ParsedDay {
        day_number,
        title: format!("Day {day_number}: {title}"),
        topic: title,
        body: DayBody::Markdown(content),
      }
    })
    .collect()
}

/// Text following each day heading up to the next one, with the heading's number.
fn day_segments(text: &str) -> Vec<(&str, &str)> {
  let heads: Vec<_> = DAY_HEADING.captures_iter(text).collect();
  heads
    .iter()
    .enumerate()
    .filter_map(|(idx, caps)| {
      let whole = caps.get(0)?;
      let end = heads.get(idx + 1).and_then(|next| next.get(0)).map_or(text.len(), |m| m.start());
      let number = caps.get(1).map_or("", |m| m.as_str());
      Some((&text[whole.end()..end], number))
    })
    .collect()
}

/// Run the tier chain and normalize to six days.
///
/// `detail` is `None` when the weekly generation call failed; the fallback
/// synthesizer is used directly in that case.
pub fn plan_days(detail: Option<&str>, week_outline: &str, week_number: u32, hours_per_day: u32) -> DayPlan {
  let parsed = detail.and_then(|text| {
    let structured = parse_structured(text);
    if !structured.is_empty() {
      return Some((structured, DaySource::Structured));
    }
    warn!(target: "pipeline", week_number, "structured day parse found nothing; trying heading split");
    let headings = parse_headings(text, week_number);
    if !headings.is_empty() {
      return Some((headings, DaySource::Headings));
    }
    warn!(target: "pipeline", week_number, "heading split found nothing; using fallback days");
    None
  });

  let Some((parsed, source)) = parsed else {
    return DayPlan {
      days: synthesize_week(week_outline, week_number, hours_per_day),
      source: DaySource::Fallback,
      padded: 0,
    };
  };

  let mut by_number: BTreeMap<u32, ParsedDay> = BTreeMap::new();
  for day in parsed {
    if !(1..=DAYS_PER_WEEK).contains(&day.day_number) {
      warn!(target: "pipeline", week_number, day_number = day.day_number, "dropping day outside 1..6");
      continue;
    }
    if by_number.contains_key(&day.day_number) {
      warn!(target: "pipeline", week_number, day_number = day.day_number, "dropping duplicate day");
      continue;
    }
    by_number.insert(day.day_number, day);
  }

  let topics = outline_topics(week_outline, week_number);
  let mut padded = 0;
  for (day_number, topic) in (1..=DAYS_PER_WEEK).zip(topics) {
    by_number.entry(day_number).or_insert_with(|| {
      padded += 1;
      fallback_day(day_number, topic, hours_per_day)
    });
  }
  if padded > 0 {
    warn!(target: "pipeline", week_number, padded, "model output was short; padded with fallback days");
  }

  // Nothing usable survived normalization: the week is entirely fallback content.
  let source = if padded == DAYS_PER_WEEK as usize { DaySource::Fallback } else { source };

  info!(target: "pipeline", week_number, ?source, padded, "weekly days planned");
  DayPlan { days: by_number.into_values().collect(), source, padded }
}
