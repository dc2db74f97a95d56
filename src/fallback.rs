//! Deterministic day content used when the model output cannot be parsed or
//! the weekly generation call failed. No generative call is involved.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::DAYS_PER_WEEK;
use crate::parser::{DayBody, ParsedDay};
use crate::util::escape_html;

static DAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^Day\s*\d+\s*[:.\-–]\s*").expect("day prefix pattern is valid")
});

/// Exactly six topics for a week: the outline's bullet lines in order,
/// padded with placeholder topics and truncated to six.
pub fn outline_topics(week_outline: &str, week_number: u32) -> Vec<String> {
  let mut topics: Vec<String> = week_outline
    .lines()
    .filter_map(bullet_text)
    .map(|text| DAY_PREFIX.replace(text, "").trim().to_string())
    .filter(|topic| !topic.is_empty())
    .collect();

  while topics.len() < DAYS_PER_WEEK as usize {
    topics.push(format!("Week {} Advanced Topic {}", week_number, topics.len() + 1));
  }
  topics.truncate(DAYS_PER_WEEK as usize);
  topics
}

/// Text of a Markdown bullet line (`- x`, `* x`, `+ x`), or `None`.
fn bullet_text(line: &str) -> Option<&str> {
  let line = line.trim();
  if let Some(rest) = line.strip_prefix('-') {
    return Some(rest.trim_start_matches('-').trim());
  }
  for marker in ['*', '+'] {
    if let Some(rest) = line.strip_prefix(marker) {
      if rest.starts_with(char::is_whitespace) {
        return Some(rest.trim());
      }
    }
  }
  None
}

/// Six templated days built from the week outline.
pub fn synthesize_week(week_outline: &str, week_number: u32, hours_per_day: u32) -> Vec<ParsedDay> {
  outline_topics(week_outline, week_number)
    .into_iter()
    .zip(1..=DAYS_PER_WEEK)
    .map(|(topic, day_number)| fallback_day(day_number, topic, hours_per_day))
    .collect()
}

pub fn fallback_day(day_number: u32, topic: String, hours_per_day: u32) -> ParsedDay {
  ParsedDay {
    day_number,
    title: format!("Day {day_number}: {topic}"),
    body: DayBody::Html(fallback_html(&topic, hours_per_day)),
    topic,
  }
}

fn fallback_html(topic: &str, hours_per_day: u32) -> String {
  let topic = escape_html(topic);
  let total = u64::from(hours_per_day) * 60;
  let theory = total / 4;
  let examples = total * 3 / 8;
  let exercises = total - theory - examples;

  format!(
    r#"<div class="fallback-content">
<h5>Learning Objectives</h5>
<ul>
<li>Understand the key concepts of {topic}</li>
<li>Apply {topic} in practical scenarios</li>
<li>Complete exercises to reinforce learning</li>
</ul>
<h5>Study Plan ({hours_per_day} hours)</h5>
<ol>
<li><strong>{theory} minutes:</strong> Review theoretical concepts</li>
<li><strong>{examples} minutes:</strong> Work through examples and case studies</li>
<li><strong>{exercises} minutes:</strong> Complete practical exercises</li>
</ol>
<h5>Key Concepts</h5>
<p>Today we'll focus on mastering {topic}. This includes understanding the fundamental principles and learning how to apply them in real-world scenarios.</p>
<h5>Practical Exercise</h5>
<p>Create a small project or complete exercises that demonstrate your understanding of {topic}.</p>
<h5>Additional Resources</h5>
<ul>
<li>Review the course materials</li>
<li>Practice with online exercises</li>
<li>Join discussion forums for help</li>
</ul>
</div>
"#
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  const OUTLINE: &str = "- Day 1: Variables - basics\n- Day 2: Control flow\n* Functions\n**Focus:** not a bullet\n";

  #[test]
  fn topics_come_from_bullets_and_are_padded() {
    let topics = outline_topics(OUTLINE, 2);
    assert_eq!(
      topics,
      [
        "Variables - basics",
        "Control flow",
        "Functions",
        "Week 2 Advanced Topic 4",
        "Week 2 Advanced Topic 5",
        "Week 2 Advanced Topic 6",
      ]
    );
  }

  #[test]
  fn topics_are_truncated_to_six() {
    let outline: String = (1..=9).map(|i| format!("- Topic {i}\n")).collect();
    let topics = outline_topics(&outline, 1);
    assert_eq!(topics.len(), 6);
    assert_eq!(topics[5], "Topic 6");
  }

  #[test]
  fn synthesized_week_is_six_ordered_days_and_deterministic() {
    for outline in ["", OUTLINE, "- a\n- b\n- c\n- d\n- e\n- f\n- g\n- h\n"] {
      let days = synthesize_week(outline, 3, 2);
      let numbers: Vec<_> = days.iter().map(|d| d.day_number).collect();
      assert_eq!(numbers, [1, 2, 3, 4, 5, 6]);
      assert_eq!(days, synthesize_week(outline, 3, 2));
    }
  }

  #[test]
  fn study_plan_scales_with_hours() {
    let day = fallback_day(1, "Ownership".into(), 2);
    let DayBody::Html(html) = &day.body else { panic!("fallback content must be html") };
    assert!(html.contains("Study Plan (2 hours)"));
    assert!(html.contains("<strong>30 minutes:</strong>"));
    assert!(html.contains("<strong>45 minutes:</strong>"));
    assert_eq!(day.title, "Day 1: Ownership");
    assert_eq!(day.topic, "Ownership");

    let day = fallback_day(1, "Ownership".into(), 4);
    let DayBody::Html(html) = &day.body else { panic!("fallback content must be html") };
    assert!(html.contains("<strong>60 minutes:</strong>"));
    assert!(html.contains("<strong>90 minutes:</strong>"));
  }

  #[test]
  fn study_plan_handles_huge_hour_counts() {
    let day = fallback_day(1, "x".into(), 100_000_000);
    let DayBody::Html(html) = &day.body else { panic!("fallback content must be html") };
    assert!(html.contains("<strong>1500000000 minutes:</strong>"));
    assert!(html.contains("<strong>2250000000 minutes:</strong>"));
  }

  #[test]
  fn topic_is_escaped_in_html() {
    let day = fallback_day(2, "<T> & generics".into(), 1);
    let DayBody::Html(html) = &day.body else { panic!("fallback content must be html") };
    assert!(html.contains("&lt;T&gt; &amp; generics"));
    assert!(!html.contains("<T>"));
  }
}
