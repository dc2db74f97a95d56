//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces `{key}` placeholders in one pass over the template: inserted values
/// are never scanned again, and unknown placeholders are left as they are.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let filled = after.find('}').and_then(|close| {
      let key = &after[..close];
      pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v, close))
    });
    match filled {
      Some((value, close)) => {
        out.push_str(value);
        rest = &after[close + 1..];
      }
      None => {
        out.push('{');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
  input
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
    .replace('\'', "&#39;")
}

/// Log-safe truncation for large strings (char boundary aware).
/// Avoids spamming logs with whole model responses.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x then y");
  }

  #[test]
  fn fill_template_does_not_refill_inserted_values() {
    let out = fill_template("{title} in {language}", &[("title", "Learn {language}"), ("language", "French")]);
    assert_eq!(out, "Learn {language} in French");
  }

  #[test]
  fn fill_template_keeps_unknown_and_unclosed_braces() {
    assert_eq!(fill_template("{x} {a} {", &[("a", "1")]), "{x} 1 {");
    assert_eq!(fill_template("{{a}}", &[("a", "1")]), "{1}");
  }

  #[test]
  fn escape_html_covers_markup_characters() {
    assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
  }

  #[test]
  fn trunc_for_log_respects_multibyte_chars() {
    let out = trunc_for_log("日本語テキスト", 3);
    assert!(out.starts_with("日本語…"));
  }
}
