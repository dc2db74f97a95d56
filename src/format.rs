//! Markdown → display HTML for day content.

use pulldown_cmark::{Event, Options, Parser};

/// Render model-produced Markdown to HTML.
///
/// Tables, strikethrough and footnotes are enabled, single newlines become
/// `<br />`, and raw HTML from the input is escaped rather than passed through.
/// Not idempotent: format a given text exactly once.
pub fn markdown_to_html(md: &str) -> String {
  let mut options = Options::empty();
  options.insert(Options::ENABLE_TABLES);
  options.insert(Options::ENABLE_STRIKETHROUGH);
  options.insert(Options::ENABLE_FOOTNOTES);

  let parser = Parser::new_ext(md, options).map(|event| match event {
    Event::SoftBreak => Event::HardBreak,
    Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
    other => other,
  });

  let mut html = String::new();
  pulldown_cmark::html::push_html(&mut html, parser);
  html
}

/// Drop bold/italic/code markers the model sprinkles into content blocks.
pub fn strip_emphasis(text: &str) -> String {
  text.chars().filter(|c| *c != '*' && *c != '`').collect()
}
