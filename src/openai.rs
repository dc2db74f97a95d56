//! Minimal OpenAI-compatible chat client (Groq exposes the same API).
//!
//! We only call chat.completions with a single user message and read back the
//! first choice as plain text. Calls are instrumented and log model names,
//! latencies, and response sizes (not contents). The API key is never logged.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::{GenerationConfig, ModelProfile};
use crate::error::GenerationError;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
}

impl std::fmt::Debug for OpenAI {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OpenAI").field("base_url", &self.base_url).finish_non_exhaustive()
  }
}

impl OpenAI {
  /// Construct the client if the config carries an API key; otherwise return None.
  pub fn from_config(config: &GenerationConfig) -> Result<Option<Self>, reqwest::Error> {
    let Some(api_key) = config.api_key.clone() else {
      return Ok(None);
    };

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    Ok(Some(Self {
      client,
      api_key,
      base_url: config.base_url.trim_end_matches('/').to_string(),
    }))
  }

  /// Plain-text chat completion with a single user message.
  #[instrument(level = "info", skip(self, prompt), fields(model = %profile.model, prompt_len = prompt.len()))]
  pub async fn complete(&self, profile: &ModelProfile, prompt: &str) -> Result<String, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: profile.model.clone(),
      messages: vec![ChatMessageReq { role: "user".into(), content: prompt.into() }],
      temperature: profile.temperature,
    };

    let started = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "coursegen-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(GenerationError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "completion usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();

    if text.trim().is_empty() {
      return Err(GenerationError::EmptyOutput);
    }
    info!(elapsed = ?started.elapsed(), response_len = text.len(), "completion received");
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_message_is_extracted_from_json_body() {
    let body = r#"{"error":{"message":"rate limited","type":"requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("rate limited"));
    assert_eq!(extract_openai_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn missing_api_key_disables_client() {
    let config = GenerationConfig::default();
    assert!(OpenAI::from_config(&config).unwrap().is_none());
  }
}
