//! Error taxonomy for the generation pipeline and the HTTP surface.
//!
//! Weekly-detail, parse and video failures are recovered inside the pipeline
//! and never reach `ApiError`; only validation, outline generation and
//! store lookups surface to callers.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

/// Rejected course request. The message is user-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("missing required field: {0}")]
  Missing(&'static str),
  #[error("{field} must be a positive integer, got {value:?}")]
  NotPositiveInteger { field: &'static str, value: String },
  #[error("{field} must be at most {max}, got {value}")]
  TooLarge { field: &'static str, max: u32, value: u32 },
}

/// Failure of a call to the generative text API.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
  #[error("text generation is not configured (no API key)")]
  NotConfigured,
  #[error("request to text generation API failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("text generation API returned {status}: {message}")]
  Status { status: u16, message: String },
  #[error("text generation API returned an empty completion")]
  EmptyOutput,
}

/// Errors returned by service operations and rendered as JSON payloads.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error(transparent)]
  Validation(#[from] ValidationError),
  #[error("error creating course: {0}")]
  Generation(#[from] GenerationError),
  #[error("{0} not found")]
  NotFound(String),
  #[error("{0}")]
  Conflict(String),
  #[error("missing X-User header")]
  MissingUser,
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::MissingUser => StatusCode::UNAUTHORIZED,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    tracing::warn!(target: "coursegen", %status, error = %self, "request failed");
    (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
  }
}
