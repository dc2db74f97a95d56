//! Coursegen · Course Generation Backend
//!
//! - Axum HTTP API (courses, weeks, progress, dashboard, quizzes, assignments)
//! - Groq/OpenAI-compatible text generation for outlines and weekly detail
//! - YouTube search for per-day videos
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   GROQ_API_KEY           : enables text generation if present
//!   GROQ_BASE_URL          : default "https://api.groq.com/openai/v1"
//!   OUTLINE_MODEL / OUTLINE_TEMPERATURE
//!   DETAIL_MODEL / DETAIL_TEMPERATURE
//!   GENERATION_TIMEOUT_SECS: optional request timeout for generation calls
//!   YOUTUBE_API_KEY        : enables video matching if present
//!   YOUTUBE_BASE_URL       : default "https://www.googleapis.com/youtube/v3"
//!   YOUTUBE_TIMEOUT_SECS   : default 10
//!   COURSEGEN_CONFIG_PATH  : path to TOML config (prompt templates)
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use coursegen_backend::config::AppConfig;
use coursegen_backend::routes::build_router;
use coursegen_backend::state::AppState;
use coursegen_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

  // Shared application state (in-memory stores, generation + video clients, prompts).
  let state = Arc::new(AppState::new(config)?);
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "coursegen", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
