//! Course generation backend: LLM-authored course outlines, lazily generated
//! daily lessons with video matches, and per-user progress tracking.

pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod format;
pub mod logic;
pub mod openai;
pub mod outline;
pub mod parser;
pub mod progress;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod video;
pub mod weekly;
