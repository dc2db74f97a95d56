//! Video lookup for day topics via the YouTube Data API search endpoint.
//!
//! `VideoMatcher::find` is a total function: every failure mode (missing key,
//! timeout, HTTP error, malformed body, zero results) collapses to `None`.

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::VideoSearchConfig;
use crate::domain::VideoRef;

/// Appended to every topic to bias results towards teaching material.
const QUERY_SUFFIX: &str = "tutorial education learning course";

#[derive(Debug, thiserror::Error)]
enum VideoSearchError {
  #[error("video search API key is not configured")]
  MissingKey,
  #[error("video search request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("video search returned HTTP {0}")]
  Status(u16),
}

#[derive(Clone, Debug)]
pub struct VideoMatcher {
  client: reqwest::Client,
  api_key: Option<String>,
  base_url: String,
}

impl VideoMatcher {
  pub fn from_config(config: &VideoSearchConfig) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    Ok(Self {
      client,
      api_key: config.api_key.clone(),
      base_url: config.base_url.trim_end_matches('/').to_string(),
    })
  }

  /// Best-match embeddable video for `topic`, or `None`.
  #[instrument(level = "debug", skip(self), fields(topic = %topic))]
  pub async fn find(&self, topic: &str) -> Option<VideoRef> {
    match self.search(topic).await {
      Ok(Some(video)) => {
        info!(target: "pipeline", %topic, embed_url = %video.embed_url, "video matched");
        Some(video)
      }
      Ok(None) => {
        debug!(target: "pipeline", %topic, "no video results");
        None
      }
      Err(VideoSearchError::MissingKey) => {
        debug!(target: "pipeline", "video search disabled (no YOUTUBE_API_KEY)");
        None
      }
      Err(e) => {
        warn!(target: "pipeline", %topic, error = %e, "video search failed");
        None
      }
    }
  }

  async fn search(&self, topic: &str) -> Result<Option<VideoRef>, VideoSearchError> {
    let api_key = self.api_key.as_deref().ok_or(VideoSearchError::MissingKey)?;
    let query = format!("{} {}", topic.trim(), QUERY_SUFFIX);
    let url = format!("{}/search", self.base_url);

    let res = self.client.get(&url)
      .query(&[
        ("part", "snippet"),
        ("q", query.as_str()),
        ("type", "video"),
        ("maxResults", "1"),
        ("key", api_key),
        ("videoDuration", "medium"),
        ("relevanceLanguage", "en"),
        ("videoEmbeddable", "true"),
        ("videoSyndicated", "true"),
      ])
      .send().await?;

    if !res.status().is_success() {
      return Err(VideoSearchError::Status(res.status().as_u16()));
    }

    let body: SearchResponse = res.json().await?;
    Ok(body.items.into_iter().next().and_then(SearchItem::into_video_ref))
  }
}

#[derive(Deserialize)]
struct SearchResponse {
  #[serde(default)] items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
  #[serde(default)] id: Option<SearchItemId>,
  #[serde(default)] snippet: Option<Snippet>,
}

#[derive(Deserialize)]
struct SearchItemId {
  #[serde(rename = "videoId", default)] video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
  #[serde(default)] thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct Thumbnails {
  #[serde(default)] high: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
  url: String,
}

impl SearchItem {
  /// Both the id and the high-res thumbnail must be present, or nothing is returned.
  fn into_video_ref(self) -> Option<VideoRef> {
    let video_id = self.id?.video_id.filter(|id| !id.trim().is_empty())?;
    let thumbnail_url = self.snippet?.thumbnails?.high?.url;
    if thumbnail_url.trim().is_empty() {
      return None;
    }
    Some(VideoRef {
      embed_url: format!("https://www.youtube.com/embed/{}", video_id.trim()),
      thumbnail_url,
    })
  }
}

/// Derive the `hqdefault` thumbnail for a known YouTube URL without calling the API.
///
/// Supports `youtube.com/watch?v=<id>` and `youtu.be/<id>`; anything else is `None`.
pub fn thumbnail_for_url(video_url: &str) -> Option<String> {
  let parsed = Url::parse(video_url.trim()).ok()?;
  let video_id = match parsed.host_str()? {
    "www.youtube.com" | "youtube.com" => parsed
      .query_pairs()
      .find(|(k, _)| k == "v")
      .map(|(_, v)| v.into_owned()),
    "www.youtu.be" | "youtu.be" => parsed
      .path_segments()
      .and_then(|mut segments| segments.next())
      .map(str::to_string),
    _ => None,
  }?;

  if video_id.is_empty() {
    return None;
  }
  Some(format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg"))
}
