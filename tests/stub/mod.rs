//! In-process stand-ins for the chat completion API and the video search API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use regex::Regex;
use serde_json::{json, Value};

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum OutlineBehavior {
    /// One `## Week N` section per requested week, six bullets each.
    Complete,
    /// HTTP 500 with an OpenAI-style error body.
    Fail,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum WeeklyBehavior {
    /// `## Day N:` + `**Topic:**` + `**Content:**` for all six days.
    Structured,
    /// Only the first three days, still structured.
    Short,
    /// Day headings without content markers.
    HeadingsOnly,
    /// Prose with no day headings at all.
    Unstructured,
    Fail,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum VideoBehavior {
    Found,
    Empty,
    Error,
    Malformed,
    Slow(Duration),
}

#[derive(Debug, Clone)]
pub struct StubConfig {
    pub outline: OutlineBehavior,
    pub weekly: WeeklyBehavior,
    pub video: VideoBehavior,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            outline: OutlineBehavior::Complete,
            weekly: WeeklyBehavior::Structured,
            video: VideoBehavior::Found,
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub outline_calls: AtomicUsize,
    pub weekly_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
}

#[allow(dead_code)]
impl Counters {
    pub fn outline(&self) -> usize { self.outline_calls.load(Ordering::SeqCst) }
    pub fn weekly(&self) -> usize { self.weekly_calls.load(Ordering::SeqCst) }
    pub fn video(&self) -> usize { self.video_calls.load(Ordering::SeqCst) }
}

pub struct Stub {
    /// Base for the chat API, e.g. `http://127.0.0.1:1234/v1`.
    pub chat_base_url: String,
    /// Base for the video API, e.g. `http://127.0.0.1:1234/youtube/v3`.
    pub video_base_url: String,
    pub counters: Arc<Counters>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Stub {
    pub fn spawn(config: StubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start stub server");
        let addr = server.server_addr();
        let chat_base_url = format!("http://{addr}/v1");
        let video_base_url = format!("http://{addr}/youtube/v3");
        let counters = Arc::new(Counters::default());
        let thread_counters = counters.clone();

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let url = request.url().to_string();
            let path = url.split('?').next().unwrap_or_default().to_string();
            let method = request.method().clone();
            let (status, body) = match (&method, path.as_str()) {
                (tiny_http::Method::Post, "/v1/chat/completions") => {
                    let mut raw = String::new();
                    if request.as_reader().read_to_string(&mut raw).is_err() {
                        (400, "invalid request body".to_string())
                    } else {
                        chat_response(&raw, &config, &thread_counters)
                    }
                }
                (tiny_http::Method::Get, "/youtube/v3/search") => {
                    thread_counters.video_calls.fetch_add(1, Ordering::SeqCst);
                    if !url.contains("key=") || !url.contains("type=video") {
                        (400, "missing search parameters".to_string())
                    } else {
                        video_response(config.video)
                    }
                }
                _ => (404, "not found".to_string()),
            };

            let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("build header");
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        });

        Self {
            chat_base_url,
            video_base_url,
            counters,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn chat_response(raw: &str, config: &StubConfig, counters: &Counters) -> (u16, String) {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return (400, "invalid json".to_string()),
    };
    let Some(prompt) = parsed.pointer("/messages/0/content").and_then(|v| v.as_str()) else {
        return (400, "missing message".to_string());
    };

    let text = if prompt.contains("course outline") {
        counters.outline_calls.fetch_add(1, Ordering::SeqCst);
        match config.outline {
            OutlineBehavior::Complete => outline_text(capture_number(prompt, r"\((\d+) weeks\)").unwrap_or(4)),
            OutlineBehavior::Fail => return api_error("outline model unavailable"),
        }
    } else if prompt.contains("learning plan for Week") {
        counters.weekly_calls.fetch_add(1, Ordering::SeqCst);
        let week = capture_number(prompt, r"learning plan for Week (\d+)").unwrap_or(1);
        match config.weekly {
            WeeklyBehavior::Structured => structured_week(week, 6),
            WeeklyBehavior::Short => structured_week(week, 3),
            WeeklyBehavior::HeadingsOnly => headings_week(week),
            WeeklyBehavior::Unstructured => "Study hard this week. Practice every day.".to_string(),
            WeeklyBehavior::Fail => return api_error("weekly model unavailable"),
        }
    } else {
        return (400, "unknown prompt mode".to_string());
    };

    let body = json!({
        "id": "chatcmpl-stub",
        "object": "chat.completion",
        "model": parsed.get("model").cloned().unwrap_or(Value::String("stub-model".to_owned())),
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
    });
    (200, body.to_string())
}

fn api_error(message: &str) -> (u16, String) {
    (500, json!({ "error": { "message": message, "type": "server_error" } }).to_string())
}

fn capture_number(text: &str, pattern: &str) -> Option<u32> {
    Regex::new(pattern).ok()?.captures(text)?.get(1)?.as_str().parse().ok()
}

fn outline_text(weeks: u32) -> String {
    let mut out = String::from("# Course Outline\n\n");
    for w in 1..=weeks {
        out.push_str(&format!("## Week {w}: Module {w}\n"));
        for d in 1..=6 {
            out.push_str(&format!("- Day {d}: Lesson {d} of module {w}\n"));
        }
        out.push('\n');
    }
    out
}

fn structured_week(week: u32, days: u32) -> String {
    let mut out = String::new();
    for d in 1..=days {
        out.push_str(&format!(
            "## Day {d}: Week {week} Lesson {d}\n**Topic:** week {week} topic {d}\n**Content:**\nRead the notes for lesson {d}.\n\n- first step\n- second step\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n"
        ));
    }
    out
}

fn headings_week(week: u32) -> String {
    let mut out = String::new();
    for d in 1..=6 {
        out.push_str(&format!("## Day {d}: Week {week} Heading {d}\nPlain notes for day {d}.\n\n"));
    }
    out
}

fn video_response(behavior: VideoBehavior) -> (u16, String) {
    match behavior {
        VideoBehavior::Found => {
            let id = "stubVideo01";
            let body = json!({
                "items": [{
                    "id": { "kind": "youtube#video", "videoId": id },
                    "snippet": {
                        "title": "Stub video",
                        "thumbnails": { "high": { "url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg") } }
                    }
                }]
            });
            (200, body.to_string())
        }
        VideoBehavior::Empty => (200, json!({ "items": [] }).to_string()),
        VideoBehavior::Error => (403, json!({ "error": { "message": "quota exceeded" } }).to_string()),
        VideoBehavior::Malformed => (200, "{ not json".to_string()),
        VideoBehavior::Slow(delay) => {
            thread::sleep(delay);
            (200, json!({ "items": [] }).to_string())
        }
    }
}
