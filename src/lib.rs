pub mod artifact;
pub mod config;
pub mod credentials;
pub mod document;
pub mod download;
pub mod error;
pub mod options;
pub mod output;
pub mod providers;
pub mod server;
pub mod service;
pub mod storage;
pub mod summarize;
pub mod transcript;
pub mod whisper;
pub mod youtube;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use error::{Error, Result};

/// Where a transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    Caption,
    Whisper,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Caption => write!(f, "caption"),
            TranscriptSource::Whisper => write!(f, "whisper"),
        }
    }
}

/// Transcript text for a video, ready to be summarized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub source: TranscriptSource,
}

/// What a summarization request returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub summary: String,
}

static VALID_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be)/\S+$").unwrap());

// Tried in order; the canonical watch URL wins when several match.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"[?&]v=([a-zA-Z0-9_-]{11})").unwrap(),
        Regex::new(r"youtu\.be/([a-zA-Z0-9_-]{11})").unwrap(),
        Regex::new(r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})").unwrap(),
    ]
});

/// Whether `url` points at youtube.com or youtu.be, with or without scheme and `www.`
pub fn is_valid_url(url: &str) -> bool {
    VALID_URL.is_match(url.trim())
}

/// Extract video ID from the watch, short-link and shorts URL shapes
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}
