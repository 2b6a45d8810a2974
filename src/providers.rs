//! Narrow interfaces to the external services the pipeline drives.
//!
//! Implementations return `eyre::Result`; callers in the pipeline turn those
//! reports into [`crate::Error`] values.

use std::path::PathBuf;

use async_trait::async_trait;
use eyre::Result;
use serde::Serialize;

/// One caption line as returned by the transcript service
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptItem {
    pub text: String,
}

#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptItem>>;
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub audio_only: bool,
    /// Where the finished audio file is expected
    pub output_path: PathBuf,
    /// Audio container/codec to convert to, e.g. "mp3"
    pub format: String,
}

/// Writes the audio for `url` to `request.output_path`.
///
/// May return `Ok` without producing a file; callers check for it.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub language: String,
    pub format: String,
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        request: &TranscriptionRequest,
        api_key: &str,
    ) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Chat-style completion. `Ok(None)` means the service answered without content.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        api_key: &str,
    ) -> Result<Option<String>>;
}

/// Keeps a copy of downloaded audio outside the download directory.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `audio` under `file_name` and return where it went
    async fn store(&self, file_name: &str, audio: &[u8]) -> Result<String>;
}

#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn pdf_text(&self, bytes: &[u8]) -> Result<String>;
    async fn docx_text(&self, bytes: &[u8]) -> Result<String>;
}
