use std::fmt;
use std::path::Path;

use log::{debug, info, warn};

use crate::artifact::AudioArtifact;
use crate::error::{Error, Result};
use crate::providers::{
    ArtifactStore, AudioDownloader, DownloadRequest, SpeechToText, TranscriptFetcher, TranscriptItem,
    TranscriptionRequest,
};
use crate::{Transcript, TranscriptSource, extract_video_id};

pub const AUDIO_EXTENSION: &str = "mp3";
const TRANSCRIPTION_LANGUAGE: &str = "en";
const TRANSCRIPTION_FORMAT: &str = "json";

/// Why the caption path was abandoned in favour of audio transcription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NoVideoId,
    FetchFailed(String),
    NoText,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoVideoId => write!(f, "no video id in URL"),
            FallbackReason::FetchFailed(e) => write!(f, "caption fetch failed: {e}"),
            FallbackReason::NoText => write!(f, "caption track is empty"),
        }
    }
}

/// Trim each caption line, drop blanks, join with single spaces
pub fn join_items(items: &[TranscriptItem]) -> String {
    items
        .iter()
        .map(|item| item.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first `max_tokens / 4` whitespace-separated words
pub fn truncate_words(text: &str, max_tokens: usize) -> String {
    let budget = max_tokens / 4;
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= budget {
        return words.join(" ");
    }
    debug!("Truncating transcript from {} to {budget} words", words.len());
    words[..budget].join(" ")
}

/// Gets a transcript for a video URL: captions first, audio transcription second.
pub struct TranscriptPipeline<'a> {
    pub fetcher: &'a dyn TranscriptFetcher,
    pub downloader: &'a dyn AudioDownloader,
    pub speech: &'a dyn SpeechToText,
    /// Gets a copy of the downloaded audio, when object storage is configured
    pub store: Option<&'a dyn ArtifactStore>,
    pub download_dir: &'a Path,
    pub max_tokens: usize,
}

impl TranscriptPipeline<'_> {
    pub async fn acquire(&self, url: &str, api_key: &str) -> Result<Transcript> {
        match self.direct(url).await {
            Ok(text) => {
                info!("Using caption transcript for {url}");
                Ok(Transcript {
                    text,
                    source: TranscriptSource::Caption,
                })
            }
            Err(reason) => {
                info!("Falling back to audio transcription for {url}: {reason}");
                let text = self.from_audio(url, api_key).await?;
                Ok(Transcript {
                    text,
                    source: TranscriptSource::Whisper,
                })
            }
        }
    }

    /// Caption track for the video, truncated to the token budget
    pub async fn direct(&self, url: &str) -> std::result::Result<String, FallbackReason> {
        let video_id = extract_video_id(url).ok_or(FallbackReason::NoVideoId)?;

        let items = self
            .fetcher
            .fetch(&video_id)
            .await
            .map_err(|e| FallbackReason::FetchFailed(format!("{e:#}")))?;

        let text = truncate_words(&join_items(&items), self.max_tokens);
        if text.is_empty() {
            return Err(FallbackReason::NoText);
        }
        Ok(text)
    }

    /// Download the audio track and send it for transcription.
    ///
    /// The downloaded file and anything else sharing its prefix is gone by
    /// the time this returns, on every path.
    pub async fn from_audio(&self, url: &str, api_key: &str) -> Result<String> {
        let artifact = AudioArtifact::reserve(self.download_dir, AUDIO_EXTENSION)
            .await
            .map_err(|e| Error::AudioDownloadFailed(format!("cannot prepare {}: {e}", self.download_dir.display())))?;

        let request = DownloadRequest {
            audio_only: true,
            output_path: artifact.path().to_path_buf(),
            format: AUDIO_EXTENSION.to_string(),
        };

        if let Err(e) = self.downloader.download(url, &request).await {
            warn!("Audio download failed for {url}: {e:#}");
            return Err(Error::AudioDownloadFailed(format!("{e:#}")));
        }
        let produced = tokio::fs::metadata(artifact.path()).await.is_ok_and(|m| m.is_file());
        if !produced {
            return Err(Error::AudioDownloadFailed(format!("no audio file was produced for {url}")));
        }

        let audio = tokio::fs::read(artifact.path())
            .await
            .map_err(|e| Error::TranscriptionFailed(format!("cannot read {}: {e}", artifact.path().display())))?;

        if let Some(store) = self.store {
            match store.store(&artifact.file_name(), &audio).await {
                Ok(location) => info!("Stored audio for {url} at {location}"),
                Err(e) => warn!("Could not store audio for {url}: {e:#}"),
            }
        }

        debug!("Transcribing {} ({} bytes)", artifact.file_name(), audio.len());

        let request = TranscriptionRequest {
            language: TRANSCRIPTION_LANGUAGE.to_string(),
            format: TRANSCRIPTION_FORMAT.to_string(),
        };
        self.speech
            .transcribe(audio, &artifact.file_name(), &request, api_key)
            .await
            .map_err(|e| {
                warn!("Transcription failed for {url}: {e:#}");
                Error::TranscriptionFailed(format!("{e:#}"))
            })
    }
}
