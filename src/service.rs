use std::sync::Arc;

use log::info;
use serde::Deserialize;

use crate::config::Config;
use crate::credentials::{default_key_for, resolve_api_key};
use crate::document::{self, NativeParser, Upload};
use crate::download::YtDlp;
use crate::error::{Error, Result};
use crate::options::{OptionsInput, resolve};
use crate::providers::{
    ArtifactStore, AudioDownloader, ChatCompletion, DocumentParser, SpeechToText, TranscriptFetcher,
};
use crate::storage::S3Store;
use crate::summarize::{OpenAiChat, Summarizer};
use crate::transcript::TranscriptPipeline;
use crate::whisper::Whisper;
use crate::youtube::InnerTube;
use crate::{SummaryResult, is_valid_url};

/// The external services a request may touch
#[derive(Clone)]
pub struct Providers {
    pub transcripts: Arc<dyn TranscriptFetcher>,
    pub downloader: Arc<dyn AudioDownloader>,
    pub speech: Arc<dyn SpeechToText>,
    pub completion: Arc<dyn ChatCompletion>,
    pub documents: Arc<dyn DocumentParser>,
    /// Only present when object storage is configured
    pub store: Option<Arc<dyn ArtifactStore>>,
}

impl Providers {
    /// Real backends: YouTube captions, yt-dlp, OpenAI, pdf-extract/pandoc, S3
    pub async fn live(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let store = match &config.storage {
            Some(storage) => Some(Arc::new(S3Store::connect(storage).await) as Arc<dyn ArtifactStore>),
            None => None,
        };
        Self {
            transcripts: Arc::new(InnerTube::new(client.clone())),
            downloader: Arc::new(YtDlp::new()),
            speech: Arc::new(Whisper::new(client.clone(), &config.openai_base_url, &config.transcription_model)),
            completion: Arc::new(OpenAiChat::new(client, &config.openai_base_url)),
            documents: Arc::new(NativeParser),
            store,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub video_url: String,
    #[serde(default)]
    pub options: Option<OptionsInput>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentRequest {
    pub upload: Upload,
    pub options: Option<OptionsInput>,
    pub api_key: Option<String>,
}

/// Runs video and document summarization requests
#[derive(Clone)]
pub struct RecapService {
    config: Arc<Config>,
    providers: Providers,
}

impl RecapService {
    pub fn new(config: Arc<Config>, providers: Providers) -> Self {
        Self { config, providers }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn pipeline(&self) -> TranscriptPipeline<'_> {
        TranscriptPipeline {
            fetcher: self.providers.transcripts.as_ref(),
            downloader: self.providers.downloader.as_ref(),
            speech: self.providers.speech.as_ref(),
            store: self.providers.store.as_deref(),
            download_dir: &self.config.download_dir,
            max_tokens: self.config.transcript_max_tokens,
        }
    }

    fn summarizer(&self) -> Summarizer<'_> {
        Summarizer {
            completion: self.providers.completion.as_ref(),
            max_tokens: self.config.summary_max_tokens,
        }
    }

    /// Transcript then summary for a YouTube URL. `origin` is the caller's
    /// `Origin` header, if any.
    pub async fn summarize_video(&self, request: &VideoRequest, origin: Option<&str>) -> Result<SummaryResult> {
        let url = request.video_url.trim();
        if !is_valid_url(url) {
            return Err(Error::InvalidUrl(url.to_string()));
        }
        let options = resolve(request.options.as_ref());

        // Needed by the audio fallback as well as the summary
        let api_key = resolve_api_key(request.api_key.as_deref(), default_key_for(&self.config, origin))?;

        let transcript = self.pipeline().acquire(url, &api_key).await?;
        let text = transcript.text.trim();
        if text.is_empty() {
            return Err(Error::EmptyContent(url.to_string()));
        }
        info!("Got {} transcript for {url} ({} chars)", transcript.source, text.len());

        let summary = self.summarizer().summarize(text, &options, Some(&api_key), None).await?;
        Ok(SummaryResult {
            transcript: Some(text.to_string()),
            summary,
        })
    }

    /// Summary of an uploaded .txt, .pdf or .docx file
    pub async fn summarize_document(&self, request: &DocumentRequest, origin: Option<&str>) -> Result<SummaryResult> {
        let text = document::extract(self.providers.documents.as_ref(), &request.upload).await?;
        info!("Extracted {} chars from {}", text.len(), request.upload.file_name);

        let options = resolve(request.options.as_ref());
        let summary = self
            .summarizer()
            .summarize(
                &text,
                &options,
                request.api_key.as_deref(),
                default_key_for(&self.config, origin),
            )
            .await?;
        Ok(SummaryResult {
            transcript: None,
            summary,
        })
    }
}
