//! In-memory stand-ins for the external services.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use eyre::{Result, bail};

use crate::config::Config;
use crate::providers::{
    ArtifactStore, AudioDownloader, ChatCompletion, ChatMessage, DocumentParser, DownloadRequest, SpeechToText, TranscriptFetcher,
    TranscriptItem, TranscriptionRequest,
};
use crate::service::{Providers, RecapService};

/// File names in `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

pub struct FakeFetcher {
    outcome: std::result::Result<Vec<String>, String>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn returning(lines: &[&str]) -> Self {
        Self {
            outcome: Ok(lines.iter().map(|l| l.to_string()).collect()),
            requested: Mutex::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            requested: Mutex::default(),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptFetcher for FakeFetcher {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptItem>> {
        self.requested.lock().unwrap().push(video_id.to_string());
        match &self.outcome {
            Ok(lines) => Ok(lines.iter().map(|text| TranscriptItem { text: text.clone() }).collect()),
            Err(message) => bail!("{message}"),
        }
    }
}

enum DownloadBehaviour {
    Write,
    Silent,
    FailAfterWrite(String),
}

pub struct FakeDownloader {
    behaviour: DownloadBehaviour,
    requests: Mutex<Vec<(String, DownloadRequest)>>,
}

impl FakeDownloader {
    /// Writes the audio file plus a leftover partial file next to it
    pub fn writing() -> Self {
        Self::with(DownloadBehaviour::Write)
    }

    /// Reports success without writing anything
    pub fn silent() -> Self {
        Self::with(DownloadBehaviour::Silent)
    }

    /// Leaves a partial file behind, then errors
    pub fn failing_after_write(message: &str) -> Self {
        Self::with(DownloadBehaviour::FailAfterWrite(message.to_string()))
    }

    fn with(behaviour: DownloadBehaviour) -> Self {
        Self {
            behaviour,
            requests: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn last_request(&self) -> Option<DownloadRequest> {
        self.requests.lock().unwrap().last().map(|(_, r)| r.clone())
    }
}

#[async_trait]
impl AudioDownloader for FakeDownloader {
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<()> {
        self.requests.lock().unwrap().push((url.to_string(), request.clone()));
        let partial = request.output_path.with_extension("webm.part");
        match &self.behaviour {
            DownloadBehaviour::Write => {
                std::fs::write(&partial, b"partial")?;
                std::fs::write(&request.output_path, b"ID3 fake audio")?;
                Ok(())
            }
            DownloadBehaviour::Silent => Ok(()),
            DownloadBehaviour::FailAfterWrite(message) => {
                std::fs::write(&partial, b"partial")?;
                bail!("{message}")
            }
        }
    }
}

pub struct FakeSpeech {
    outcome: std::result::Result<String, String>,
    seen: Mutex<Vec<(String, String)>>,
}

impl FakeSpeech {
    pub fn returning(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            seen: Mutex::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            seen: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(_, key)| key.clone()).collect()
    }
}

#[async_trait]
impl SpeechToText for FakeSpeech {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        request: &TranscriptionRequest,
        api_key: &str,
    ) -> Result<String> {
        assert!(!audio.is_empty(), "transcribe called without audio");
        assert_eq!(request.language, "en");
        assert_eq!(request.format, "json");
        self.seen.lock().unwrap().push((file_name.to_string(), api_key.to_string()));
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub api_key: String,
}

pub struct FakeChat {
    outcome: std::result::Result<Option<String>, String>,
    calls: Mutex<Vec<ChatCall>>,
}

impl FakeChat {
    pub fn returning(summary: &str) -> Self {
        Self::with(Ok(Some(summary.to_string())))
    }

    pub fn empty() -> Self {
        Self::with(Ok(None))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Err(message.to_string()))
    }

    fn with(outcome: std::result::Result<Option<String>, String>) -> Self {
        Self {
            outcome,
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for FakeChat {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        api_key: &str,
    ) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(ChatCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens,
            api_key: api_key.to_string(),
        });
        match &self.outcome {
            Ok(content) => Ok(content.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

#[derive(Default)]
pub struct FakeParser {
    outcome: Option<std::result::Result<String, String>>,
    calls: AtomicUsize,
}

impl FakeParser {
    pub fn returning(text: &str) -> Self {
        Self {
            outcome: Some(Ok(text.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Some(Err(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => bail!("{message}"),
            None => bail!("no parser output configured"),
        }
    }
}

#[async_trait]
impl DocumentParser for FakeParser {
    async fn pdf_text(&self, _bytes: &[u8]) -> Result<String> {
        self.respond()
    }

    async fn docx_text(&self, _bytes: &[u8]) -> Result<String> {
        self.respond()
    }
}

/// Records each stored file name and whether it was still on disk at the time
pub struct FakeStore {
    dir: PathBuf,
    failure: Option<String>,
    stored: Mutex<Vec<(String, bool)>>,
}

impl FakeStore {
    pub fn watching(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            failure: None,
            stored: Mutex::default(),
        }
    }

    pub fn failing(dir: &Path, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::watching(dir)
        }
    }

    pub fn stored(&self) -> Vec<(String, bool)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn store(&self, file_name: &str, audio: &[u8]) -> Result<String> {
        assert!(!audio.is_empty(), "store called without audio");
        let on_disk = self.dir.join(file_name).is_file();
        self.stored.lock().unwrap().push((file_name.to_string(), on_disk));
        match &self.failure {
            Some(message) => bail!("{message}"),
            None => Ok(format!("memory://{file_name}")),
        }
    }
}

/// A full set of fakes, kept around so tests can inspect them after the call
pub struct Fakes {
    pub fetcher: Arc<FakeFetcher>,
    pub downloader: Arc<FakeDownloader>,
    pub speech: Arc<FakeSpeech>,
    pub chat: Arc<FakeChat>,
    pub parser: Arc<FakeParser>,
    pub store: Option<Arc<FakeStore>>,
}

impl Fakes {
    pub fn new(fetcher: FakeFetcher, chat: FakeChat) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            downloader: Arc::new(FakeDownloader::writing()),
            speech: Arc::new(FakeSpeech::returning("audio transcript")),
            chat: Arc::new(chat),
            parser: Arc::new(FakeParser::returning("document body")),
            store: None,
        }
    }

    pub fn service(&self, config: Config) -> RecapService {
        let providers = Providers {
            transcripts: self.fetcher.clone(),
            downloader: self.downloader.clone(),
            speech: self.speech.clone(),
            completion: self.chat.clone(),
            documents: self.parser.clone(),
            store: self.store.clone().map(|s| s as Arc<dyn ArtifactStore>),
        };
        RecapService::new(Arc::new(config), providers)
    }
}
