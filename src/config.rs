use std::path::PathBuf;

use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::{Deserialize, Serialize};

/// Service configuration, built once at startup and shared by reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Key used when a request does not bring its own
    pub default_api_key: Option<String>,
    /// Only requests from this origin may fall back to `default_api_key`
    pub allowed_origin: Option<String>,
    /// Context budget for direct transcripts (words kept = tokens / 4)
    pub transcript_max_tokens: usize,
    /// Output bound passed to the completion API
    pub summary_max_tokens: u32,
    pub download_dir: PathBuf,
    pub bind: String,
    pub max_upload_bytes: usize,
    pub openai_base_url: String,
    pub transcription_model: String,
    /// Copy downloaded audio to object storage before it is deleted
    pub storage: Option<StorageConfig>,
}

/// S3-compatible bucket for audio artifacts
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    /// Custom endpoint for S3-compatible services; AWS when unset
    pub endpoint: Option<String>,
    pub region: Option<String>,
    /// Prepended to every object key
    pub prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_api_key: None,
            allowed_origin: None,
            transcript_max_tokens: 15000,
            summary_max_tokens: 1000,
            download_dir: default_download_dir(),
            bind: "127.0.0.1:8080".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            transcription_model: "whisper-1".to_string(),
            storage: None,
        }
    }
}

impl Config {
    /// Load config from ~/.config/recap/config.toml if it exists, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let path = config_path();
        let config = if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?
        } else {
            debug!("No config file found at {}", path.display());
            Config::default()
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Override fields from environment-style variables supplied by `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.default_api_key = Some(key);
        }
        if let Some(origin) = lookup("RECAP_ALLOWED_ORIGIN") {
            self.allowed_origin = Some(origin);
        }
        if let Some(tokens) = lookup("RECAP_TRANSCRIPT_MAX_TOKENS") {
            self.transcript_max_tokens = tokens
                .parse()
                .wrap_err_with(|| format!("RECAP_TRANSCRIPT_MAX_TOKENS is not a number: {tokens}"))?;
        }
        if let Some(tokens) = lookup("RECAP_SUMMARY_MAX_TOKENS") {
            self.summary_max_tokens = tokens
                .parse()
                .wrap_err_with(|| format!("RECAP_SUMMARY_MAX_TOKENS is not a number: {tokens}"))?;
        }
        if let Some(dir) = lookup("RECAP_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup("RECAP_BIND") {
            self.bind = bind;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(bucket) = lookup("RECAP_STORAGE_BUCKET") {
            self.storage.get_or_insert_with(StorageConfig::default).bucket = bucket;
        }
        if let Some(storage) = self.storage.as_mut() {
            if let Some(endpoint) = lookup("RECAP_STORAGE_ENDPOINT") {
                storage.endpoint = Some(endpoint);
            }
            if let Some(region) = lookup("RECAP_STORAGE_REGION") {
                storage.region = Some(region);
            }
            if let Some(prefix) = lookup("RECAP_STORAGE_PREFIX") {
                storage.prefix = prefix;
            }
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        // Fewer than 4 tokens leaves no words at all for a caption transcript
        if self.transcript_max_tokens < 4 {
            bail!(
                "transcript_max_tokens must be at least 4, got {}",
                self.transcript_max_tokens
            );
        }
        if self.storage.as_ref().is_some_and(|s| s.bucket.trim().is_empty()) {
            bail!("storage is configured without a bucket");
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("recap")
        .join("config.toml")
}

fn default_download_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("recap")
        .join("downloads")
}
