use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use reqwest::multipart;

use crate::providers::{SpeechToText, TranscriptionRequest};

/// OpenAI audio transcription endpoint
pub struct Whisper {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Whisper {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

pub(crate) fn mime_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("m4a") => "audio/mp4",
        Some("wav") => "audio/wav",
        Some("webm") => "audio/webm",
        Some("ogg") | Some("opus") => "audio/ogg",
        _ => "audio/mpeg",
    }
}

#[async_trait]
impl SpeechToText for Whisper {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        request: &TranscriptionRequest,
        api_key: &str,
    ) -> Result<String> {
        debug!("Uploading {file_name} ({} bytes) to {}", audio.len(), self.model);

        let file_part = multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", request.language.clone())
            .text("response_format", request.format.clone());

        let resp = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Whisper API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        parse_whisper_response(&json)
    }
}

fn parse_whisper_response(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json.get("text").and_then(|t| t.as_str()) {
        return Ok(text.trim().to_string());
    }

    // verbose_json also carries segments; stitch them if "text" is absent
    if let Some(segments) = json.get("segments").and_then(|s| s.as_array()) {
        return Ok(segments
            .iter()
            .filter_map(|seg| seg.get("text")?.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "));
    }

    bail!("unexpected Whisper API response format");
}
