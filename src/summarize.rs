use async_trait::async_trait;
use eyre::{Result, bail};
use log::{debug, warn};

use crate::credentials::resolve_api_key;
use crate::error::Error;
use crate::options::{Format, Length, Speed, SummaryOptions};
use crate::providers::{ChatCompletion, ChatMessage};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts key details from long texts.";

/// Returned when the completion comes back without any content
pub const NO_SUMMARY: &str = "No summary could be generated.";

fn length_instruction(length: Length) -> &'static str {
    match length {
        Length::Short => "Keep it short: a few sentences covering only the essentials.",
        Length::Standard => "Aim for a moderate length that covers the main points and key supporting details.",
        Length::Long => "Be thorough: cover every significant point, argument and example in detail.",
    }
}

fn format_instruction(format: Format) -> &'static str {
    match format {
        Format::Narrative => "Write it as flowing prose paragraphs.",
        Format::Bullet => "Write it as a bulleted list of key points.",
        Format::Outline => "Write it as a hierarchical outline with headings and nested points.",
    }
}

/// Build the user prompt for `text` under `options`
pub fn build_prompt(text: &str, options: &SummaryOptions) -> String {
    let mut instructions = vec![length_instruction(options.length), format_instruction(options.format)];
    if options.listen {
        instructions.push("It will be read aloud, so use plain spoken language with no markdown, symbols or tables.");
        match options.speed {
            Speed::Slow => instructions.push("Prefer short, simple sentences that are easy to follow."),
            Speed::Fast => instructions.push("Keep sentences tight; the listener is skimming."),
            Speed::Normal => {}
        }
    }

    format!(
        "Summarize the following text. {}\n\nText:\n{text}",
        instructions.join(" ")
    )
}

/// Summarizes text through a chat-completion backend
pub struct Summarizer<'a> {
    pub completion: &'a dyn ChatCompletion,
    pub max_tokens: u32,
}

impl Summarizer<'_> {
    pub async fn summarize(
        &self,
        text: &str,
        options: &SummaryOptions,
        user_key: Option<&str>,
        default_key: Option<&str>,
    ) -> crate::Result<String> {
        let api_key = resolve_api_key(user_key, default_key)?;
        let prompt = build_prompt(text, options);
        let model = options.model.api_name();
        debug!("Summarizing with {model}, prompt length {}", prompt.len());

        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let content = self
            .completion
            .complete(model, &messages, self.max_tokens, &api_key)
            .await
            .map_err(|e| {
                warn!("Completion request failed: {e:#}");
                Error::SummarizationFailed(format!("{e:#}"))
            })?;

        Ok(content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string()))
    }
}

/// OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiChat {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        api_key: &str,
    ) -> Result<Option<String>> {
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("OpenAI API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        Ok(extract_openai_text(&json))
    }
}

fn extract_openai_text(json: &serde_json::Value) -> Option<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Model, resolve};
    use crate::testing::FakeChat;

    #[test]
    fn test_prompt_embeds_length_and_format() {
        let options = SummaryOptions {
            length: Length::Short,
            format: Format::Bullet,
            ..Default::default()
        };
        let prompt = build_prompt("the body", &options);
        assert!(prompt.contains("a few sentences"));
        assert!(prompt.contains("bulleted list"));
        assert!(prompt.ends_with("Text:\nthe body"));
        assert!(!prompt.contains("read aloud"));
    }

    #[test]
    fn test_prompt_for_listening() {
        let options = SummaryOptions {
            listen: true,
            speed: Speed::Fast,
            ..Default::default()
        };
        let prompt = build_prompt("x", &options);
        assert!(prompt.contains("read aloud"));
        assert!(prompt.contains("skimming"));
    }

    #[tokio::test]
    async fn test_summarize_sends_system_and_user_messages() {
        let chat = FakeChat::returning("  The gist.  ");
        let summarizer = Summarizer {
            completion: &chat,
            max_tokens: 1000,
        };
        let options = SummaryOptions {
            model: Model::Gpt4o,
            ..resolve(None)
        };

        let summary = summarizer.summarize("long text", &options, Some("k1"), Some("k2")).await.unwrap();
        assert_eq!(summary, "The gist.");

        let calls = chat.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gpt-4o");
        assert_eq!(calls[0].max_tokens, 1000);
        assert_eq!(calls[0].api_key, "k1");
        assert_eq!(calls[0].messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(calls[0].messages[1].role, "user");
        assert!(calls[0].messages[1].content.contains("long text"));
    }

    #[tokio::test]
    async fn test_summarize_uses_placeholder_for_empty_content() {
        let chat = FakeChat::empty();
        let summarizer = Summarizer {
            completion: &chat,
            max_tokens: 1000,
        };
        let summary = summarizer.summarize("text", &resolve(None), None, Some("k2")).await.unwrap();
        assert_eq!(summary, NO_SUMMARY);
        assert_eq!(chat.calls()[0].api_key, "k2");
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_backend() {
        let chat = FakeChat::returning("unused");
        let summarizer = Summarizer {
            completion: &chat,
            max_tokens: 1000,
        };
        let err = summarizer.summarize("text", &resolve(None), None, None).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
        assert!(chat.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_wrapped() {
        let chat = FakeChat::failing("OpenAI API returned 429 Too Many Requests");
        let summarizer = Summarizer {
            completion: &chat,
            max_tokens: 1000,
        };
        let err = summarizer.summarize("text", &resolve(None), Some("k"), None).await.unwrap_err();
        assert!(matches!(err, Error::SummarizationFailed(ref m) if m.contains("429")));
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Summary of the video." } }
            ]
        });
        assert_eq!(extract_openai_text(&json).as_deref(), Some("Summary of the video."));
    }

    #[test]
    fn test_extract_openai_text_empty() {
        assert_eq!(extract_openai_text(&serde_json::json!({"choices": []})), None);
        assert_eq!(
            extract_openai_text(&serde_json::json!({"choices": [{"message": {"content": null}}]})),
            None
        );
    }
}
