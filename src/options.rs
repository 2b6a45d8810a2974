use serde::{Deserialize, Serialize};

/// How long the summary should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Standard,
    Long,
}

/// Layout of the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Narrative,
    Bullet,
    Outline,
}

/// Completion model used for the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    #[value(name = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    #[value(name = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4.1-mini")]
    #[value(name = "gpt-4.1-mini")]
    Gpt41Mini,
}

impl Model {
    pub fn api_name(&self) -> &'static str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt41Mini => "gpt-4.1-mini",
        }
    }
}

/// Reading pace for summaries meant to be listened to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

/// Caller-supplied preferences; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsInput {
    pub length: Option<Length>,
    pub format: Option<Format>,
    pub listen: Option<bool>,
    pub model: Option<Model>,
    pub speed: Option<Speed>,
}

/// Fully resolved preferences for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOptions {
    pub length: Length,
    pub format: Format,
    pub listen: bool,
    pub model: Model,
    pub speed: Speed,
}

/// Fill every missing field with its default. Never fails.
pub fn resolve(input: Option<&OptionsInput>) -> SummaryOptions {
    let Some(input) = input else {
        return SummaryOptions::default();
    };
    let defaults = SummaryOptions::default();
    SummaryOptions {
        length: input.length.unwrap_or(defaults.length),
        format: input.format.unwrap_or(defaults.format),
        listen: input.listen.unwrap_or(defaults.listen),
        model: input.model.unwrap_or(defaults.model),
        speed: input.speed.unwrap_or(defaults.speed),
    }
}

impl From<SummaryOptions> for OptionsInput {
    fn from(options: SummaryOptions) -> Self {
        Self {
            length: Some(options.length),
            format: Some(options.format),
            listen: Some(options.listen),
            model: Some(options.model),
            speed: Some(options.speed),
        }
    }
}
