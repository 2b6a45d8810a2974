use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use recap::options::{Format, Length, Model, OptionsInput, Speed};

#[derive(Parser)]
#[command(
    name = "recap",
    about = "Summarize YouTube videos and documents with an LLM",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Summarize a YouTube video
    Video {
        /// YouTube video URL
        url: String,

        #[command(flatten)]
        summary: SummaryArgs,

        /// Also print the transcript
        #[arg(short, long)]
        transcript: bool,
    },

    /// Summarize a .txt, .pdf or .docx file
    Document {
        path: PathBuf,

        #[command(flatten)]
        summary: SummaryArgs,
    },
}

#[derive(Args)]
pub struct SummaryArgs {
    /// Summary length
    #[arg(short, long, value_enum)]
    pub length: Option<Length>,

    /// Summary layout
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Completion model
    #[arg(short, long, value_enum)]
    pub model: Option<Model>,

    /// Write the summary to be read aloud
    #[arg(long)]
    pub listen: bool,

    /// Pacing for --listen
    #[arg(long, value_enum)]
    pub speed: Option<Speed>,

    /// API key (defaults to OPENAI_API_KEY / config)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl SummaryArgs {
    pub fn options(&self) -> OptionsInput {
        OptionsInput {
            length: self.length,
            format: self.format,
            listen: self.listen.then_some(true),
            model: self.model,
            speed: self.speed,
        }
    }
}
