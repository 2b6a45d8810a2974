use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use eyre::{Result, WrapErr};
use log::{debug, info};

mod cli;

use cli::{Cli, SummaryArgs};
use recap::SummaryResult;
use recap::config::Config;
use recap::document::Upload;
use recap::service::{DocumentRequest, Providers, RecapService, VideoRequest};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("recap.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recap")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn tool_line(name: &str, purpose: &str) -> String {
    match tool_version(name) {
        Some(v) => format!("  \x1b[32m✅\x1b[0m {name:<9} {v}"),
        None => format!("  \x1b[31m❌\x1b[0m {name:<9} (not found, needed for {purpose})"),
    }
}

fn build_after_help() -> String {
    let log_path = log_dir().join("recap.log");

    format!(
        "\nREQUIRED TOOLS:\n{}\n{}\n\nConfig: {}\nLogs are written to: {}",
        tool_line("yt-dlp", "the audio fallback"),
        tool_line("pandoc", ".docx documents"),
        recap::config::config_path().display(),
        log_path.display()
    )
}

fn print_result(result: &SummaryResult, args: &SummaryArgs, with_transcript: bool) {
    let rendered = if args.json {
        recap::output::render_json(result)
    } else {
        recap::output::render_text(result, with_transcript)
    };
    println!("{rendered}");
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let config = Config::load()?;
    debug!("Download directory: {}", config.download_dir.display());

    let providers = Providers::live(&config).await;
    let bind = config.bind.clone();
    let service = RecapService::new(Arc::new(config), providers);
    // Local invocations count as the trusted origin
    let local_origin = service.config().allowed_origin.clone();

    match cli.command {
        cli::Command::Serve { bind: bind_override } => {
            let addr = bind_override.unwrap_or(bind);
            recap::server::serve(service, &addr).await?;
        }
        cli::Command::Video {
            url,
            summary,
            transcript,
        } => {
            let request = VideoRequest {
                video_url: url,
                options: Some(summary.options()),
                api_key: summary.api_key.clone(),
            };
            let result = service.summarize_video(&request, local_origin.as_deref()).await?;
            print_result(&result, &summary, transcript);
        }
        cli::Command::Document { path, summary } => {
            let bytes = std::fs::read(&path).wrap_err_with(|| format!("cannot read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let request = DocumentRequest {
                upload: Upload { file_name, bytes },
                options: Some(summary.options()),
                api_key: summary.api_key.clone(),
            };
            let result = service.summarize_document(&request, local_origin.as_deref()).await?;
            print_result(&result, &summary, false);
        }
    }

    Ok(())
}
