use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use tokio::process::Command;

use crate::providers::{AudioDownloader, DownloadRequest};

/// Audio downloader that shells out to `yt-dlp`
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_program("yt-dlp")
    }

    /// Run a different executable with the same arguments
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

/// yt-dlp picks the extension itself, so hand it `<stem>.%(ext)s`
fn output_template(output_path: &Path) -> String {
    output_path.with_extension("%(ext)s").to_string_lossy().to_string()
}

fn build_args(url: &str, request: &DownloadRequest) -> Vec<String> {
    let mut args = Vec::new();
    if request.audio_only {
        args.extend(["--extract-audio".to_string(), "--audio-format".to_string(), request.format.clone()]);
    }
    args.extend([
        "--prefer-free-formats".to_string(),
        // Public videos only; a broken CA bundle shouldn't stop the fallback
        "--no-check-certificates".to_string(),
        "--no-playlist".to_string(),
        "-o".to_string(),
        output_template(&request.output_path),
        url.to_string(),
    ]);
    args
}

#[async_trait]
impl AudioDownloader for YtDlp {
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<()> {
        debug!("Downloading audio via yt-dlp: {url}");

        let output = Command::new(&self.program)
            .args(build_args(url, request))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A dropped request must not leave yt-dlp writing into the download dir
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(o) if o.status.success() => Ok(()),
            Ok(o) => {
                let stderr = String::from_utf8_lossy(&o.stderr);
                bail!("yt-dlp exited with status {}: {}", o.status, stderr.trim())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!(
                    "yt-dlp not found. Install it to enable the audio fallback:\n  \
                     pip install yt-dlp\n  \
                     or: brew install yt-dlp"
                )
            }
            Err(e) => bail!("failed to run yt-dlp: {e}"),
        }
    }
}
