use std::io::Write;
use std::process::Stdio;

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use tokio::process::Command;

use crate::error::Error;
use crate::providers::DocumentParser;

/// Upload types we know how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Classify by the declared file extension (case-insensitive)
    pub fn from_file_name(name: &str) -> crate::Result<Self> {
        let ext = std::path::Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(DocumentKind::Text),
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "" => Err(Error::UnsupportedFormat(format!("{name} has no extension"))),
            other => Err(Error::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// An uploaded file
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Pull plain text out of an upload, dispatching on its extension.
///
/// The returned text is trimmed and never empty.
pub async fn extract(parser: &dyn DocumentParser, upload: &Upload) -> crate::Result<String> {
    let kind = DocumentKind::from_file_name(&upload.file_name)?;
    debug!("Extracting {:?} text from {}", kind, upload.file_name);

    let parsed = match kind {
        DocumentKind::Text => Ok(String::from_utf8_lossy(&upload.bytes).into_owned()),
        DocumentKind::Pdf => parser.pdf_text(&upload.bytes).await,
        DocumentKind::Docx => parser.docx_text(&upload.bytes).await,
    };

    let text = parsed.map_err(|e| Error::ExtractionFailed {
        file: upload.file_name.clone(),
        reason: format!("{e:#}"),
    })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyContent(upload.file_name.clone()));
    }
    Ok(text.to_string())
}

/// `pdf-extract` for PDFs, `pandoc` for Word documents
#[derive(Debug, Default)]
pub struct NativeParser;

#[async_trait]
impl DocumentParser for NativeParser {
    async fn pdf_text(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string()))
            .await?
            .map_err(|e| eyre::eyre!("failed to extract PDF text: {e}"))
    }

    async fn docx_text(&self, bytes: &[u8]) -> Result<String> {
        // pandoc needs a seekable input for zip containers
        let bytes = bytes.to_vec();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<tempfile::NamedTempFile> {
            let mut file = tempfile::Builder::new().prefix("recap-").suffix(".docx").tempfile()?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file)
        })
        .await??;

        let output = Command::new("pandoc")
            .args(["--from", "docx", "--to", "plain", "--wrap", "none"])
            .arg(file.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(o) if o.status.success() => Ok(String::from_utf8_lossy(&o.stdout).into_owned()),
            Ok(o) => bail!("pandoc exited with status {}: {}", o.status, String::from_utf8_lossy(&o.stderr).trim()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!("pandoc not found. Install it to read .docx uploads")
            }
            Err(e) => bail!("failed to run pandoc: {e}"),
        }
    }
}
