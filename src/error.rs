use thiserror::Error;

/// Everything a summarization request can fail with.
///
/// Provider failures never escape as-is: each stage converts the upstream
/// `eyre::Report` into one of these variants with the upstream message kept
/// in the text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported file type: {0} (expected .txt, .pdf or .docx)")]
    UnsupportedFormat(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Upload refused by the transport layer with its own status, e.g. 413
    #[error("upload rejected: {reason}")]
    UploadRejected { status: u16, reason: String },

    #[error("missing API key: provide one with the request or configure a default")]
    MissingCredential,

    #[error("no usable text could be extracted from {0}")]
    EmptyContent(String),

    #[error("failed to extract text from {file}: {reason}")]
    ExtractionFailed { file: String, reason: String },

    #[error("audio download failed: {0}")]
    AudioDownloadFailed(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("summarization failed: {0}")]
    SummarizationFailed(String),
}

impl Error {
    /// Malformed URL or unusable upload; rejected before any provider call.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::UnsupportedFormat(_) | Error::InvalidUpload(_) | Error::UploadRejected { .. }
        )
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Error::MissingCredential => 401,
            Error::UploadRejected { status, .. } => *status,
            _ => 400,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
