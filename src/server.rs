use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde_json::json;

use crate::document::Upload;
use crate::error::Error;
use crate::options::OptionsInput;
use crate::service::{DocumentRequest, RecapService, VideoRequest};
use crate::SummaryResult;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::BAD_REQUEST);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<MultipartError> for Error {
    fn from(e: MultipartError) -> Self {
        let status = e.status();
        if status == StatusCode::BAD_REQUEST {
            return Error::InvalidUpload(e.body_text());
        }
        Error::UploadRejected {
            status: status.as_u16(),
            reason: e.body_text(),
        }
    }
}

pub fn router(service: RecapService) -> Router {
    let limit = service.config().max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/api/summarize/video", post(summarize_video))
        .route("/api/summarize/document", post(summarize_document))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(service)
}

/// Bind to `addr` and serve until the process is stopped
pub async fn serve(service: RecapService, addr: &str) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

fn origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ORIGIN).and_then(|v| v.to_str().ok())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn summarize_video(
    State(service): State<RecapService>,
    headers: HeaderMap,
    Json(request): Json<VideoRequest>,
) -> Result<Json<SummaryResult>, Error> {
    let result = service.summarize_video(&request, origin(&headers)).await;
    if let Err(e) = &result {
        warn!("Video request for {} failed: {e}", request.video_url);
    }
    Ok(Json(result?))
}

async fn summarize_document(
    State(service): State<RecapService>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SummaryResult>, Error> {
    let request = read_document(multipart).await?;
    let result = service.summarize_document(&request, origin(&headers)).await;
    if let Err(e) = &result {
        warn!("Document request for {} failed: {e}", request.upload.file_name);
    }
    Ok(Json(result?))
}

/// Collect the `file`, `options` and `apiKey` parts of a document upload
async fn read_document(mut multipart: Multipart) -> Result<DocumentRequest, Error> {
    let mut upload = None;
    let mut options = None;
    let mut api_key = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                upload = Some(Upload { file_name, bytes });
            }
            "options" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    let parsed: OptionsInput = serde_json::from_str(&text)
                        .map_err(|e| Error::InvalidUpload(format!("options is not valid JSON: {e}")))?;
                    options = Some(parsed);
                }
            }
            "apiKey" => api_key = Some(field.text().await?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| Error::InvalidUpload("missing `file` field".to_string()))?;
    Ok(DocumentRequest {
        upload,
        options,
        api_key,
    })
}
