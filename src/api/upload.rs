use crate::api::session::ApiSession;
use crate::models::{Envelope, ResponseStatus, UploadData};
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

const UPLOAD_ENDPOINT: &str = "/tinymce/upload";

/// A media file queued for upload from the editor
#[derive(Debug, Clone)]
pub struct Media {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Upload failures carry their user-facing message as the Display text.
/// Each server status gets a distinct message; none are retried.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload timed out. Try again.")]
    TimedOut,

    #[error("Network error while uploading the file. Please try again.")]
    Network(#[source] reqwest::Error),

    /// 400 - server-provided message when present
    #[error("{0}")]
    Invalid(String),

    #[error("You have no permission to edit this article.")]
    Forbidden,

    #[error("That article does not exist.")]
    NotFound,

    #[error("The file is too big.")]
    TooLarge,

    #[error("Server error while saving the file. Please try again.")]
    ServerError,

    #[error("Unexpected server response format.")]
    MalformedBody,

    #[error("Upload succeeded but response format was invalid.")]
    MissingLocation,

    #[error("Unexpected server response. Please try again.")]
    Unexpected(u16),
}

/// Upload one media file; returns its served location.
///
/// The only timed request in the client: the platform cuts oversized files
/// at the proxy, so a stuck upload must not hang the editor forever.
#[instrument(skip(session, media), fields(filename = %media.filename, size = media.bytes.len()))]
pub async fn send(
    session: &ApiSession,
    media: &Media,
    article_id: Option<&str>,
    timeout_secs: u64,
) -> Result<String, UploadError> {
    let start = Instant::now();

    let part = Part::bytes(media.bytes.clone())
        .file_name(media.filename.clone())
        .mime_str(&media.mime)
        .map_err(UploadError::Network)?;

    let mut form = Form::new().part("file", part);
    if let Some(id) = article_id {
        form = form.text("articleId", id.to_string());
    }

    let response = session
        .post(UPLOAD_ENDPOINT)
        .multipart(form)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                warn!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Upload timed out"
                );
                UploadError::TimedOut
            } else {
                error!(error = %e, "Upload transport failure");
                UploadError::Network(e)
            }
        })?;

    let status = response.status();
    let body = response.text().await.map_err(UploadError::Network)?;

    let envelope: Envelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            // Oversized uploads are cut off before the view runs, so the
            // 413 body is the proxy's, not JSON
            error!(status = %status, error = %e, "Unparseable upload response");
            if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
                return Err(UploadError::TooLarge);
            }
            return Err(UploadError::MalformedBody);
        }
    };

    if status == reqwest::StatusCode::OK && envelope.status == ResponseStatus::Success {
        let location = envelope
            .data
            .and_then(|v| serde_json::from_value::<UploadData>(v).ok())
            .map(|d| d.location)
            .ok_or(UploadError::MissingLocation)?;

        debug!(
            location = %location,
            duration_ms = start.elapsed().as_millis() as u64,
            "✓ Media uploaded"
        );
        return Ok(location);
    }

    warn!(
        status = %status,
        duration_ms = start.elapsed().as_millis() as u64,
        "Upload rejected"
    );

    Err(match status.as_u16() {
        400 => UploadError::Invalid(
            envelope
                .message
                .unwrap_or_else(|| "Invalid media file.".to_string()),
        ),
        403 => UploadError::Forbidden,
        404 => UploadError::NotFound,
        413 => UploadError::TooLarge,
        500 => UploadError::ServerError,
        code => UploadError::Unexpected(code),
    })
}
