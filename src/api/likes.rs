use crate::api::error::ApiError;
use crate::api::session::ApiSession;
use crate::models::{Envelope, LikeData, ResponseStatus};
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

/// What the like endpoint addresses. One component, target as variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Article,
    Comment,
}

impl LikeTarget {
    pub fn noun(&self) -> &'static str {
        match self {
            LikeTarget::Article => "article",
            LikeTarget::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LikeOutcome {
    /// Displayed count is always the server's, never computed locally
    pub likes_count: u32,
}

/// Toggle a like. The endpoint is the clicked element's own link target.
///
/// Unauthenticated viewers are rejected before any request is sent.
#[instrument(skip(session), fields(target = target.noun(), endpoint = %endpoint))]
pub async fn toggle(
    session: &ApiSession,
    target: LikeTarget,
    endpoint: &str,
) -> Result<LikeOutcome, ApiError> {
    if !session.is_authenticated() {
        debug!("Like toggle without session, no request sent");
        return Err(ApiError::NotAuthenticated);
    }

    let start = Instant::now();

    let response = session.post(endpoint).send().await.map_err(|e| {
        error!(error = %e, "Like request transport failure");
        ApiError::Network(e)
    })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        warn!(
            status = %status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Like request failed"
        );
        return Err(ApiError::Status { status });
    }

    let envelope: Envelope = response
        .json()
        .await
        .map_err(|e| ApiError::Malformed(e.to_string()))?;

    if envelope.status != ResponseStatus::Success {
        return Err(ApiError::Malformed(format!(
            "unexpected like envelope status: {:?}",
            envelope.status
        )));
    }

    let data: LikeData = envelope
        .data
        .ok_or_else(|| ApiError::Malformed("like envelope without data".into()))
        .and_then(|v| serde_json::from_value(v).map_err(|e| ApiError::Malformed(e.to_string())))?;

    debug!(
        likes_count = data.likes_count,
        duration_ms = start.elapsed().as_millis() as u64,
        "✓ Like toggled"
    );

    Ok(LikeOutcome {
        likes_count: data.likes_count,
    })
}

/// User-facing alert text for a failed toggle, matching the platform's
/// existing wording.
pub fn failure_message(error: &ApiError, target: LikeTarget) -> String {
    match error {
        ApiError::NotAuthenticated => {
            format!("Please, log in to like this {}!", target.noun())
        }
        ApiError::Network(_) => "Network error. Please check your connection.".to_string(),
        ApiError::Malformed(_) => "Something went wrong. Please try again.".to_string(),
        ApiError::Status { .. } => "Failed to like. Please try again later.".to_string(),
    }
}
