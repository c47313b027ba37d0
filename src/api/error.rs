use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for platform requests: transport, non-success status,
/// unexpected body, gated action without a session.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request failed with HTTP {status}")]
    Status { status: StatusCode },

    #[error("unexpected response body: {0}")]
    Malformed(String),

    #[error("viewer is not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status } => Some(*status),
            _ => None,
        }
    }
}
