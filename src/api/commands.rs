use crate::api::error::ApiError;
use crate::api::session::ApiSession;
use crate::models::DeleteResponse;
use std::time::Instant;
use tracing::{debug, error, instrument, trace, warn};

pub struct NotificationCommands;

impl NotificationCommands {
    /// Mark a notification as read.
    ///
    /// The response body is ignored; only completion matters. No timeout,
    /// no retry.
    #[instrument(skip(session), fields(id = %id))]
    pub async fn mark_read(session: &ApiSession, id: &str) -> Result<(), ApiError> {
        trace!("API mark_read: sending request");
        let start = Instant::now();

        let response = session
            .post(&format!("/notification/{}/read/", id))
            .send()
            .await
            .map_err(|e| {
                error!(
                    id = %id,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "API mark_read: transport failure"
                );
                ApiError::Network(e)
            })?;

        let status = response.status();
        let duration = start.elapsed();

        if status.is_success() {
            debug!(
                id = %id,
                status = %status,
                duration_ms = duration.as_millis() as u64,
                "API mark_read: completed"
            );
            Ok(())
        } else {
            warn!(
                id = %id,
                status = %status,
                duration_ms = duration.as_millis() as u64,
                "API mark_read: server rejected request"
            );
            Err(ApiError::Status { status })
        }
    }

    /// Delete a notification and return the server's authoritative unread
    /// count. The badge is reconciled to this value, never decremented
    /// locally.
    #[instrument(skip(session), fields(id = %id))]
    pub async fn delete(session: &ApiSession, id: &str) -> Result<u32, ApiError> {
        trace!("API delete: sending request");
        let start = Instant::now();

        let response = session
            .post(&format!("/notification/{}/delete/", id))
            .send()
            .await
            .map_err(|e| {
                error!(
                    id = %id,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "API delete: transport failure"
                );
                ApiError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                id = %id,
                status = %status,
                duration_ms = start.elapsed().as_millis() as u64,
                "API delete: server rejected request"
            );
            return Err(ApiError::Status { status });
        }

        let body: DeleteResponse = response.json().await.map_err(|e| {
            error!(id = %id, error = %e, "API delete: unparseable response body");
            ApiError::Malformed(e.to_string())
        })?;

        debug!(
            id = %id,
            unread_notifications_count = body.unread_notifications_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "API delete: completed"
        );

        Ok(body.unread_notifications_count)
    }
}
