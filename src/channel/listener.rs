use crate::config::ReconnectPolicy;
use crate::models::Notification;
use futures::StreamExt;
use metrics::counter;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// Push Channel Adapter: one duplex connection to the server's notification
/// endpoint, forwarding each parsed payload to the sync loop in delivery
/// order.
pub struct PushChannel {
    url: String,
    policy: ReconnectPolicy,
    log_payloads: bool,
}

impl PushChannel {
    pub fn new(url: String, policy: ReconnectPolicy, log_payloads: bool) -> Self {
        debug!(url = %url, policy = ?policy, "Creating PushChannel");
        Self {
            url,
            policy,
            log_payloads,
        }
    }

    /// Connect and pump notifications into `tx` until the connection ends.
    ///
    /// With `ReconnectPolicy::PageLifetime` one connection is all there is:
    /// after close the channel stays silent until the process restarts.
    /// `Retry` reconnects after its fixed delay.
    pub async fn run(&self, tx: mpsc::UnboundedSender<Notification>) -> Result<(), WsError> {
        let mut session_count: u64 = 0;

        loop {
            session_count += 1;
            if session_count > 1 {
                debug!(attempt = session_count, "Reconnecting push channel...");
            }

            let result = self.connection_loop(&tx, session_count).await;

            match self.policy {
                ReconnectPolicy::PageLifetime => {
                    if let Err(e) = &result {
                        error!(error = %e, "Push channel failed, not reconnecting");
                    } else {
                        info!("Push channel closed, not reconnecting");
                    }
                    return result;
                }
                ReconnectPolicy::Retry { delay_secs } => {
                    match &result {
                        Ok(_) => warn!(
                            session = session_count,
                            delay_secs, "Push channel closed, reconnecting..."
                        ),
                        Err(e) => error!(
                            error = %e,
                            session = session_count,
                            delay_secs,
                            "Push channel error, reconnecting..."
                        ),
                    }
                    tokio::time::sleep(tokio::time::Duration::from_secs(delay_secs)).await;
                }
            }
        }
    }

    async fn connection_loop(
        &self,
        tx: &mpsc::UnboundedSender<Notification>,
        session_id: u64,
    ) -> Result<(), WsError> {
        let connection_id = Uuid::new_v4();

        trace!(
            connection_id = %connection_id,
            url = %self.url,
            "Opening push channel connection..."
        );
        let connect_start = Instant::now();

        let (mut ws_stream, _) = connect_async(self.url.as_str()).await?;

        info!(
            connection_id = %connection_id,
            session_id = session_id,
            duration_ms = connect_start.elapsed().as_millis() as u64,
            "✓ Push channel open"
        );

        let mut message_count: u64 = 0;

        while let Some(result) = ws_stream.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    message_count += 1;
                    counter!("channel_messages_total").increment(1);

                    if self.log_payloads {
                        trace!(
                            connection_id = %connection_id,
                            message_number = message_count,
                            payload = %text,
                            "Channel frame received"
                        );
                    }

                    // One bad frame must not take the channel down
                    match serde_json::from_str::<Notification>(&text) {
                        Ok(notification) => {
                            debug!(
                                connection_id = %connection_id,
                                message_number = message_count,
                                id = %notification.id,
                                "New notification received"
                            );
                            if tx.send(notification).is_err() {
                                debug!(
                                    connection_id = %connection_id,
                                    "Sync loop gone, closing push channel"
                                );
                                return Ok(());
                            }
                        }
                        Err(e) => {
                            counter!("channel_parse_failures_total").increment(1);
                            warn!(
                                connection_id = %connection_id,
                                message_number = message_count,
                                error = %e,
                                raw_len = text.len(),
                                "Malformed channel payload, skipping frame"
                            );
                        }
                    }
                }
                Ok(Message::Ping(data)) => {
                    trace!(
                        connection_id = %connection_id,
                        data_len = data.len(),
                        "Received ping (auto-pong by tungstenite)"
                    );
                }
                Ok(Message::Pong(data)) => {
                    trace!(
                        connection_id = %connection_id,
                        data_len = data.len(),
                        "Received pong from server"
                    );
                }
                Ok(Message::Binary(data)) => {
                    debug!(
                        connection_id = %connection_id,
                        data_len = data.len(),
                        "Received binary frame (ignoring)"
                    );
                }
                Ok(Message::Close(frame)) => {
                    let reason = frame
                        .as_ref()
                        .map(|f| f.reason.to_string())
                        .unwrap_or_default();
                    let code = frame.as_ref().map(|f| u16::from(f.code)).unwrap_or(0u16);
                    info!(
                        connection_id = %connection_id,
                        close_code = code,
                        close_reason = %reason,
                        messages_received = message_count,
                        "Push channel connection closed by server"
                    );
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        connection_id = %connection_id,
                        error = %e,
                        messages_received = message_count,
                        "Push channel error"
                    );
                    return Err(e);
                }
            }
        }

        info!(
            connection_id = %connection_id,
            messages_received = message_count,
            "Push channel stream ended"
        );
        Ok(())
    }
}
