use crate::api::likes::{self, LikeTarget};
use crate::api::{ApiError, ApiSession, NotificationCommands};
use crate::inbox::{InboxState, PanelState};
use crate::models::Notification;
use crate::render::{Renderer, Toast};
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

/// User interactions fed into the sync loop
#[derive(Debug)]
pub enum UserCommand {
    /// Click on an inbox-list entry
    Read { id: String },
    /// Click on a live toast
    ToastOpen { id: String },
    /// Click on an entry's delete button
    Delete { id: String },
    /// Click on a like element
    Like { target: LikeTarget, endpoint: String },
}

/// The inbox synchronization client: owns the inbox state, the render
/// surface and the API session. All state mutation runs through this
/// component's loop, one event at a time - the explicit form of the
/// original's single-threaded execution model.
pub struct InboxSync<R: Renderer> {
    state: InboxState,
    renderer: R,
    session: Arc<ApiSession>,
    toast_ttl: Duration,
    expiry_tx: mpsc::UnboundedSender<String>,
}

impl<R: Renderer> InboxSync<R> {
    /// Returns the component plus the receiver its toast-expiry timers
    /// report back on; hand the receiver to `run`.
    pub fn new(
        renderer: R,
        session: Arc<ApiSession>,
        toast_ttl: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        debug!(toast_ttl_secs = toast_ttl.as_secs(), "Creating InboxSync");
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();
        (
            Self {
                state: InboxState::new(),
                renderer,
                session,
                toast_ttl,
                expiry_tx,
            },
            expiry_rx,
        )
    }

    pub fn state(&self) -> &InboxState {
        &self.state
    }

    /// One pushed notification: toast, counter, list entry, panel chrome.
    /// Exactly one toast and one entry per push - the two are independent
    /// views of the same event.
    #[instrument(skip(self, notification), fields(id = %notification.id))]
    pub fn on_push(&mut self, notification: Notification) {
        counter!("inbox_pushes_total").increment(1);

        trace!(
            title = %notification.title,
            link = notification.link.as_deref().unwrap_or("-"),
            "Processing pushed notification"
        );

        let toast = Toast::from(&notification);
        self.renderer.show_toast(&toast);
        self.spawn_toast_timer(notification.id.clone());

        let outcome = self.state.accept_push(notification);

        if outcome.counter_changed {
            self.renderer.set_counter(self.state.counter());
        }
        if outcome.panel_opened {
            self.renderer.set_panel(PanelState::Populated);
        }
        if let Some(entry) = self.state.head() {
            self.renderer.insert_entry(entry);
        }

        gauge!("inbox_unread").set(self.state.counter().value() as f64);

        debug!(
            unread = %self.state.counter(),
            entries = self.state.len(),
            "Notification accepted"
        );
    }

    fn spawn_toast_timer(&self, id: String) {
        let tx = self.expiry_tx.clone();
        let ttl = self.toast_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = tx.send(id);
        });
    }

    /// Entry click: await the mark-as-read request, then navigate. The
    /// request must land before navigation tears the page down; a failed
    /// request aborts the navigation.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn on_entry_click(&mut self, id: &str) -> Result<(), ApiError> {
        let Some(entry) = self.state.entry(id) else {
            warn!("Entry click for unknown notification");
            return Ok(());
        };
        let link = entry.notification.link.clone();

        let start = Instant::now();
        match NotificationCommands::mark_read(&self.session, id).await {
            Ok(()) => {
                counter!("inbox_reads_total", "outcome" => "ok").increment(1);
                debug!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "✓ Marked read"
                );
                if let Some(link) = link {
                    self.renderer.navigate(&link);
                }
                Ok(())
            }
            Err(e) => {
                counter!("inbox_reads_total", "outcome" => "failed").increment(1);
                warn!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Read request failed, navigation aborted"
                );
                Err(e)
            }
        }
    }

    /// Toast click: only meaningful when the notification carries a link.
    /// The read request is fired without awaiting it and navigation happens
    /// immediately.
    #[instrument(skip(self), fields(id = %id))]
    pub fn on_toast_click(&mut self, id: &str) {
        let Some(notification) = self.state.toast(id) else {
            warn!("Toast click for unknown toast");
            return;
        };
        let Some(link) = notification.link.clone() else {
            debug!("Toast has no link, plain display only");
            return;
        };

        let session = self.session.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = NotificationCommands::mark_read(&session, &id).await {
                counter!("inbox_reads_total", "outcome" => "failed").increment(1);
                warn!(id = %id, error = %e, "Toast read request failed");
            } else {
                counter!("inbox_reads_total", "outcome" => "ok").increment(1);
            }
        });

        self.renderer.navigate(&link);
    }

    /// A toast's display window ran out
    pub fn on_toast_expired(&mut self, id: &str) {
        if self.state.dismiss_toast(id) {
            self.renderer.dismiss_toast(id);
        } else {
            trace!(id = %id, "Expiry for already-dismissed toast");
        }
    }

    /// Delete button: optimistic hide, then the request; the counter is
    /// reconciled to the server's count, never decremented locally.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn on_delete(&mut self, id: &str) -> Result<(), ApiError> {
        let Some(entry) = self.state.entry(id) else {
            warn!("Delete for unknown notification");
            return Ok(());
        };
        let key = entry.key.clone();

        self.renderer.hide_entry(&key);

        let start = Instant::now();
        match NotificationCommands::delete(&self.session, id).await {
            Ok(unread_count) => {
                counter!("inbox_deletes_total", "outcome" => "ok").increment(1);

                self.renderer.remove_entry(&key);
                let removed = self.state.remove_entry(id);
                if removed.panel_emptied {
                    self.renderer.set_panel(PanelState::Empty);
                }

                let counter = self.state.reconcile_unread(unread_count);
                self.renderer.set_counter(counter);
                gauge!("inbox_unread").set(counter.value() as f64);

                debug!(
                    unread = %counter,
                    entries = self.state.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "✓ Notification deleted"
                );
                Ok(())
            }
            Err(e) => {
                counter!("inbox_deletes_total", "outcome" => "failed").increment(1);
                // Entry stays hidden; no user-visible surface for this
                warn!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Delete request failed"
                );
                Err(e)
            }
        }
    }

    /// Like toggle on an article or comment. The displayed count is always
    /// the server's; failures surface as the platform's alert strings.
    #[instrument(skip(self), fields(target = target.noun(), endpoint = %endpoint))]
    pub async fn on_like(&mut self, target: LikeTarget, endpoint: &str) {
        match likes::toggle(&self.session, target, endpoint).await {
            Ok(outcome) => {
                counter!("likes_toggled_total").increment(1);
                self.renderer.apply_like(endpoint, outcome.likes_count);
            }
            Err(e) => {
                self.renderer.alert(&likes::failure_message(&e, target));
            }
        }
    }

    async fn handle_command(&mut self, command: UserCommand) {
        match command {
            UserCommand::Read { id } => {
                // failure already logged; policy is no user-visible surface
                let _ = self.on_entry_click(&id).await;
            }
            UserCommand::ToastOpen { id } => self.on_toast_click(&id),
            UserCommand::Delete { id } => {
                let _ = self.on_delete(&id).await;
            }
            UserCommand::Like { target, endpoint } => self.on_like(target, &endpoint).await,
        }
    }

    /// Event loop: pushed notifications, toast expiries and user commands,
    /// strictly serialized. Ends when the command stream closes.
    pub async fn run(
        mut self,
        mut notifications: mpsc::UnboundedReceiver<Notification>,
        mut expiries: mpsc::UnboundedReceiver<String>,
        mut commands: mpsc::Receiver<UserCommand>,
    ) {
        info!("═══════════════════════════════════════════════════════════");
        info!("  INBOX SYNC STARTED");
        info!("  Toast TTL: {}s", self.toast_ttl.as_secs());
        info!("═══════════════════════════════════════════════════════════");

        let mut feed_open = true;

        loop {
            tokio::select! {
                maybe = notifications.recv(), if feed_open => match maybe {
                    Some(notification) => self.on_push(notification),
                    None => {
                        debug!("Notification feed ended");
                        feed_open = false;
                    }
                },
                Some(id) = expiries.recv() => self.on_toast_expired(&id),
                maybe = commands.recv() => match maybe {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        info!("Command stream closed");
                        break;
                    }
                },
            }
        }

        info!("═══════════════════════════════════════════════════════════");
        info!("  INBOX SYNC STOPPED");
        info!("  Entries: {}", self.state.len());
        info!("  Unread: {}", self.state.counter());
        info!("═══════════════════════════════════════════════════════════");
    }
}
