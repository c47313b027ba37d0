use crate::inbox::{InboxEntry, PanelState, UnreadCounter};
use crate::render::{format_local, Renderer, Toast};
use tracing::{info, warn};

/// Render surface for the headless binary: every UI mutation becomes a
/// structured log line.
#[derive(Debug, Clone, Default)]
pub struct LogRenderer;

impl LogRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for LogRenderer {
    fn show_toast(&mut self, toast: &Toast) {
        info!(
            id = %toast.id,
            title = %toast.title,
            time = %format_local(&toast.timestamp),
            link = toast.link.as_deref().unwrap_or("-"),
            "🔔 {}",
            toast.body
        );
    }

    fn dismiss_toast(&mut self, id: &str) {
        info!(id = %id, "Toast dismissed");
    }

    fn insert_entry(&mut self, entry: &InboxEntry) {
        info!(
            key = %entry.key,
            title = %entry.notification.title,
            time = %format_local(&entry.notification.timestamp),
            "Inbox entry added at head"
        );
    }

    fn hide_entry(&mut self, key: &str) {
        info!(key = %key, "Inbox entry hidden (delete pending)");
    }

    fn remove_entry(&mut self, key: &str) {
        info!(key = %key, "Inbox entry removed");
    }

    fn set_counter(&mut self, counter: UnreadCounter) {
        info!(
            count = %counter,
            badge = if counter.badge_visible() { "shown" } else { "hidden" },
            "Unread badge updated"
        );
    }

    fn set_panel(&mut self, panel: PanelState) {
        match panel {
            PanelState::Empty => info!("Inbox panel: No notifications"),
            PanelState::Populated => info!("Inbox panel: Notifications"),
        }
    }

    fn navigate(&mut self, link: &str) {
        info!(link = %link, "→ Navigating");
    }

    fn alert(&mut self, message: &str) {
        warn!("⚠ {}", message);
    }

    fn apply_like(&mut self, endpoint: &str, likes_count: u32) {
        info!(endpoint = %endpoint, likes_count = likes_count, "Like toggled");
    }
}
