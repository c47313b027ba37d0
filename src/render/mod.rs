pub mod log;

pub use log::LogRenderer;

use crate::inbox::{InboxEntry, PanelState, UnreadCounter};
use crate::models::Notification;
use chrono::{DateTime, Local, Utc};

/// Transient popup view of a pushed notification, independent of the inbox
/// list entry made from the same event.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: String,
    pub title: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub link: Option<String>,
}

impl From<&Notification> for Toast {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            title: n.title.clone(),
            body: n.text.clone(),
            timestamp: n.timestamp,
            link: n.link.clone(),
        }
    }
}

/// Timestamps are shown in the viewer's local timezone
pub fn format_local(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%H:%M %d-%m-%Y")
        .to_string()
}

/// The visible surface: toast layer, inbox list, counter badge, panel
/// chrome, navigation and alerts. The sync component writes to it and never
/// reads it back; all state questions go to `InboxState`.
pub trait Renderer: Send {
    fn show_toast(&mut self, toast: &Toast);

    fn dismiss_toast(&mut self, id: &str);

    /// New entries always land at the head of the list
    fn insert_entry(&mut self, entry: &InboxEntry);

    /// Optimistic hide of an entry's interactive content while its delete
    /// request is in flight
    fn hide_entry(&mut self, key: &str);

    fn remove_entry(&mut self, key: &str);

    fn set_counter(&mut self, counter: UnreadCounter);

    fn set_panel(&mut self, panel: PanelState);

    fn navigate(&mut self, link: &str);

    /// Blocking user-facing message (the platform's alert())
    fn alert(&mut self, message: &str);

    /// Toggle the active visual on a like element and replace its count
    fn apply_like(&mut self, endpoint: &str, likes_count: u32);
}
