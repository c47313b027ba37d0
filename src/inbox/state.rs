use crate::inbox::counter::UnreadCounter;
use crate::models::Notification;
use std::collections::HashMap;

/// Inbox panel chrome: empty-state ("No notifications") vs. populated-state
/// (title, body and footer shown)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Empty,
    Populated,
}

/// One visible inbox-list entry
#[derive(Debug, Clone)]
pub struct InboxEntry {
    /// List identity, `notification-<id>`
    pub key: String,
    pub notification: Notification,
}

/// Result of accepting a pushed notification
#[derive(Debug, Clone, Copy)]
pub struct PushOutcome {
    /// First entry shown this page view: panel flipped Empty -> Populated
    pub panel_opened: bool,
    /// Whether the displayed counter value changed
    pub counter_changed: bool,
}

/// Result of removing an entry
#[derive(Debug, Clone, Copy)]
pub struct RemoveOutcome {
    pub removed: bool,
    /// Last entry gone: panel reverted to Empty
    pub panel_emptied: bool,
}

/// In-memory source of truth for everything the inbox UI shows: the
/// head-ordered entry list, the set of live toasts, the unread counter and
/// the panel state. The render layer is written from here, never read.
#[derive(Debug)]
pub struct InboxState {
    entries: Vec<InboxEntry>,
    toasts: HashMap<String, Notification>,
    counter: UnreadCounter,
    panel: PanelState,
}

impl InboxState {
    pub fn new() -> Self {
        Self::with_unread(0)
    }

    /// Start from a server-rendered unread count. The list itself always
    /// starts empty: entries rendered into the page at load time are not
    /// this client's to manage.
    pub fn with_unread(unread: u32) -> Self {
        Self {
            entries: Vec::new(),
            toasts: HashMap::new(),
            counter: UnreadCounter::new(unread),
            panel: PanelState::Empty,
        }
    }

    /// Accept one pushed notification: live toast, counter bump, entry at
    /// the head of the list. Duplicate ids are not deduplicated; the server
    /// assigns unique ids.
    pub fn accept_push(&mut self, notification: Notification) -> PushOutcome {
        self.toasts
            .insert(notification.id.clone(), notification.clone());

        let counter_changed = self.counter.bump();

        let panel_opened = self.entries.is_empty() && self.panel == PanelState::Empty;
        if panel_opened {
            self.panel = PanelState::Populated;
        }

        self.entries.insert(
            0,
            InboxEntry {
                key: notification.entry_key(),
                notification,
            },
        );

        PushOutcome {
            panel_opened,
            counter_changed,
        }
    }

    /// Drop a live toast (user dismissal or expiry)
    pub fn dismiss_toast(&mut self, id: &str) -> bool {
        self.toasts.remove(id).is_some()
    }

    pub fn toast(&self, id: &str) -> Option<&Notification> {
        self.toasts.get(id)
    }

    pub fn entry(&self, id: &str) -> Option<&InboxEntry> {
        self.entries.iter().find(|e| e.notification.id == id)
    }

    /// Most recently pushed entry
    pub fn head(&self) -> Option<&InboxEntry> {
        self.entries.first()
    }

    pub fn remove_entry(&mut self, id: &str) -> RemoveOutcome {
        let before = self.entries.len();
        self.entries.retain(|e| e.notification.id != id);
        let removed = self.entries.len() < before;

        let panel_emptied = removed && self.entries.is_empty();
        if panel_emptied {
            self.panel = PanelState::Empty;
        }

        RemoveOutcome {
            removed,
            panel_emptied,
        }
    }

    /// Adopt the server's unread count after a delete
    pub fn reconcile_unread(&mut self, server_count: u32) -> UnreadCounter {
        self.counter.reconcile(server_count);
        self.counter
    }

    pub fn counter(&self) -> UnreadCounter {
        self.counter
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InboxState {
    fn default() -> Self {
        Self::new()
    }
}
