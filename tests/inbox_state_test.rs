use chrono::{TimeZone, Utc};
use inbox_client::inbox::{InboxState, PanelState, UnreadCounter, COUNTER_CAP};
use inbox_client::models::Notification;

fn notification(id: &str, link: Option<&str>) -> Notification {
    Notification {
        id: id.to_string(),
        title: "Hi".to_string(),
        text: "Hello".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        link: link.map(str::to_string),
    }
}

#[test]
fn push_payload_parses_with_and_without_link() {
    let n: Notification = serde_json::from_str(
        r#"{"id":"7","title":"Hi","text":"Hello","timestamp":"2024-01-01T10:00:00Z","link":"/x"}"#,
    )
    .expect("payload with link");
    assert_eq!(n.id, "7");
    assert_eq!(n.link.as_deref(), Some("/x"));
    assert_eq!(n.entry_key(), "notification-7");

    let n: Notification = serde_json::from_str(
        r#"{"id":"8","title":"Hi","text":"Hello","timestamp":"2024-01-01T10:00:00Z"}"#,
    )
    .expect("payload without link");
    assert!(!n.has_link());
}

#[test]
fn counter_is_min_of_pushes_and_cap() {
    let mut state = InboxState::new();
    for i in 0..(COUNTER_CAP + 6) {
        state.accept_push(notification(&i.to_string(), None));
    }
    assert_eq!(state.counter().value(), COUNTER_CAP);
    assert_eq!(state.counter().to_string(), "999+");
    assert!(state.counter().badge_visible());
    // every push still produced an entry, only the counter saturates
    assert_eq!(state.len(), (COUNTER_CAP + 6) as usize);
}

#[test]
fn badge_visible_iff_counter_nonzero() {
    let mut state = InboxState::new();
    assert!(!state.counter().badge_visible());
    assert_eq!(state.counter().to_string(), "0");

    state.accept_push(notification("1", None));
    assert!(state.counter().badge_visible());
    assert_eq!(state.counter().to_string(), "1");

    state.reconcile_unread(0);
    assert!(!state.counter().badge_visible());
    assert_eq!(state.counter().to_string(), "0");
}

#[test]
fn every_push_creates_a_toast_and_a_head_entry() {
    let mut state = InboxState::new();
    for id in ["a", "b", "c"] {
        state.accept_push(notification(id, None));
        assert_eq!(state.head().unwrap().notification.id, id);
        assert!(state.toast(id).is_some());
    }
    assert_eq!(state.len(), 3);
    assert_eq!(state.head().unwrap().key, "notification-c");
}

#[test]
fn panel_opens_on_first_entry_and_reverts_when_drained() {
    let mut state = InboxState::new();
    assert_eq!(state.panel(), PanelState::Empty);

    let outcome = state.accept_push(notification("1", None));
    assert!(outcome.panel_opened);
    assert_eq!(state.panel(), PanelState::Populated);

    let outcome = state.accept_push(notification("2", None));
    assert!(!outcome.panel_opened);

    // removing one of several keeps the panel populated
    let removed = state.remove_entry("1");
    assert!(removed.removed);
    assert!(!removed.panel_emptied);
    assert_eq!(state.panel(), PanelState::Populated);

    // removing the last entry reverts to the empty state
    let removed = state.remove_entry("2");
    assert!(removed.panel_emptied);
    assert_eq!(state.panel(), PanelState::Empty);
}

#[test]
fn reconcile_adopts_server_count_regardless_of_local_value() {
    let mut state = InboxState::with_unread(5);
    assert_eq!(state.counter().value(), 5);

    state.reconcile_unread(2);
    assert_eq!(state.counter().value(), 2);

    // server can also push the badge past the local cap
    state.reconcile_unread(1500);
    assert_eq!(state.counter().to_string(), "999+");
}

#[test]
fn counter_does_not_bump_past_cap() {
    let mut counter = UnreadCounter::new(COUNTER_CAP);
    assert!(!counter.bump());
    assert_eq!(counter.value(), COUNTER_CAP);

    let mut counter = UnreadCounter::new(COUNTER_CAP - 1);
    assert!(counter.bump());
    assert!(!counter.bump());
}

#[test]
fn duplicate_ids_are_not_deduplicated() {
    let mut state = InboxState::new();
    state.accept_push(notification("7", None));
    state.accept_push(notification("7", None));
    assert_eq!(state.len(), 2);
    assert_eq!(state.counter().value(), 2);
}

#[test]
fn removing_unknown_id_changes_nothing() {
    let mut state = InboxState::new();
    state.accept_push(notification("1", None));

    let removed = state.remove_entry("nope");
    assert!(!removed.removed);
    assert!(!removed.panel_emptied);
    assert_eq!(state.len(), 1);
    assert_eq!(state.panel(), PanelState::Populated);
}

#[test]
fn toast_dismissal_is_idempotent() {
    let mut state = InboxState::new();
    state.accept_push(notification("1", None));

    assert!(state.dismiss_toast("1"));
    assert!(!state.dismiss_toast("1"));
    // the list entry is untouched by toast dismissal
    assert_eq!(state.len(), 1);
}
