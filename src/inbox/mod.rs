pub mod counter;
pub mod state;

pub use counter::{UnreadCounter, COUNTER_CAP};
pub use state::{InboxEntry, InboxState, PanelState, PushOutcome, RemoveOutcome};
