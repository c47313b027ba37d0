pub mod sync;

pub use sync::{InboxSync, UserCommand};
