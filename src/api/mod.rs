pub mod articles;
pub mod commands;
pub mod error;
pub mod likes;
pub mod session;
pub mod upload;

pub use commands::NotificationCommands;
pub use error::ApiError;
pub use session::ApiSession;
