//! Notify module - user-facing delivery of session events

pub mod log;
pub mod messages;
pub mod telegram;

pub use log::LogNotifier;
pub use messages::SessionEvent;
pub use telegram::TelegramNotifier;
