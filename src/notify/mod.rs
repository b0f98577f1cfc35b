//! Outbound notifications
//!
//! Renders state-machine events into chat messages and delivers them through
//! a [`NotificationSink`].

pub mod message;
pub mod telegram;

use async_trait::async_trait;

pub use message::MessageTemplates;
pub use telegram::{SendError, TelegramConfig, TelegramNotifier};

/// Anything that can deliver a text message.
///
/// Implementations send exactly once per call and never retry.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), SendError>;
}
