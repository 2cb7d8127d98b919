//! Notification channel abstraction and delivery.

pub mod dispatcher;
pub mod telegram;

use async_trait::async_trait;

use crate::error::ChannelError;

pub use dispatcher::{DeliveryMode, DispatchOutcome, Dispatcher};
pub use telegram::TelegramChannel;

/// What the channel answered: HTTP status and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelResponse {
    pub status: u16,
    pub body: String,
}

impl ChannelResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A destination that can receive relayed messages.
///
/// `Err` means the request never got an answer; a rejection by the channel is
/// an `Ok` response with a non-success status.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    /// PLAIN delivery: text only.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<ChannelResponse, ChannelError>;

    /// RICH delivery: an image fetched by the channel from `image_url`, with `caption`.
    async fn send_image(
        &self,
        chat_id: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<ChannelResponse, ChannelError>;
}
