//! Telegram channel: relays messages through the Bot API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::channels::{ChannelResponse, NotificationChannel};
use crate::error::ChannelError;

/// Telegram Bot API client for one bot.
pub struct TelegramChannel {
    bot_token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, api_base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            bot_token,
            api_base: api_base.into(),
            client,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base.trim_end_matches('/'),
            self.bot_token.expose_secret()
        )
    }

    /// POST a JSON body to a Bot API method and capture status and raw reply.
    async fn call(&self, method: &str, body: &serde_json::Value) -> Result<ChannelResponse, ChannelError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                // reqwest errors embed the URL, which carries the token.
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ChannelError::ResponseUnreadable {
                name: "telegram".into(),
                reason: e.without_url().to_string(),
            })?;

        debug!(method, status, "Telegram call completed");
        Ok(ChannelResponse { status, body })
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<ChannelResponse, ChannelError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        self.call("sendMessage", &body).await
    }

    async fn send_image(
        &self,
        chat_id: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<ChannelResponse, ChannelError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "photo": image_url,
            "caption": caption,
        });
        self.call("sendPhoto", &body).await
    }
}
