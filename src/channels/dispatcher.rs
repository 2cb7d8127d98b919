//! Delivery with a single RICH → PLAIN fallback.
//!
//! With an artifact, the image-with-caption send is tried first. If the
//! channel does not accept it, the text-only send is attempted exactly once
//! and its result is what the caller sees. A PLAIN failure is final.

use std::sync::Arc;

use tracing::{info, warn};

use crate::channels::{ChannelResponse, NotificationChannel};
use crate::error::ChannelError;
use crate::pipeline::types::FormattedMessage;

/// Status reported when the channel could not be reached at all.
pub const TRANSPORT_FAILURE_STATUS: u16 = 502;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Artifact plus caption.
    Rich,
    /// Text only.
    Plain,
}

/// Result of delivering one message, surfaced verbatim to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub ok: bool,
    pub status: u16,
    /// Raw channel response (or transport error text).
    pub body: String,
    /// Which attempt produced this outcome.
    pub mode: DeliveryMode,
}

impl DispatchOutcome {
    fn from_attempt(mode: DeliveryMode, result: Result<ChannelResponse, ChannelError>) -> Self {
        match result {
            Ok(resp) => Self {
                ok: resp.is_success(),
                status: resp.status,
                body: resp.body,
                mode,
            },
            Err(err) => Self {
                ok: false,
                status: TRANSPORT_FAILURE_STATUS,
                body: err.to_string(),
                mode,
            },
        }
    }
}

/// Sends formatted messages to one fixed destination.
pub struct Dispatcher {
    channel: Arc<dyn NotificationChannel>,
    chat_id: String,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>, chat_id: impl Into<String>) -> Self {
        Self {
            channel,
            chat_id: chat_id.into(),
        }
    }

    pub async fn dispatch(&self, message: &FormattedMessage) -> DispatchOutcome {
        if let Some(url) = message.artifact_url.as_deref() {
            let rich = DispatchOutcome::from_attempt(
                DeliveryMode::Rich,
                self.channel.send_image(&self.chat_id, url, &message.body).await,
            );
            if rich.ok {
                info!(channel = self.channel.name(), mode = "rich", status = rich.status, "Message delivered");
                return rich;
            }
            warn!(
                channel = self.channel.name(),
                status = rich.status,
                "Rich delivery rejected; falling back to plain text"
            );
        }

        let plain = DispatchOutcome::from_attempt(
            DeliveryMode::Plain,
            self.channel.send_text(&self.chat_id, &message.body).await,
        );
        if plain.ok {
            info!(channel = self.channel.name(), mode = "plain", status = plain.status, "Message delivered");
        } else {
            warn!(channel = self.channel.name(), status = plain.status, "Plain delivery failed");
        }
        plain
    }
}
