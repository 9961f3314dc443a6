//! Outbound sends for the Telegram adapter.

use async_trait::async_trait;
use chapterwatch_core::types::ChatId;
use chapterwatch_engine::{DeliveryError, Outbound};
use teloxide::prelude::Requester;
use teloxide::Bot;
use tracing::debug;

/// [`Outbound`] implementation backed by `sendMessage`.
///
/// Messages are plain text; each call is exactly one request, no retries.
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(teloxide::types::ChatId(chat_id.get()), text)
            .await
            .map_err(|e| DeliveryError::new(chat_id, e.to_string()))?;
        debug!(chat_id = %chat_id, "Telegram: message sent");
        Ok(())
    }
}
