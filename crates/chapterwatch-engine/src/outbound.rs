use async_trait::async_trait;
use chapterwatch_core::types::ChatId;

use crate::error::DeliveryError;

/// Sends one text message to one chat.
///
/// Implemented by the Telegram adapter; tests substitute a recorder.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError>;
}
