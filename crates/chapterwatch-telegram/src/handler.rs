//! Telegram message handler registered in the teloxide Dispatcher.

use chapterwatch_core::types::{ChatEvent, ChatId};
use teloxide::requests::ResponseResult;
use teloxide::types::Message;
use tokio::sync::mpsc;
use tracing::warn;

/// Strip a Telegram message down to a [`ChatEvent`].
///
/// Channel posts have no `from`, which leaves `user_id` empty.
pub fn to_chat_event(msg: &Message) -> ChatEvent {
    ChatEvent {
        chat_id: ChatId(msg.chat.id.0),
        user_id: msg.from.as_ref().map(|u| u.id.0),
        text: msg.text().unwrap_or_default().to_string(),
    }
}

/// Forward every message to the command dispatcher queue.
///
/// Filtering and command parsing happen in the dispatcher so all events go
/// through one ordered consumer.
pub async fn forward_message(msg: Message, events: mpsc::Sender<ChatEvent>) -> ResponseResult<()> {
    if events.send(to_chat_event(&msg)).await.is_err() {
        warn!(chat_id = msg.chat.id.0, "Telegram: command dispatcher gone, message dropped");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn private_text_message() {
        let msg = message(serde_json::json!({
            "message_id": 10,
            "date": 1567927221,
            "chat": {
                "id": 250918540,
                "first_name": "Ann",
                "username": "ann",
                "type": "private"
            },
            "from": {
                "id": 250918540,
                "is_bot": false,
                "first_name": "Ann",
                "username": "ann",
                "language_code": "en"
            },
            "text": "/start"
        }));

        assert_eq!(
            to_chat_event(&msg),
            ChatEvent {
                chat_id: ChatId(250918540),
                user_id: Some(250918540),
                text: "/start".to_string(),
            }
        );
    }

    #[test]
    fn channel_post_has_no_user() {
        let msg = message(serde_json::json!({
            "message_id": 11,
            "date": 1567927221,
            "chat": {
                "id": -1001234567890i64,
                "title": "Releases",
                "type": "channel"
            },
            "text": "/start"
        }));

        let event = to_chat_event(&msg);
        assert_eq!(event.user_id, None);
        assert_eq!(event.chat_id, ChatId(-1001234567890));
    }
}
