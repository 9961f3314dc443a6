use chapterwatch_core::types::ChatId;
use chapterwatch_store::StoreError;
use thiserror::Error;

/// Failure to fetch the watched page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with anything other than 200 OK.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// Failure to push a release into the handoff.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandoffError {
    /// Shutdown was requested while waiting for the broadcaster.
    #[error("handoff cancelled")]
    Cancelled,

    /// The broadcaster side has been dropped.
    #[error("handoff closed")]
    Closed,
}

/// Why a single poll cycle was abandoned.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("chapter store: {0}")]
    Store(#[from] StoreError),

    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid detection pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("handoff: {0}")]
    Handoff(#[from] HandoffError),

    #[error("chapter {0} is the highest number that can be stored")]
    NoNextChapter(i64),
}

/// A message could not be delivered to one chat.
#[derive(Debug, Error)]
#[error("delivery to chat {chat_id} failed: {reason}")]
pub struct DeliveryError {
    pub chat_id: ChatId,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(chat_id: ChatId, reason: impl Into<String>) -> Self {
        Self {
            chat_id,
            reason: reason.into(),
        }
    }
}
