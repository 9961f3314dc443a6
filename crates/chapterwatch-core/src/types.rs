use serde::{Deserialize, Serialize};
use std::fmt;

/// Telegram chat identifier of a subscriber.
///
/// Unique key of the subscriber registry. Kept separate from the transport's
/// own id type so the core never depends on the chat platform crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChatId(pub i64);

impl ChatId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The singleton "latest known chapter" record.
///
/// `chapter_number` only ever moves forward; the poller looks for
/// `chapter_number + 1` on every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterPointer {
    pub chapter_number: i64,
    pub url: String,
}

impl ChapterPointer {
    /// Chapter number the poller is waiting for. `None` once the counter
    /// cannot go any higher.
    pub fn next_chapter(&self) -> Option<i64> {
        self.chapter_number.checked_add(1)
    }
}

/// One inbound chat message, stripped down to what the command dispatcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub chat_id: ChatId,
    /// `None` for channel posts and other events without a human sender.
    pub user_id: Option<u64>,
    pub text: String,
}

/// A newly detected chapter, handed from the poller to the broadcaster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRelease {
    pub chapter_number: i64,
    /// Full chapter URL (base URL + matched path fragment).
    pub url: String,
}

impl ChapterRelease {
    /// Last `-`-delimited segment of the URL, e.g. `1099` for
    /// `…/one-piece-chapter-1099`.
    pub fn chapter_token(&self) -> &str {
        self.url.rsplit('-').next().unwrap_or(self.url.as_str())
    }
}
