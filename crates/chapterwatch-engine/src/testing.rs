//! Hand-written fakes for the capability traits.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chapterwatch_core::types::{ChapterPointer, ChatId};
use chapterwatch_store::{ChapterStore, StoreError, SubscriberRegistry};

use crate::error::{DeliveryError, FetchError};
use crate::outbound::Outbound;
use crate::source::PageSource;

/// Ordered log of side effects shared between fakes.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(journal: &Option<Journal>, entry: String) {
    if let Some(j) = journal {
        j.lock().unwrap().push(entry);
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable(rusqlite::Error::ExecuteReturnedResults)
}

/// Records every send; chats in `failing` get a `DeliveryError` instead.
#[derive(Default)]
pub struct RecordingOutbound {
    pub sent: Mutex<Vec<(ChatId, String)>>,
    pub failing: BTreeSet<ChatId>,
    pub journal: Option<Journal>,
}

impl RecordingOutbound {
    pub fn failing_for(ids: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            failing: ids.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        record(&self.journal, format!("send {chat_id}: {text}"));
        if self.failing.contains(&chat_id) {
            return Err(DeliveryError::new(chat_id, "blocked by user"));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// In-memory registry that can be switched into a failing state.
#[derive(Default)]
pub struct FakeRegistry {
    pub members: Mutex<BTreeSet<ChatId>>,
    pub unavailable: bool,
    pub journal: Option<Journal>,
}

impl FakeRegistry {
    pub fn with_members(ids: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            members: Mutex::new(ids.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn members(&self) -> BTreeSet<ChatId> {
        self.members.lock().unwrap().clone()
    }
}

impl SubscriberRegistry for FakeRegistry {
    fn add(&self, chat_id: ChatId) -> chapterwatch_store::Result<bool> {
        record(&self.journal, format!("add {chat_id}"));
        if self.unavailable {
            return Err(unavailable());
        }
        Ok(self.members.lock().unwrap().insert(chat_id))
    }

    fn remove(&self, chat_id: ChatId) -> chapterwatch_store::Result<bool> {
        record(&self.journal, format!("remove {chat_id}"));
        if self.unavailable {
            return Err(unavailable());
        }
        Ok(self.members.lock().unwrap().remove(&chat_id))
    }

    fn list(&self) -> chapterwatch_store::Result<BTreeSet<ChatId>> {
        if self.unavailable {
            return Err(unavailable());
        }
        Ok(self.members())
    }
}

/// Chapter store holding an optional pointer.
pub struct FakeChapters {
    pub pointer: Mutex<Option<ChapterPointer>>,
}

impl FakeChapters {
    pub fn at(chapter_number: i64, url: &str) -> Self {
        Self {
            pointer: Mutex::new(Some(ChapterPointer {
                chapter_number,
                url: url.to_string(),
            })),
        }
    }

    pub fn unseeded() -> Self {
        Self {
            pointer: Mutex::new(None),
        }
    }
}

impl ChapterStore for FakeChapters {
    fn get(&self) -> chapterwatch_store::Result<ChapterPointer> {
        self.pointer
            .lock()
            .unwrap()
            .clone()
            .ok_or(StoreError::NotSeeded)
    }

    fn advance(&self, expected_number: i64, new_url: &str) -> chapterwatch_store::Result<bool> {
        let mut guard = self.pointer.lock().unwrap();
        match guard.as_mut() {
            Some(p) if p.chapter_number == expected_number => {
                p.chapter_number += 1;
                p.url = new_url.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Page source that returns a canned body, or a 503 when `body` is `None`.
pub struct StaticPage {
    pub body: Option<String>,
}

impl StaticPage {
    pub fn with_body(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
        }
    }

    pub fn down() -> Self {
        Self { body: None }
    }
}

#[async_trait]
impl PageSource for StaticPage {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.body.clone().ok_or(FetchError::Status(503))
    }
}

/// Page source whose fetch never completes.
pub struct HangingPage;

#[async_trait]
impl PageSource for HangingPage {
    async fn fetch(&self) -> Result<String, FetchError> {
        std::future::pending::<Result<String, FetchError>>().await
    }
}
