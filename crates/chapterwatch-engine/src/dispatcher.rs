//! Inbound chat command handling.
//!
//! Events are consumed one at a time in arrival order. Every step of a
//! command is attempted on its own: a failed send or store call is logged
//! and the next step still runs.

use std::sync::Arc;

use chapterwatch_core::messages;
use chapterwatch_core::types::{ChatEvent, ChatId};
use chapterwatch_store::{ChapterStore, SubscriberRegistry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::outbound::Outbound;

/// Commands understood at the chat boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Subscribe, greet, and report the latest known chapter.
    Start,
    /// Unsubscribe.
    Stop,
}

impl Command {
    /// Parse the leading token of a message.
    ///
    /// Accepts `/start`, `/start@any_bot` and `/start <payload>`; anything
    /// else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_addressed(text, None)
    }

    /// Like [`parse`](Self::parse), but when `bot_username` is known a
    /// `@suffix` must name it (case-insensitive). `/start@other_bot` in a
    /// group is meant for another bot and yields `None`.
    pub fn parse_addressed(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let (name, addressee) = match token.split_once('@') {
            Some((name, bot)) => (name, Some(bot)),
            None => (token, None),
        };
        if let (Some(addressee), Some(me)) = (addressee, bot_username) {
            if !addressee.eq_ignore_ascii_case(me.trim_start_matches('@')) {
                return None;
            }
        }
        match name {
            "/start" => Some(Command::Start),
            "/stop" => Some(Command::Stop),
            _ => None,
        }
    }
}

pub struct CommandDispatcher {
    registry: Arc<dyn SubscriberRegistry>,
    chapters: Arc<dyn ChapterStore>,
    outbound: Arc<dyn Outbound>,
    series_name: String,
    bot_username: Option<String>,
}

impl CommandDispatcher {
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        chapters: Arc<dyn ChapterStore>,
        outbound: Arc<dyn Outbound>,
        series_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            chapters,
            outbound,
            series_name: series_name.into(),
            bot_username: None,
        }
    }

    /// Only accept `@suffix`ed commands addressed to `username`.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.bot_username = (!username.is_empty()).then_some(username);
        self
    }

    /// Consume `events` sequentially until shutdown or until the sender side closes.
    pub async fn run(self, mut events: mpsc::Receiver<ChatEvent>, cancel: CancellationToken) {
        info!("command dispatcher started");
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.handle(event) => {}
            }
        }
        info!("command dispatcher stopped");
    }

    /// Handle one event. Returns the command that was executed, if any.
    pub async fn handle(&self, event: ChatEvent) -> Option<Command> {
        if event.user_id.is_none() {
            debug!(chat_id = %event.chat_id, "event without sender discarded");
            return None;
        }
        let Some(command) = Command::parse_addressed(&event.text, self.bot_username.as_deref())
        else {
            debug!(chat_id = %event.chat_id, "not a command, ignored");
            return None;
        };

        debug!(chat_id = %event.chat_id, ?command, "handling command");
        match command {
            Command::Start => self.start(event.chat_id).await,
            Command::Stop => self.stop(event.chat_id),
        }
        Some(command)
    }

    async fn start(&self, chat_id: ChatId) {
        if let Err(e) = self.outbound.send(chat_id, messages::WELCOME).await {
            warn!(chat_id = %chat_id, error = %e, "could not send welcome message");
        }

        if let Err(e) = self.registry.add(chat_id) {
            warn!(chat_id = %chat_id, error = %e, "could not add subscriber");
        }

        match self.chapters.get() {
            Ok(pointer) => {
                let text = messages::latest_chapter(&self.series_name, &pointer.url);
                if let Err(e) = self.outbound.send(chat_id, &text).await {
                    warn!(chat_id = %chat_id, error = %e, "could not send latest chapter");
                }
            }
            Err(e) => warn!(chat_id = %chat_id, error = %e, "could not read latest chapter"),
        }
    }

    fn stop(&self, chat_id: ChatId) {
        if let Err(e) = self.registry.remove(chat_id) {
            warn!(chat_id = %chat_id, error = %e, "could not remove subscriber");
        }
    }
}
