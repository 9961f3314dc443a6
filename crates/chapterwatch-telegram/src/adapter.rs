//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher`. Incoming messages are forwarded as
//! [`ChatEvent`]s to the command dispatcher; outbound sends go through
//! [`TelegramOutbound`]. Long polling, no public URL required.

use std::time::Duration;

use chapterwatch_core::config::TelegramConfig;
use chapterwatch_core::types::ChatEvent;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::MenuCommand;
use crate::error::TelegramError;
use crate::handler::forward_message;
use crate::send::TelegramOutbound;

pub struct TelegramAdapter {
    bot: Bot,
}

impl TelegramAdapter {
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        if config.bot_token.trim().is_empty() {
            return Err(TelegramError::NoToken);
        }
        Ok(Self {
            bot: Bot::new(&config.bot_token),
        })
    }

    /// Check the token with `getMe`. Returns the bot's username.
    pub async fn verify(&self) -> Result<String, TelegramError> {
        let me = self.bot.get_me().await?;
        let username = me.user.username.clone().unwrap_or_default();
        info!(bot = %username, "Telegram: bot token accepted");
        Ok(username)
    }

    /// Publish `/start` and `/stop` in the chat command menu. Best effort.
    pub async fn register_commands(&self) {
        if let Err(e) = self.bot.set_my_commands(MenuCommand::bot_commands()).await {
            warn!(error = %e, "Telegram: could not register command menu");
        }
    }

    /// Outbound handle sharing this adapter's bot.
    pub fn outbound(&self) -> TelegramOutbound {
        TelegramOutbound::new(self.bot.clone())
    }

    /// Drive the long-polling loop until `cancel` fires.
    pub async fn run(self, events: mpsc::Sender<ChatEvent>, cancel: CancellationToken) {
        info!("Telegram: starting long-polling dispatcher");

        let handler = Update::filter_message().endpoint(forward_message);
        let mut dispatcher = Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![events])
            .default_handler(|_upd| async {})
            .build();

        let token = dispatcher.shutdown_token();
        let stopper = tokio::spawn(async move {
            cancel.cancelled().await;
            // Shutdown is refused until the dispatcher is running; keep asking.
            loop {
                match token.shutdown() {
                    Ok(done) => {
                        done.await;
                        break;
                    }
                    Err(_idle) => tokio::time::sleep(Duration::from_millis(100)).await,
                }
            }
        });

        dispatcher.dispatch().await;
        stopper.abort();
        info!("Telegram: dispatcher stopped");
    }
}
