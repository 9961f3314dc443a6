use std::sync::Arc;

use anyhow::Context;
use chapterwatch_core::types::ChapterPointer;
use chapterwatch_core::ChapterwatchConfig;
use chapterwatch_engine::{
    handoff, Broadcaster, CommandDispatcher, HttpPageSource, Outbound, Poller, PollerSettings,
};
use chapterwatch_store::{
    db, ChapterStore, SqliteChapterStore, SqliteSubscriberRegistry, StoreError,
};
use chapterwatch_telegram::TelegramAdapter;
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod cli;
mod signals;

use cli::{Cli, Command};

/// Messages buffered between the Telegram adapter and the command dispatcher.
const EVENT_QUEUE: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // explicit path > CHAPTERWATCH_CONFIG > ~/.chapterwatch/chapterwatch.toml
    let config = ChapterwatchConfig::load(cli.config.as_deref()).context("loading config")?;
    init_tracing(config.debug);

    let db_path = config.database.ensure_parent_dir()?;
    info!(path = %db_path, "opening SQLite database");

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, &db_path).await,
        Command::Seed { chapter, url } => {
            let outcome = cli::seed(
                &db_path,
                ChapterPointer {
                    chapter_number: chapter,
                    url,
                },
            )?;
            println!("{outcome}");
            Ok(())
        }
        Command::Status => {
            let report = cli::status(&db_path)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise our crates log at info, or debug with `debug = true`.
fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("chapterwatch={level},teloxide=warn").into()),
        )
        .init();
}

async fn run(config: ChapterwatchConfig, db_path: &str) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("CHAPTERWATCH_GIT_SHA"),
        "chapterwatch starting"
    );

    // each store gets its own connection to the same file
    let chapters = Arc::new(SqliteChapterStore::new(db::open(db_path)?));
    let registry = Arc::new(SqliteSubscriberRegistry::new(db::open(db_path)?));

    let current = match chapters.get() {
        Ok(pointer) => pointer,
        Err(StoreError::NotSeeded) => anyhow::bail!(
            "chapter pointer is not seeded; run `chapterwatch seed --chapter N --url URL` first"
        ),
        Err(e) => return Err(e.into()),
    };
    info!(
        chapter = current.chapter_number,
        subscribers = registry.count()?,
        "state loaded"
    );

    let telegram = TelegramAdapter::new(&config.telegram)?;
    let bot_username = telegram
        .verify()
        .await
        .context("Telegram rejected the bot token")?;
    telegram.register_commands().await;
    let outbound: Arc<dyn Outbound> = Arc::new(telegram.outbound());

    let source = Arc::new(HttpPageSource::from_config(&config.scrape)?);
    let series_name = config.scrape.series_name.clone();

    let cancel = CancellationToken::new();
    let (releases_tx, releases_rx) = handoff();
    let (events_tx, events_rx) = tokio::sync::mpsc::channel(EVENT_QUEUE);

    let poller = Poller::new(
        chapters.clone(),
        source,
        releases_tx,
        PollerSettings::from_config(&config.scrape),
    );
    let broadcaster = Broadcaster::new(registry.clone(), outbound.clone(), series_name.clone());
    let dispatcher = CommandDispatcher::new(registry, chapters, outbound, series_name.clone())
        .with_bot_username(bot_username);

    let mut tasks = JoinSet::new();
    tasks.spawn(poller.run(cancel.clone()));
    tasks.spawn(broadcaster.run(releases_rx, cancel.clone()));
    tasks.spawn(dispatcher.run(events_rx, cancel.clone()));
    tasks.spawn(telegram.run(events_tx, cancel.clone()));
    info!(series = %series_name, url = %config.scrape.url, "chapterwatch running");

    tokio::select! {
        res = signals::wait_for_shutdown_signal() => match res {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => warn!(error = %e, "signal handler failed, shutting down"),
        },
        Some(_) = tasks.join_next() => warn!("a pipeline task exited early, shutting down"),
    }

    cancel.cancel();
    while let Some(res) = tasks.join_next().await {
        if let Err(e) = res {
            warn!(error = %e, "task ended abnormally");
        }
    }
    info!("chapterwatch stopped");
    Ok(())
}
