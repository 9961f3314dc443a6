use anyhow::ensure;
use chapterwatch_core::types::ChapterPointer;
use chapterwatch_store::{
    db, ChapterStore, SqliteChapterStore, SqliteSubscriberRegistry, StoreError,
};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "chapterwatch",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CHAPTERWATCH_GIT_SHA"), ")"),
    about = "Telegram notifications for new manga chapters"
)]
pub struct Cli {
    /// Path to chapterwatch.toml (takes precedence over CHAPTERWATCH_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the bot until SIGINT/SIGTERM (default).
    Run,
    /// Set the starting chapter pointer. Leaves an existing pointer alone.
    Seed {
        /// Number of the latest chapter already out.
        #[arg(long)]
        chapter: i64,
        /// Where that chapter can be read.
        #[arg(long)]
        url: String,
    },
    /// Print the chapter pointer and subscriber count as JSON.
    Status,
}

/// Seed the pointer and describe what happened.
pub fn seed(db_path: &str, pointer: ChapterPointer) -> anyhow::Result<String> {
    ensure!(
        (0..i64::MAX).contains(&pointer.chapter_number),
        "--chapter must be between 0 and {}",
        i64::MAX - 1
    );
    ensure!(!pointer.url.trim().is_empty(), "--url must not be empty");

    let chapters = SqliteChapterStore::new(db::open(db_path)?);
    if chapters.seed(&pointer)? {
        Ok(format!("seeded at chapter {}", pointer.chapter_number))
    } else {
        let current = chapters.get()?;
        Ok(format!(
            "already seeded at chapter {}, left unchanged",
            current.chapter_number
        ))
    }
}

/// Pointer (or `null` when unseeded) plus subscriber count.
pub fn status(db_path: &str) -> anyhow::Result<Value> {
    let chapters = SqliteChapterStore::new(db::open(db_path)?);
    let registry = SqliteSubscriberRegistry::new(db::open(db_path)?);

    let chapter = match chapters.get() {
        Ok(pointer) => Some(pointer),
        Err(StoreError::NotSeeded) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(json!({
        "chapter": chapter,
        "subscribers": registry.count()?,
    }))
}
