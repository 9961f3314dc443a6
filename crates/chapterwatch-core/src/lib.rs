//! Shared building blocks for the chapterwatch workspace: configuration,
//! the domain types passed between the pipeline stages, and the fixed
//! message texts sent to subscribers.

pub mod config;
pub mod error;
pub mod messages;
pub mod types;

pub use config::ChapterwatchConfig;
pub use error::{CoreError, Result};
pub use types::{ChapterPointer, ChapterRelease, ChatEvent, ChatId};
