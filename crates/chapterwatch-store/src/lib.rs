//! `chapterwatch-store`: SQLite persistence for the chapter pointer and the
//! subscriber registry.
//!
//! The two capability traits, [`ChapterStore`] and [`SubscriberRegistry`],
//! are what the pipeline components depend on. The SQLite implementations
//! each own one `Connection`; several of them can share a database file.

pub mod chapters;
pub mod db;
pub mod error;
pub mod subscribers;

pub use chapters::{ChapterStore, SqliteChapterStore};
pub use error::{Result, StoreError};
pub use subscribers::{SqliteSubscriberRegistry, SubscriberRegistry};
