use thiserror::Error;

/// Errors raised by the chapter store and the subscriber registry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQLite operation failed.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    /// The chapter pointer row has not been created yet.
    ///
    /// Seed it once with `chapterwatch seed --chapter <N> --url <URL>`.
    #[error("no chapter pointer stored; seed it before the first run")]
    NotSeeded,

    /// A thread panicked while holding the connection lock.
    #[error("store connection lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
