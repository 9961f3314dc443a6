use std::sync::Mutex;

use chapterwatch_core::types::ChapterPointer;
use rusqlite::Connection;
use tracing::{debug, info, instrument, warn};

use crate::db::lock;
use crate::error::{Result, StoreError};

/// Read/advance access to the singleton chapter pointer.
///
/// Only the poller calls [`advance`](ChapterStore::advance); the command
/// dispatcher reads the pointer to answer `/start`.
pub trait ChapterStore: Send + Sync {
    /// Current pointer. Fails with [`StoreError::NotSeeded`] before the
    /// first `seed`.
    fn get(&self) -> Result<ChapterPointer>;

    /// Move the pointer to `expected_number + 1` with `new_url`.
    ///
    /// Both columns change in one statement, conditional on the stored
    /// number still being `expected_number`. Returns `false` when the
    /// condition did not hold and nothing was written.
    fn advance(&self, expected_number: i64, new_url: &str) -> Result<bool>;
}

/// SQLite-backed [`ChapterStore`].
pub struct SqliteChapterStore {
    db: Mutex<Connection>,
}

impl SqliteChapterStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Create the pointer row if it does not exist yet.
    ///
    /// Returns `false` and leaves the stored pointer untouched when the row
    /// is already there.
    #[instrument(skip(self), fields(chapter = pointer.chapter_number))]
    pub fn seed(&self, pointer: &ChapterPointer) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = lock(&self.db)?;
        let inserted = db.execute(
            "INSERT INTO chapter_pointer (id, chapter_number, url, updated_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT (id) DO NOTHING",
            rusqlite::params![pointer.chapter_number, pointer.url, now],
        )?;
        if inserted == 0 {
            warn!("chapter pointer already seeded, leaving it unchanged");
            return Ok(false);
        }
        info!(url = %pointer.url, "chapter pointer seeded");
        Ok(true)
    }
}

impl ChapterStore for SqliteChapterStore {
    fn get(&self) -> Result<ChapterPointer> {
        let db = lock(&self.db)?;
        match db.query_row(
            "SELECT chapter_number, url FROM chapter_pointer WHERE id = 1",
            [],
            |row| {
                Ok(ChapterPointer {
                    chapter_number: row.get(0)?,
                    url: row.get(1)?,
                })
            },
        ) {
            Ok(pointer) => Ok(pointer),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotSeeded),
            Err(e) => Err(StoreError::Unavailable(e)),
        }
    }

    #[instrument(skip(self))]
    fn advance(&self, expected_number: i64, new_url: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = lock(&self.db)?;
        let rows_changed = db.execute(
            "UPDATE chapter_pointer
             SET chapter_number = ?1 + 1,
                 url            = ?2,
                 updated_at     = ?3
             WHERE id = 1 AND chapter_number = ?1",
            rusqlite::params![expected_number, new_url, now],
        )?;
        if rows_changed == 0 {
            debug!("pointer no longer at expected chapter, advance skipped");
            return Ok(false);
        }
        Ok(true)
    }
}
