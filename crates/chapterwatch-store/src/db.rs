use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the database file and apply the schema.
///
/// Every store gets its own connection to the same file; WAL mode lets the
/// broadcaster read the registry while the dispatcher writes to it.
pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    init_db(&conn)?;
    Ok(conn)
}

/// Initialise all tables. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS subscribers (
            chat_id        INTEGER NOT NULL PRIMARY KEY,
            subscribed_at  TEXT    NOT NULL
        ) STRICT;

        -- Singleton: the CHECK keeps it at one row.
        CREATE TABLE IF NOT EXISTS chapter_pointer (
            id              INTEGER NOT NULL PRIMARY KEY CHECK (id = 1),
            chapter_number  INTEGER NOT NULL,
            url             TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}

pub(crate) fn lock(db: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    db.lock().map_err(|_| StoreError::Poisoned)
}
