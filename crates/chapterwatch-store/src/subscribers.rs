use std::collections::BTreeSet;
use std::sync::Mutex;

use chapterwatch_core::types::ChatId;
use rusqlite::Connection;
use tracing::{info, instrument};

use crate::db::lock;
use crate::error::Result;

/// The set of chats opted in to release notifications.
pub trait SubscriberRegistry: Send + Sync {
    /// Insert `chat_id` if absent. Returns `true` when a new row was created.
    fn add(&self, chat_id: ChatId) -> Result<bool>;

    /// Delete `chat_id`. Returns `false` when it was not subscribed.
    fn remove(&self, chat_id: ChatId) -> Result<bool>;

    /// Point-in-time snapshot of every subscriber.
    fn list(&self) -> Result<BTreeSet<ChatId>>;
}

/// SQLite-backed [`SubscriberRegistry`].
///
/// `chat_id` is the primary key, so the conditional insert in `add` is the
/// only dedup mechanism needed, even across connections.
pub struct SqliteSubscriberRegistry {
    db: Mutex<Connection>,
}

impl SqliteSubscriberRegistry {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    pub fn count(&self) -> Result<u64> {
        let db = lock(&self.db)?;
        let n: i64 = db.query_row("SELECT COUNT(*) FROM subscribers", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

impl SubscriberRegistry for SqliteSubscriberRegistry {
    #[instrument(skip(self), fields(chat_id = %chat_id))]
    fn add(&self, chat_id: ChatId) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = lock(&self.db)?;
        let inserted = db.execute(
            "INSERT INTO subscribers (chat_id, subscribed_at) VALUES (?1, ?2)
             ON CONFLICT (chat_id) DO NOTHING",
            rusqlite::params![chat_id.get(), now],
        )?;
        if inserted > 0 {
            info!("subscriber added");
        }
        Ok(inserted > 0)
    }

    #[instrument(skip(self), fields(chat_id = %chat_id))]
    fn remove(&self, chat_id: ChatId) -> Result<bool> {
        let db = lock(&self.db)?;
        let deleted = db.execute(
            "DELETE FROM subscribers WHERE chat_id = ?1",
            rusqlite::params![chat_id.get()],
        )?;
        if deleted > 0 {
            info!("subscriber removed");
        }
        Ok(deleted > 0)
    }

    fn list(&self) -> Result<BTreeSet<ChatId>> {
        let db = lock(&self.db)?;
        let mut stmt = db.prepare_cached("SELECT chat_id FROM subscribers")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(ChatId))
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, open};
    use std::sync::Arc;

    fn registry() -> SqliteSubscriberRegistry {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        SqliteSubscriberRegistry::new(conn)
    }

    #[test]
    fn add_twice_keeps_one_entry() {
        let r = registry();
        assert!(r.add(ChatId(42)).unwrap());
        assert!(!r.add(ChatId(42)).unwrap());
        assert_eq!(r.list().unwrap(), BTreeSet::from([ChatId(42)]));
        assert_eq!(r.count().unwrap(), 1);
    }

    #[test]
    fn remove_non_member_is_noop() {
        let r = registry();
        r.add(ChatId(1)).unwrap();
        assert!(!r.remove(ChatId(2)).unwrap());
        assert_eq!(r.count().unwrap(), 1);
    }

    #[test]
    fn remove_member() {
        let r = registry();
        r.add(ChatId(1)).unwrap();
        r.add(ChatId(2)).unwrap();
        assert!(r.remove(ChatId(1)).unwrap());
        assert_eq!(r.list().unwrap(), BTreeSet::from([ChatId(2)]));
    }

    #[test]
    fn list_empty_registry() {
        assert!(registry().list().unwrap().is_empty());
    }

    #[test]
    fn concurrent_adds_same_chat_on_one_connection() {
        let r = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || r.add(ChatId(7)).unwrap())
            })
            .collect();
        let inserted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&new| new)
            .count();

        assert_eq!(inserted, 1);
        assert_eq!(r.count().unwrap(), 1);
    }

    #[test]
    fn concurrent_adds_same_chat_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cw.db");
        let path = path.to_str().unwrap().to_string();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = SqliteSubscriberRegistry::new(open(&path).unwrap());
                std::thread::spawn(move || {
                    for id in 0..25 {
                        r.add(ChatId(id)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let r = SqliteSubscriberRegistry::new(open(&path).unwrap());
        assert_eq!(r.count().unwrap(), 25);
    }
}
