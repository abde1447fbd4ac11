//! Key-value persistence capability.
//!
//! Persistence is written against the [`KeyValueStore`] trait so the
//! backing can be swapped — the app uses a single-table SQLite database in
//! the platform data directory; tests open `:memory:`.

use rusqlite::{params, Connection, OptionalExtension};

use super::errors::StorageError;

// ─── Trait ──────────────────────────────────────────────────────────────────

/// A minimal string key-value capability.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ─── SQLite Backing ─────────────────────────────────────────────────────────

/// SQLite-backed key-value store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    ///
    /// Pass `":memory:"` for an in-memory store (tests).
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open(":memory:").unwrap()
    }

    #[test]
    fn get_missing_key_is_none() {
        let s = store();
        assert_eq!(s.get("absent").unwrap(), None);
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut s = store();
        s.set("k", "v1").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v1"));
    }

    #[test]
    fn set_overwrites_existing_value() {
        let mut s = store();
        s.set("k", "v1").unwrap();
        s.set("k", "v2").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn remove_deletes_the_key() {
        let mut s = store();
        s.set("k", "v").unwrap();
        s.remove("k").unwrap();
        assert_eq!(s.get("k").unwrap(), None);
        // Removing again is harmless.
        s.remove("k").unwrap();
    }

    #[test]
    fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let path_str = path.to_string_lossy().into_owned();

        {
            let mut s = SqliteStore::open(&path_str).unwrap();
            s.set("k", "persisted").unwrap();
        }
        let s = SqliteStore::open(&path_str).unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("persisted"));
    }
}
