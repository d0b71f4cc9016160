//! SQLite-backed substrate: a single `kv` table keyed by slot name.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use super::{BackendError, KeyValueStore};

/// Busy timeout applied to every storage connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_KV: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database at `path` and ensure the `kv` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or configured.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BackendError::io(parent, e))?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, BackendError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, BackendError> {
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        conn.execute(CREATE_KV, [])?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("tally.sqlite3");
        (dir, path)
    }

    #[test]
    fn open_sets_busy_timeout_and_creates_table() {
        let (_dir, path) = temp_db_path();
        let storage = SqliteStorage::open(&path).expect("open sqlite storage");

        let busy_timeout_ms: u64 = storage
            .conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(u128::from(busy_timeout_ms), DEFAULT_BUSY_TIMEOUT.as_millis());

        let tables: i64 = storage
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv'",
                [],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        assert_eq!(tables, 1);
    }

    #[test]
    fn set_replaces_and_remove_deletes() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get("items").unwrap(), None);

        storage.set("items", "[]").unwrap();
        storage.set("items", "[1]").unwrap();
        assert_eq!(storage.get("items").unwrap().as_deref(), Some("[1]"));

        storage.remove("items").unwrap();
        storage.remove("items").unwrap();
        assert_eq!(storage.get("items").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let (_dir, path) = temp_db_path();
        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage.set("items", r#"[{"id":0,"name":"Eggs","value":300}]"#).unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert!(storage.get("items").unwrap().unwrap().contains("Eggs"));
    }
}
