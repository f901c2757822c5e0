use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "books.sqlite";

/// Durable key-value store backed by an embedded SQLite database.
///
/// The application keeps its entire state under a single key, so the store
/// only needs two operations: fetch the raw value for a key and replace it
/// wholesale. Both map to one SQLite statement each, which makes every
/// `get`/`set` atomic at the database level.
#[derive(Debug)]
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open the store in the user's home directory, creating the data
    /// directory and the `kv` table on first run.
    pub fn open() -> Result<Self> {
        let db_path = data_dir()?.join(DB_FILE_NAME);
        Self::open_at(&db_path)
    }

    /// Open the store at an explicit path. Used by `open` and by tests that
    /// need a throwaway database file.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }

        let conn = Connection::open(path).context("failed to open SQLite database")?;
        debug!(path = %path.display(), "opened key-value store");
        Self::with_connection(conn)
    }

    /// In-memory store for tests. Same schema, no file on disk.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create kv table")?;

        Ok(Self { conn })
    }

    /// Fetch the raw value stored under `key`. An absent key is `None`, not
    /// an error; errors mean the read itself failed.
    pub fn get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
    }

    /// Replace the value stored under `key`. The single statement either
    /// inserts or overwrites, so readers never observe a partial value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Resolve the application data directory inside the user's home. The log
/// file and the database live side by side in here.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_none() {
        let store = KvStore::open_in_memory().unwrap();
        assert_eq!(store.get("book").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("book", "[]").unwrap();
        assert_eq!(store.get("book").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn set_replaces_the_whole_value() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("book", "old").unwrap();
        store.set("book", "new").unwrap();
        assert_eq!(store.get("book").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn keys_are_independent() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("book", "[]").unwrap();
        assert_eq!(store.get("other").unwrap(), None);
    }
}
