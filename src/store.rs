//! Persistent sighting store backed by SQLite.
//!
//! Each sighting key owns an append-only sequence of timestamps. Rows are
//! never updated or deleted; ordering within a key follows insertion order.
//! Callers open the store scoped to one logical operation and drop it when
//! done rather than holding a connection across the scan loop.

use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Parent directory for the database could not be created
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// SQLite reported an error
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Handle to the sighting database.
pub struct SightingStore {
    conn: Connection,
}

impl SightingStore {
    /// Open or create the sighting database with WAL mode enabled.
    ///
    /// The parent directory is created if missing, so a configured path like
    /// `logs/device_log.db` works on first run.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;

        // WAL keeps the database readable while a sighting is being appended
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sightings (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                key     TEXT NOT NULL,
                seen_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sightings_key ON sightings(key);
            "#,
        )?;

        Ok(Self { conn })
    }

    /// Append one timestamp to a key's sighting sequence.
    pub fn append(&self, key: &str, timestamp: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO sightings (key, seen_at) VALUES (?1, ?2)",
            params![key, timestamp],
        )?;
        Ok(())
    }

    /// All timestamps recorded for a key, oldest first.
    pub fn timestamps(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT seen_at FROM sightings WHERE key = ?1 ORDER BY id")?;

        let timestamps = stmt
            .query_map([key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(timestamps)
    }

    /// Every key with its full timestamp sequence, keys in sorted order.
    pub fn snapshot(&self) -> Result<Vec<(String, Vec<String>)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, seen_at FROM sightings ORDER BY key, id")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;

        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        for (key, seen_at) in rows {
            match entries.last_mut() {
                Some((last_key, timestamps)) if *last_key == key => timestamps.push(seen_at),
                _ => entries.push((key, vec![seen_at])),
            }
        }

        Ok(entries)
    }
}
