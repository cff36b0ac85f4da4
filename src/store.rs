//! Durable persistence for the upload queue
//!
//! The queue is persisted as a single JSON blob under a fixed key in a
//! SQLite-backed key-value table. A write replaces the whole blob in one
//! statement, so readers see either the previous list or the new one,
//! never a partial write.

use crate::error::UploadQueueError;
use crate::models::QueueEntry;
use crate::schema;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Storage key for the photo upload queue blob
pub const QUEUE_STORAGE_KEY: &str = "photo_upload_queue";

/// Durable key-value accessor backing the queue
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, UploadQueueError>;
    fn set(&self, key: &str, value: &str) -> Result<(), UploadQueueError>;
}

/// Key-value store backed by a SQLite database
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps an existing connection, initializing the schema if needed
    pub fn new(conn: Connection) -> Result<Self, UploadQueueError> {
        schema::init_queue_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) the database file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, UploadQueueError> {
        let db_path: PathBuf = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&db_path)?;
        Self::new(conn)
    }

    /// Opens an in-memory database, useful for tests
    pub fn open_in_memory() -> Result<Self, UploadQueueError> {
        Self::new(Connection::open_in_memory()?)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, UploadQueueError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), UploadQueueError> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Save/load layer for the serialized entry list
pub struct QueueStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> QueueStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serializes the full entry list and writes it, replacing prior contents
    pub fn save(&self, entries: &[QueueEntry]) -> Result<(), UploadQueueError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(QUEUE_STORAGE_KEY, &json)
    }

    /// Reads the persisted entry list
    ///
    /// Returns an empty list when no prior data exists, and also when the
    /// read or the parse fails, so startup never blocks on a bad blob.
    pub fn load(&self) -> Vec<QueueEntry> {
        let raw = match self.store.get(QUEUE_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read persisted upload queue: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Persisted upload queue is unreadable, starting empty: {}", e);
                Vec::new()
            }
        }
    }
}
