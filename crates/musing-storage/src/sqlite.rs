//! `SQLite` key-value backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use musing_core::{Error, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tracing::info;

use crate::StorageBackend;

/// Durable store backed by a single `SQLite` table.
pub struct SqliteBackend {
    db: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create data directory: {e}")))?;
        }

        let db = Connection::open(&path)
            .map_err(|e| Error::Storage(format!("Failed to open database: {e}")))?;
        Self::init(&db)?;

        info!("Storage initialized at {}", path.display());

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path,
        })
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("Failed to open database: {e}")))?;
        Self::init(&db)?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path: PathBuf::from(":memory:"),
        })
    }

    fn init(db: &Connection) -> Result<()> {
        db.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS storage_items (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| Error::Storage(format!("Failed to initialize database: {e}")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let db = self.db.lock();
        let raw: Option<String> = db
            .query_row(
                "SELECT value FROM storage_items WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Storage(format!("Failed to read {key}: {e}")))?;

        raw.map(|text| serde_json::from_str(&text).map_err(Error::from))
            .transpose()
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let db = self.db.lock();
        db.execute(
            "INSERT OR REPLACE INTO storage_items (key, value, updated_at) VALUES (?, ?, ?)",
            rusqlite::params![key, text, Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::Storage(format!("Failed to write {key}: {e}")))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock();
        db.execute("DELETE FROM storage_items WHERE key = ?", [key])
            .map_err(|e| Error::Storage(format!("Failed to remove {key}: {e}")))?;
        Ok(())
    }
}
