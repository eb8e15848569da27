//! The storage strategy trait and backend selection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use directories::ProjectDirs;
use musing_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{JsonFileBackend, MemoryBackend, SqliteBackend};

/// A key-value store of JSON documents.
///
/// Each call is atomic on its own; nothing spans calls.
pub trait StorageBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: &Value) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Which backend to open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl StorageKind {
    /// Open the backend rooted at `data_dir` (ignored for memory).
    pub fn open(self, data_dir: &Path) -> Result<Arc<dyn StorageBackend>> {
        Ok(match self {
            Self::Sqlite => Arc::new(SqliteBackend::open(data_dir.join("musing.db"))?),
            Self::File => Arc::new(JsonFileBackend::open(data_dir.join("storage.json"))?),
            Self::Memory => Arc::new(MemoryBackend::new()),
        })
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::File => "file",
            Self::Memory => "memory",
        })
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" | "json" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(Error::InvalidArgument(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}

/// Platform data directory for Musing.
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "musing", "Musing")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| Error::Storage("Failed to determine data directory".to_string()))
}
