//! JSON file backend: the whole store is one object in one file.

use std::fs;
use std::path::{Path, PathBuf};

use musing_core::{Error, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::StorageBackend;

/// Local development store kept in a single JSON file.
pub struct JsonFileBackend {
    path: PathBuf,
    /// Serializes read-modify-write of the file within this process.
    lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Use the file at `path`, creating its directory if needed.
    /// The file itself is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("File storage at {}", path.display());
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => match serde_json::from_str(&text)? {
                Value::Object(map) => Ok(map),
                _ => Err(Error::Storage(format!(
                    "{} does not contain a JSON object",
                    self.path.display()
                ))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, map: &Map<String, Value>) -> Result<()> {
        let text = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} keys to {}", map.len(), self.path.display());
        Ok(())
    }
}

impl StorageBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.load()?;
        map.insert(key.to_string(), value.clone());
        self.store(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.store(&map)?;
        }
        Ok(())
    }
}
