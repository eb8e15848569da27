//! Application configuration.
//!
//! Read from `config.json` in the platform config directory; every field is
//! optional. `MUSING_DEV` and command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use musing_sources::{quote_garden, zenquotes, HttpConfig};
use musing_storage::StorageKind;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.json";

/// Environment variable that turns on development mode.
pub const DEV_ENV: &str = "MUSING_DEV";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which storage backend holds the settings record.
    pub storage: StorageKind,
    /// Override for the data directory.
    pub data_dir: Option<PathBuf>,
    /// Verbose logging of fetch and storage failures.
    pub dev_mode: bool,
    pub request_timeout_secs: u64,
    pub zenquotes_base_url: String,
    pub quote_garden_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Sqlite,
            data_dir: None,
            dev_mode: false,
            request_timeout_secs: 30,
            zenquotes_base_url: zenquotes::DEFAULT_BASE_URL.to_string(),
            quote_garden_base_url: quote_garden::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "musing", "Musing").map(|d| d.config_dir().join(CONFIG_FILE))
    }

    /// Load from `path`. A missing file gives the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
            }
        }
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(DEV_ENV) {
            self.dev_mode = is_truthy(&value);
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => musing_storage::default_data_dir().context("No data directory available"),
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default().with_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
