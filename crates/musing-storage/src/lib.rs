//! # musing-storage
//!
//! Persistence for Musing's settings record and quote cache.
//!
//! The store is a plain key-value interface ([`StorageBackend`]) with three
//! implementations chosen once at startup:
//! - [`SqliteBackend`] for the durable, synced profile store
//! - [`JsonFileBackend`] for a local development shim
//! - [`MemoryBackend`] for tests and as a last resort
//!
//! [`StorageService`] layers the settings merge, cache freshness and prefetch
//! slot on top of any backend.

mod backend;
mod file;
mod memory;
mod service;
mod sqlite;

pub use backend::{default_data_dir, StorageBackend, StorageKind};
pub use file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use service::{StorageService, DEFAULT_FRESHNESS_WINDOW_HOURS, REFETCH_INTERVAL_MINUTES};
pub use sqlite::SqliteBackend;
