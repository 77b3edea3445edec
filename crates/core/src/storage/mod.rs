//! Storage layer for SortPot
//!
//! The document is persisted through [`KeyValueStore`]. Two backends ship here:
//! an SQLite [`Database`] for real use and a [`MemoryStore`] for tests.

mod document;
mod kv;
mod memory;
mod migrations;
mod parse;
mod traits;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::error::Result;

pub use document::{
    merge_keeping_valid_keys, merge_over_default, normalize, parse_import, DocumentStore,
    EXPORTED_AT_KEY, STORAGE_KEY,
};
pub use kv::KvStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        migrations::get_current_version(&self.conn).unwrap_or(0)
    }

    /// Get the key-value store
    pub fn kv(&self) -> KvStore<'_> {
        KvStore::new(&self.conn)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.kv().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.kv().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.kv().remove(key)
    }
}
