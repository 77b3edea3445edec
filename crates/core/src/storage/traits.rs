//! Storage traits
//!
//! The document is written through a plain string key-value interface so the
//! backend can be SQLite, memory, or whatever the host provides.

use crate::error::Result;

/// Get/set string storage
pub trait KeyValueStore {
    /// Read the value under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing what was there
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
