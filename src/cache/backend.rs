//! Backend Module
//!
//! The raw key-value primitive an engine writes to. Backends know nothing about
//! prefixes, expiration or serialization; they store whatever the pipeline hands them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::RawValue;
use crate::error::Result;

/// Raw storage binding consumed by [`CacheEngine`](crate::cache::CacheEngine).
///
/// Failures are reported as [`CacheError::Backend`](crate::CacheError::Backend)
/// and reach the caller unchanged.
pub trait Backend: Send {
    /// A short name for logging, e.g. "memory".
    fn name(&self) -> &'static str;

    /// Writes `raw` under `key`, replacing any previous value.
    fn store_raw(&mut self, key: &str, raw: RawValue) -> Result<()>;

    /// Returns the stored value, or `None` if the key is absent.
    fn retrieve_raw(&self, key: &str) -> Result<Option<RawValue>>;

    /// Removes a key. Erasing a missing key is not an error.
    fn erase_raw(&mut self, key: &str) -> Result<()>;

    /// Removes every key in the backend.
    fn clear(&mut self) -> Result<()>;

    /// Lists every physical key currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    fn contains_raw(&self, key: &str) -> Result<bool> {
        Ok(self.retrieve_raw(key)?.is_some())
    }
}

// == Memory Backend ==
/// Volatile in-process storage.
///
/// Clones share one map, the way several drivers share a browser's storage
/// area, so engines with different prefixes can be pointed at the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, RawValue>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys, across all prefixes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RawValue>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn store_raw(&mut self, key: &str, raw: RawValue) -> Result<()> {
        self.lock().insert(key.to_string(), raw);
        Ok(())
    }

    fn retrieve_raw(&self, key: &str) -> Result<Option<RawValue>> {
        Ok(self.lock().get(key).cloned())
    }

    fn erase_raw(&mut self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn contains_raw(&self, key: &str) -> Result<bool> {
        Ok(self.lock().contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_and_retrieve() {
        let mut backend = MemoryBackend::new();

        backend.store_raw("k", RawValue::from("v")).unwrap();

        assert_eq!(backend.retrieve_raw("k").unwrap(), Some(RawValue::from("v")));
        assert!(backend.contains_raw("k").unwrap());
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_memory_erase_missing_key_is_noop() {
        let mut backend = MemoryBackend::new();
        backend.erase_raw("missing").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_memory_clones_share_storage() {
        let mut writer = MemoryBackend::new();
        let reader = writer.clone();

        writer.store_raw("shared", RawValue::from("1")).unwrap();

        assert!(reader.contains_raw("shared").unwrap());
    }

    #[test]
    fn test_memory_clear_and_keys() {
        let mut backend = MemoryBackend::new();
        backend.store_raw("a", RawValue::from("1")).unwrap();
        backend.store_raw("b", RawValue::from("2")).unwrap();

        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        backend.clear().unwrap();
        assert!(backend.is_empty());
    }
}
