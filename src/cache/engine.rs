//! Cache Engine Module
//!
//! Applies key prefixing, lazy TTL expiration and the value pipeline on top of
//! any [`Backend`]. Backend variants (persistent, volatile, encrypted) are all
//! configurations of this one engine.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{
    Backend, CacheStats, Clock, ConvertFn, Driver, Encryption, Envelope, MemoryBackend, ParseFn,
    Pipeline, SystemClock,
};
use crate::error::Result;

// == Cache Engine ==
/// A driver over a raw backend.
pub struct CacheEngine<B> {
    /// Raw storage
    backend: B,
    /// Prepended to every logical key
    prefix: String,
    /// Envelope <-> raw translation
    pipeline: Pipeline,
    /// TTL in seconds for writes that don't specify one
    default_ttl: Option<u64>,
    clock: Arc<dyn Clock>,
    stats: CacheStats,
}

impl<B: Backend> CacheEngine<B> {
    // == Constructors ==
    /// Creates an engine that stores JSON text in `backend`.
    pub fn new(backend: B) -> Self {
        Self::with_pipeline(backend, Pipeline::json())
    }

    pub fn with_pipeline(backend: B, pipeline: Pipeline) -> Self {
        Self {
            backend,
            prefix: String::new(),
            pipeline,
            default_ttl: None,
            clock: Arc::new(SystemClock),
            stats: CacheStats::new(),
        }
    }

    /// Creates an engine whose entries pass through the given encryption hooks.
    pub fn encrypted(backend: B, encryption: Encryption) -> Self {
        Self::with_pipeline(backend, Pipeline::encrypted(encryption))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_default_ttl(mut self, expires_after: Option<u64>) -> Self {
        self.default_ttl = expires_after;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // == Accessors ==
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn default_ttl(&self) -> Option<u64> {
        self.default_ttl
    }

    /// Returns the physical key for a logical one.
    pub fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Clear Backend ==
    /// Erases every entry in the backend, including other prefixes.
    pub fn clear_backend(&mut self) -> Result<()> {
        debug!(backend = self.backend.name(), "clearing entire backend");
        self.backend.clear()
    }

    fn erase_physical(&mut self, physical: &str) -> Result<()> {
        self.backend.erase_raw(physical)
    }
}

impl CacheEngine<MemoryBackend> {
    /// A volatile in-process engine that stores envelopes without serialization.
    pub fn runtime() -> Self {
        Self::with_pipeline(MemoryBackend::new(), Pipeline::identity())
    }
}

impl<B: Backend> Driver for CacheEngine<B> {
    fn name(&self) -> &'static str {
        self.backend.name()
    }

    // == Set ==
    fn set(&mut self, key: &str, value: Value, expires_after: Option<u64>) -> Result<()> {
        let ttl = expires_after.or(self.default_ttl);
        let envelope = Envelope::new(value, ttl, self.clock.now_ms());
        let raw = self.pipeline.convert(&envelope)?;
        let physical = self.key(key);

        self.backend.store_raw(&physical, raw)?;
        self.stats.record_write();

        debug!(key = %physical, expires_at = ?envelope.expires_at, "cache set");
        Ok(())
    }

    // == Get ==
    fn get(&mut self, key: &str, default: Value) -> Result<Value> {
        let physical = self.key(key);

        let Some(raw) = self.backend.retrieve_raw(&physical)? else {
            self.stats.record_miss();
            debug!(key = %physical, "cache miss");
            return Ok(default);
        };

        let envelope = match self.pipeline.parse(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(key = %physical, error = %err, "erasing unreadable cache entry");
                self.erase_physical(&physical)?;
                self.stats.record_heal();
                return Ok(default);
            }
        };

        if envelope.is_expired_at(self.clock.now_ms()) {
            debug!(key = %physical, "cache entry expired");
            self.erase_physical(&physical)?;
            self.stats.record_expiration();
            return Ok(default);
        }

        self.stats.record_hit();
        Ok(envelope.data)
    }

    fn has(&self, key: &str) -> Result<bool> {
        self.backend.contains_raw(&self.key(key))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let physical = self.key(key);
        self.erase_physical(&physical)
    }

    // == Clear ==
    /// Erases the entries under the active prefix. Without a prefix, the whole
    /// backend is cleared.
    ///
    /// Keys are matched with `starts_with`, so clearing `app:` also erases the
    /// entries of an engine prefixed `app:v2:` on the same backend.
    fn clear(&mut self) -> Result<()> {
        if self.prefix.is_empty() {
            return self.clear_backend();
        }

        let owned: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&self.prefix))
            .collect();

        debug!(prefix = %self.prefix, count = owned.len(), "clearing prefixed entries");
        for key in owned {
            self.backend.erase_raw(&key)?;
        }
        Ok(())
    }

    fn set_prefix_key(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    fn prefix_key(&self) -> &str {
        &self.prefix
    }

    fn set_value_parser(&mut self, parse: ParseFn) {
        self.pipeline.set_parse(parse);
    }

    fn set_value_converter(&mut self, convert: ConvertFn) {
        self.pipeline.set_convert(convert);
    }

    fn set_default_ttl(&mut self, expires_after: Option<u64>) {
        self.default_ttl = expires_after;
    }

    fn set_encryption(&mut self, encryption: Encryption) {
        self.pipeline = Pipeline::encrypted(encryption);
    }

    fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

impl<B: Backend> fmt::Debug for CacheEngine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("backend", &self.backend.name())
            .field("prefix", &self.prefix)
            .field("default_ttl", &self.default_ttl)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
