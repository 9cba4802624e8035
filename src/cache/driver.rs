//! Driver Module
//!
//! The contract every engine behind the [`CacheManager`](crate::CacheManager) satisfies.

use serde_json::Value;

use crate::cache::{CacheStats, ConvertFn, Encryption, ParseFn};
use crate::error::Result;

/// Operations on logical keys. Every key is implicitly prefixed by the driver.
pub trait Driver: Send {
    /// A short name for logging and configuration, e.g. "memory".
    fn name(&self) -> &'static str;

    /// Stores `value`, expiring after `expires_after` seconds.
    ///
    /// `None` falls back to the driver's default TTL. A TTL of zero never expires.
    fn set(&mut self, key: &str, value: Value, expires_after: Option<u64>) -> Result<()>;

    /// Returns the live value for `key`, or `default` when it is absent,
    /// expired or unreadable.
    fn get(&mut self, key: &str, default: Value) -> Result<Value>;

    /// Reports whether the key is stored, regardless of expiration.
    fn has(&self, key: &str) -> Result<bool>;

    /// Deletes the key. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Deletes the entries owned by this driver.
    ///
    /// Ownership is decided by raw key prefix, so a driver prefixed `app:`
    /// also clears the entries of one prefixed `app:v2:` on the same storage.
    fn clear(&mut self) -> Result<()>;

    // == Prefix ==
    /// Changes the key prefix. Entries under the old prefix are left in place.
    fn set_prefix_key(&mut self, prefix: &str);

    fn prefix_key(&self) -> &str;

    // == Pipeline ==
    /// Replaces the raw -> envelope half of the pipeline.
    fn set_value_parser(&mut self, parse: ParseFn);

    /// Replaces the envelope -> raw half of the pipeline.
    fn set_value_converter(&mut self, convert: ConvertFn);

    /// Sets the TTL used when `set` is called without one.
    fn set_default_ttl(&mut self, expires_after: Option<u64>);

    /// Replaces the pipeline with JSON wrapped in the given hooks.
    fn set_encryption(&mut self, encryption: Encryption);

    /// Snapshot of the operation counters.
    fn stats(&self) -> CacheStats;
}
