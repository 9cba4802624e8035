//! Envelope Module
//!
//! Defines the unit persisted per key: the caller's payload plus an optional expiry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Envelope ==
/// A cached payload with its absolute expiration instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The caller-supplied payload
    pub data: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<i64>,
}

impl Envelope {
    // == Constructor ==
    /// Creates an envelope expiring `ttl_seconds` after `now_ms`.
    ///
    /// A TTL of `None` or `Some(0)` produces a permanent entry. Zero is
    /// deliberately "never expires", not "expire immediately".
    pub fn new(data: Value, ttl_seconds: Option<u64>, now_ms: i64) -> Self {
        let expires_at = ttl_seconds
            .filter(|ttl| *ttl != 0)
            .map(|ttl| now_ms.saturating_add(ttl_to_ms(ttl)));

        Self { data, expires_at }
    }

    /// Creates an envelope that never expires.
    pub fn permanent(data: Value) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry stays live through its expiry instant and is expired only
    /// once the current time is strictly past it.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(expires) => expires < now_ms,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> Option<u64> {
        self.expires_at
            .map(|expires| u64::try_from(expires.saturating_sub(now_ms)).unwrap_or(0))
    }
}

fn ttl_to_ms(ttl_seconds: u64) -> i64 {
    i64::try_from(ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX)
}
