//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The manager was used before any driver was configured
    #[error("No cache driver configured")]
    NoDriver,

    /// A raw value could not be decoded into an envelope
    #[error("Unparseable cache entry: {0}")]
    Parse(String),

    /// A value could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An encryption hook failed while writing
    #[error("Encryption error: {0}")]
    Encryption(#[source] anyhow::Error),

    /// The underlying storage primitive failed
    #[error("Backend error: {0}")]
    Backend(#[source] anyhow::Error),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Wraps any backend failure so it reaches the caller unchanged.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        CacheError::Backend(err.into())
    }

    /// Returns true for errors the engine recovers from by treating the entry as a miss.
    pub fn is_corrupt_entry(&self) -> bool {
        matches!(self, CacheError::Parse(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
