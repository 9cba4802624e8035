//! kv_cache - A pluggable key-value cache facade
//!
//! Provides key prefixing, lazy TTL expiration and replaceable value pipelines
//! over any raw storage backend.
//!
//! # Example
//!
//! ```
//! use kv_cache::{CacheConfig, CacheContext, CacheEngine};
//! use serde_json::json;
//!
//! let mut context = CacheContext::with_config(
//!     CacheConfig::new()
//!         .with_driver(CacheEngine::runtime())
//!         .with_prefix("app:")
//!         .with_expires_after(60),
//! );
//!
//! let cache = context.manager_mut();
//! cache.set("user", json!({"name": "Ada"}), None)?;
//! assert_eq!(cache.get_or_null("user")?, json!({"name": "Ada"}));
//! # Ok::<(), kv_cache::CacheError>(())
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod global;
pub mod manager;

pub use cache::{
    Backend, CacheEngine, CacheStats, Clock, ConvertFn, Driver, Encryption, Envelope,
    ManualClock, MemoryBackend, ParseFn, Pipeline, RawValue, SystemClock,
};
pub use config::{CacheConfig, CacheSettings, ConfigKey, ConfigOption};
pub use context::CacheContext;
pub use error::{CacheError, Result};
pub use manager::CacheManager;
