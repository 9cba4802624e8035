//! Process-wide Cache
//!
//! A single [`CacheContext`] shared by the whole process. It starts empty;
//! call [`init`] once at startup and [`reset`] between tests that use it.

use std::sync::{LazyLock, Mutex, PoisonError};

use tracing::info;

use crate::config::{CacheConfig, CacheSettings, ConfigKey, ConfigOption};
use crate::context::CacheContext;

static CONTEXT: LazyLock<Mutex<CacheContext>> = LazyLock::new(Mutex::default);

/// Runs `f` with exclusive access to the process-wide context.
///
/// Calls must not nest: `f` must not call back into this module.
pub fn with_cache<R>(f: impl FnOnce(&mut CacheContext) -> R) -> R {
    let mut context = CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut context)
}

/// Replaces the process-wide context with a fresh one configured by `config`.
pub fn init(config: CacheConfig) {
    let context = CacheContext::with_config(config);
    with_cache(|current| *current = context);
}

/// Drops the active driver and all stored options.
pub fn reset() {
    with_cache(|current| *current = CacheContext::new());
    info!("process-wide cache reset");
}

pub fn set_cache_configurations(config: CacheConfig) {
    with_cache(|context| context.set_cache_configurations(config));
}

pub fn cache_configurations() -> CacheSettings {
    with_cache(|context| context.cache_configurations().clone())
}

pub fn cache_config(key: ConfigKey) -> Option<ConfigOption> {
    with_cache(|context| context.cache_config(key))
}
