//! Integration Tests for the Cache Facade
//!
//! Drives the public API end to end: configuration, the manager, engines over
//! shared backends and the process-wide instance.

use std::sync::Once;
use std::time::Duration;

use kv_cache::{
    global, Backend, CacheConfig, CacheContext, CacheEngine, CacheError, ConfigKey,
    ConfigOption, Driver, Encryption, ManualClock, MemoryBackend, Pipeline, RawValue,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

// == Helper Functions ==

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| "kv_cache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn runtime_context(clock: &ManualClock) -> CacheContext {
    CacheContext::with_config(
        CacheConfig::new().with_driver(CacheEngine::runtime().with_clock(clock.clone())),
    )
}

fn reversing_cipher() -> Encryption {
    Encryption::new(
        |plain| Ok(plain.chars().rev().collect()),
        |cipher| Ok(cipher.chars().rev().collect()),
    )
}

// == Expiration Scenarios ==

#[test]
fn test_volatile_driver_ttl_scenario() {
    init_tracing();
    let clock = ManualClock::new(1_000_000);
    let mut context = runtime_context(&clock);
    let cache = context.manager_mut();

    cache.set("x", json!(42), Some(1)).unwrap();
    assert_eq!(cache.get_or_null("x").unwrap(), json!(42));

    clock.advance(Duration::from_millis(1_500));

    assert_eq!(cache.get("x", json!(-1)).unwrap(), json!(-1));
}

#[test]
fn test_presence_is_not_freshness() {
    init_tracing();
    let clock = ManualClock::new(0);
    let mut context = runtime_context(&clock);
    let cache = context.manager_mut();

    cache.set("k", json!("v"), Some(1)).unwrap();
    clock.advance(Duration::from_secs(2));

    assert!(cache.has("k").unwrap());
    assert_eq!(cache.get("k", json!("gone")).unwrap(), json!("gone"));
    assert!(!cache.has("k").unwrap());
}

#[test]
fn test_configured_default_ttl_and_permanent_override() {
    init_tracing();
    let clock = ManualClock::new(0);
    let mut context = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(MemoryBackend::new()).with_clock(clock.clone()))
            .with_expires_after(10),
    );
    let cache = context.manager_mut();

    cache.set("defaulted", json!(1), None).unwrap();
    cache.set("permanent", json!(2), Some(0)).unwrap();
    clock.advance(Duration::from_secs(3600));

    assert_eq!(cache.get_or_null("defaulted").unwrap(), Value::Null);
    assert_eq!(cache.get_or_null("permanent").unwrap(), json!(2));
}

// == Pipeline Scenarios ==

#[test]
fn test_pipeline_swap_scenario() {
    init_tracing();
    let mut context = CacheContext::with_config(
        CacheConfig::new().with_driver(CacheEngine::new(MemoryBackend::new())),
    );
    let cache = context.manager_mut();

    cache.set("y", json!({"n": 1}), None).unwrap();

    let identity = Pipeline::identity();
    cache.set_value_converter(identity.convert_fn()).unwrap();
    cache.set_value_parser(identity.parse_fn()).unwrap();
    cache.set("z", json!({"n": 2}), None).unwrap();

    assert_eq!(cache.get_or_null("z").unwrap(), json!({"n": 2}));
    // "y" is JSON text the identity parser cannot read, so it heals to a miss
    assert_eq!(cache.get("y", json!("miss")).unwrap(), json!("miss"));
    assert!(!cache.has("y").unwrap());
    assert_eq!(cache.stats().unwrap().healed, 1);
}

#[test]
fn test_corrupted_storage_self_heals() {
    init_tracing();
    let mut backend = MemoryBackend::new();
    let mut context = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(backend.clone()))
            .with_prefix("app:"),
    );

    backend
        .store_raw("app:broken", RawValue::from("\u{0}\u{1}not an envelope"))
        .unwrap();
    let cache = context.manager_mut();

    assert!(cache.has("broken").unwrap());
    assert_eq!(cache.get("broken", json!("d")).unwrap(), json!("d"));
    assert!(!cache.has("broken").unwrap());
}

#[test]
fn test_encrypted_driver_via_configuration() {
    init_tracing();
    let backend = MemoryBackend::new();
    let mut context = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(backend.clone()))
            .with_encryption(reversing_cipher()),
    );
    let cache = context.manager_mut();

    cache.set("token", json!("abc123"), None).unwrap();

    let stored = backend.retrieve_raw("token").unwrap().unwrap();
    assert!(!stored.as_text().unwrap().contains("\"data\""));
    assert_eq!(cache.get_or_null("token").unwrap(), json!("abc123"));
}

#[test]
fn test_wrong_key_reads_as_miss() {
    init_tracing();
    let backend = MemoryBackend::new();
    let mut writer = CacheEngine::encrypted(backend.clone(), reversing_cipher());
    let mut context = CacheContext::with_config(
        CacheConfig::new().with_driver(CacheEngine::encrypted(
            backend,
            Encryption::new(
                |plain| Ok(plain.to_string()),
                |_| Err(anyhow::anyhow!("wrong key")),
            ),
        )),
    );

    writer.set("s", json!(1), None).unwrap();

    assert_eq!(context.manager_mut().get("s", json!(0)).unwrap(), json!(0));
}

// == Prefix Scenarios ==

#[test]
fn test_prefix_isolation_on_shared_backend() {
    init_tracing();
    let backend = MemoryBackend::new();
    let mut a = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(backend.clone()))
            .with_prefix("a:"),
    );
    let mut b = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(backend.clone()))
            .with_prefix("b:"),
    );

    a.manager_mut().set("k", json!("from a"), None).unwrap();

    assert!(!b.manager().has("k").unwrap());
    assert_eq!(b.manager_mut().get_or_null("k").unwrap(), Value::Null);

    b.manager_mut().set("k", json!("from b"), None).unwrap();
    a.manager_mut().clear().unwrap();

    assert!(!a.manager().has("k").unwrap());
    assert_eq!(b.manager_mut().get_or_null("k").unwrap(), json!("from b"));
}

#[test]
fn test_prefix_change_orphans_entries() {
    init_tracing();
    let backend = MemoryBackend::new();
    let mut context = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(backend.clone()))
            .with_prefix("v1:"),
    );

    context.manager_mut().set("k", json!(1), None).unwrap();
    context.set_cache_configurations(CacheConfig::new().with_prefix("v2:"));

    assert!(!context.manager().has("k").unwrap());
    assert!(backend.contains_raw("v1:k").unwrap());
    assert!(matches!(
        context.cache_config(ConfigKey::Prefix),
        Some(ConfigOption::Prefix(prefix)) if prefix == "v2:"
    ));
}

// == Manager Scenarios ==

#[test]
fn test_missing_driver_is_an_error() {
    init_tracing();
    let mut context = CacheContext::new();

    let err = context.manager_mut().get("k", json!(0)).unwrap_err();

    assert!(matches!(err, CacheError::NoDriver));
}

#[test]
fn test_hot_swap_through_configuration() {
    init_tracing();
    let persistent = MemoryBackend::new();
    let mut context = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::new(persistent.clone()))
            .with_prefix("app:"),
    );
    context.manager_mut().set("k", json!("kept"), None).unwrap();

    context.set_cache_configurations(CacheConfig::new().with_driver(CacheEngine::runtime()));
    assert!(!context.manager().has("k").unwrap());
    assert_eq!(context.manager().prefix_key().unwrap(), "");

    context.set_cache_configurations(
        CacheConfig::new()
            .with_driver(CacheEngine::new(persistent))
            .with_prefix("app:"),
    );
    assert_eq!(context.manager_mut().get_or_null("k").unwrap(), json!("kept"));
}

#[test]
fn test_swapped_driver_round_trips_after_pipeline_override() {
    init_tracing();
    let identity = Pipeline::identity();
    let mut context = CacheContext::with_config(
        CacheConfig::new()
            .with_driver(CacheEngine::runtime())
            .with_value_converter(identity.convert_fn())
            .with_value_parser(identity.parse_fn()),
    );

    context.set_cache_configurations(
        CacheConfig::new().with_driver(CacheEngine::new(MemoryBackend::new())),
    );
    let cache = context.manager_mut();
    cache.set("k", json!({"n": 1}), None).unwrap();

    assert_eq!(cache.get("k", json!("MISS")).unwrap(), json!({"n": 1}));
}

#[test]
fn test_process_wide_instance() {
    init_tracing();
    global::init(
        CacheConfig::new()
            .with_driver(CacheEngine::runtime())
            .with_prefix("proc:"),
    );

    global::with_cache(|cache| cache.manager_mut().set("k", json!(7), None)).unwrap();
    let value = global::with_cache(|cache| cache.manager_mut().get_or_null("k")).unwrap();
    assert_eq!(value, json!(7));

    global::reset();
    let result = global::with_cache(|cache| cache.manager_mut().get_or_null("k"));
    assert!(matches!(result, Err(CacheError::NoDriver)));
}
