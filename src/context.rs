//! Cache Context
//!
//! Pairs the [`CacheManager`] with the configuration merged across calls. Pass
//! one around explicitly, or use the process-wide instance in [`crate::global`].

use tracing::{debug, info};

use crate::config::{CacheConfig, CacheSettings, ConfigKey, ConfigOption};
use crate::manager::CacheManager;

#[derive(Debug, Default)]
pub struct CacheContext {
    manager: CacheManager,
    settings: CacheSettings,
}

impl CacheContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context and applies `config` to it.
    pub fn with_config(config: CacheConfig) -> Self {
        let mut context = Self::new();
        context.set_cache_configurations(config);
        context
    }

    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut CacheManager {
        &mut self.manager
    }

    // == Configure ==
    /// Applies one configuration call, then merges it over the stored options.
    ///
    /// Only the options present in `config` are pushed into the driver. A
    /// driver installed by this call also picks up the stored default TTL,
    /// since the engine reads it at write time; its own pipeline and prefix
    /// are left alone otherwise. With no driver at all the options are only
    /// stored.
    pub fn set_cache_configurations(&mut self, config: CacheConfig) {
        let CacheConfig {
            driver,
            mut settings,
        } = config;

        if let Some(driver) = &driver {
            settings.driver_name = Some(driver.name());
        }
        let delta = settings.clone();
        self.settings.merge(settings);

        match driver {
            Some(driver) => {
                self.manager.set_driver(driver);
                if let Ok(active) = self.manager.driver_mut() {
                    if self.settings.expires_after.is_some() {
                        active.set_default_ttl(self.settings.expires_after);
                    }
                    delta.apply_to(active);
                }
            }
            None => match self.manager.driver_mut() {
                Ok(active) => delta.apply_to(active),
                Err(_) => debug!("no active cache driver; options stored for the next one"),
            },
        }

        info!(settings = ?self.settings, "cache configuration applied");
    }

    /// Returns the merged options.
    pub fn cache_configurations(&self) -> &CacheSettings {
        &self.settings
    }

    /// Returns one merged option, if set.
    pub fn cache_config(&self, key: ConfigKey) -> Option<ConfigOption> {
        self.settings.option(key)
    }
}
