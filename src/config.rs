//! Configuration Module
//!
//! Option sets consumed by the cache: [`CacheConfig`] is one configuration call
//! (it may carry a driver), [`CacheSettings`] is the merged state left behind.

use std::env;
use std::fmt;

use crate::cache::{ConvertFn, Driver, Encryption, ParseFn};
use crate::error::{CacheError, Result};

/// Environment variable holding the key prefix
pub const PREFIX_ENV: &str = "CACHE_PREFIX";

/// Environment variable holding the default TTL in seconds (`0` = never expire)
pub const EXPIRES_AFTER_ENV: &str = "CACHE_EXPIRES_AFTER";

// == Cache Settings ==
/// Every recognized option except the driver itself, which the manager owns.
///
/// Each field is `None` until some configuration call sets it.
#[derive(Clone, Default)]
pub struct CacheSettings {
    /// Name of the last driver installed through configuration
    pub driver_name: Option<&'static str>,
    /// Prepended to every logical key
    pub prefix: Option<String>,
    /// Default TTL in seconds for writes that don't specify one
    pub expires_after: Option<u64>,
    pub value_parser: Option<ParseFn>,
    pub value_converter: Option<ConvertFn>,
    /// Hooks for encrypting drivers
    pub encryption: Option<Encryption>,
}

impl CacheSettings {
    /// Shallow merge: options set in `other` replace ours, the rest are kept.
    pub fn merge(&mut self, other: CacheSettings) {
        if other.driver_name.is_some() {
            self.driver_name = other.driver_name;
        }
        if other.prefix.is_some() {
            self.prefix = other.prefix;
        }
        if other.expires_after.is_some() {
            self.expires_after = other.expires_after;
        }
        if other.value_parser.is_some() {
            self.value_parser = other.value_parser;
        }
        if other.value_converter.is_some() {
            self.value_converter = other.value_converter;
        }
        if other.encryption.is_some() {
            self.encryption = other.encryption;
        }
    }

    /// Pushes every present option into `driver`.
    ///
    /// Encryption is applied after the parser and converter, so it replaces them.
    /// An empty prefix is treated as absent and leaves the driver's prefix alone.
    pub fn apply_to(&self, driver: &mut dyn Driver) {
        if let Some(parse) = &self.value_parser {
            driver.set_value_parser(parse.clone());
        }
        if let Some(convert) = &self.value_converter {
            driver.set_value_converter(convert.clone());
        }
        if let Some(encryption) = &self.encryption {
            driver.set_encryption(encryption.clone());
        }
        if let Some(prefix) = self.prefix.as_deref().filter(|prefix| !prefix.is_empty()) {
            driver.set_prefix_key(prefix);
        }
        if self.expires_after.is_some() {
            driver.set_default_ttl(self.expires_after);
        }
    }

    /// Looks up a single option.
    pub fn option(&self, key: ConfigKey) -> Option<ConfigOption> {
        match key {
            ConfigKey::Driver => self.driver_name.map(ConfigOption::Driver),
            ConfigKey::Prefix => self.prefix.clone().map(ConfigOption::Prefix),
            ConfigKey::ExpiresAfter => self.expires_after.map(ConfigOption::ExpiresAfter),
            ConfigKey::ValueParser => self.value_parser.clone().map(ConfigOption::ValueParser),
            ConfigKey::ValueConverter => {
                self.value_converter.clone().map(ConfigOption::ValueConverter)
            }
            ConfigKey::Encryption => self.encryption.clone().map(ConfigOption::Encryption),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.driver_name.is_none()
            && self.prefix.is_none()
            && self.expires_after.is_none()
            && self.value_parser.is_none()
            && self.value_converter.is_none()
            && self.encryption.is_none()
    }
}

impl fmt::Debug for CacheSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSettings")
            .field("driver_name", &self.driver_name)
            .field("prefix", &self.prefix)
            .field("expires_after", &self.expires_after)
            .field("value_parser", &self.value_parser.is_some())
            .field("value_converter", &self.value_converter.is_some())
            .field("encryption", &self.encryption.is_some())
            .finish()
    }
}

// == Option Lookup ==
/// Names of the recognized options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Driver,
    Prefix,
    ExpiresAfter,
    ValueParser,
    ValueConverter,
    Encryption,
}

/// A single option value.
#[derive(Clone)]
pub enum ConfigOption {
    Driver(&'static str),
    Prefix(String),
    ExpiresAfter(u64),
    ValueParser(ParseFn),
    ValueConverter(ConvertFn),
    Encryption(Encryption),
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOption::Driver(name) => f.debug_tuple("Driver").field(name).finish(),
            ConfigOption::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            ConfigOption::ExpiresAfter(ttl) => f.debug_tuple("ExpiresAfter").field(ttl).finish(),
            ConfigOption::ValueParser(_) => f.write_str("ValueParser(..)"),
            ConfigOption::ValueConverter(_) => f.write_str("ValueConverter(..)"),
            ConfigOption::Encryption(_) => f.write_str("Encryption(..)"),
        }
    }
}

// == Cache Config ==
/// One configuration call: an optional driver plus option deltas.
#[derive(Default)]
pub struct CacheConfig {
    pub driver: Option<Box<dyn Driver>>,
    pub settings: CacheSettings,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Key prefix (default: unset)
    /// - `CACHE_EXPIRES_AFTER` - Default TTL in seconds (default: unset, entries never expire)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads options through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(prefix) = lookup(PREFIX_ENV) {
            config = config.with_prefix(prefix);
        }

        if let Some(raw) = lookup(EXPIRES_AFTER_ENV) {
            let ttl = raw.trim().parse::<u64>().map_err(|err| {
                CacheError::InvalidConfig(format!("{EXPIRES_AFTER_ENV}={raw:?}: {err}"))
            })?;
            config = config.with_expires_after(ttl);
        }

        Ok(config)
    }

    pub fn with_driver(mut self, driver: impl Driver + 'static) -> Self {
        self.driver = Some(Box::new(driver));
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.prefix = Some(prefix.into());
        self
    }

    pub fn with_expires_after(mut self, seconds: u64) -> Self {
        self.settings.expires_after = Some(seconds);
        self
    }

    pub fn with_value_parser(mut self, parse: ParseFn) -> Self {
        self.settings.value_parser = Some(parse);
        self
    }

    pub fn with_value_converter(mut self, convert: ConvertFn) -> Self {
        self.settings.value_converter = Some(convert);
        self
    }

    pub fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.settings.encryption = Some(encryption);
        self
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("driver", &self.driver.as_ref().map(|driver| driver.name()))
            .field("settings", &self.settings)
            .finish()
    }
}
