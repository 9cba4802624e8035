//! Cache Manager
//!
//! A stable handle that forwards every operation to whichever driver is
//! currently installed. The driver can be swapped at any time.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheStats, ConvertFn, Driver, ParseFn};
use crate::error::{CacheError, Result};

// == Cache Manager ==
/// Facade over the active [`Driver`].
///
/// Every delegating method fails with [`CacheError::NoDriver`] until a driver
/// is installed.
#[derive(Default)]
pub struct CacheManager {
    driver: Option<Box<dyn Driver>>,
}

impl CacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    // == Driver Swap ==
    /// Installs `driver`, dropping the previous one. Data held by the old
    /// driver is neither migrated nor cleaned up.
    pub fn set_driver(&mut self, driver: Box<dyn Driver>) {
        let previous = self.driver.as_ref().map(|old| old.name());
        info!(from = ?previous, to = driver.name(), "cache driver installed");
        self.driver = Some(driver);
    }

    pub fn driver(&self) -> Result<&dyn Driver> {
        self.driver.as_deref().ok_or(CacheError::NoDriver)
    }

    pub fn driver_mut(&mut self) -> Result<&mut dyn Driver> {
        match self.driver.as_deref_mut() {
            Some(driver) => Ok(driver),
            None => Err(CacheError::NoDriver),
        }
    }

    /// Removes and returns the active driver.
    pub fn take_driver(&mut self) -> Option<Box<dyn Driver>> {
        self.driver.take()
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    // == Delegation ==
    pub fn set(&mut self, key: &str, value: Value, expires_after: Option<u64>) -> Result<()> {
        self.driver_mut()?.set(key, value, expires_after)
    }

    pub fn get(&mut self, key: &str, default: Value) -> Result<Value> {
        self.driver_mut()?.get(key, default)
    }

    /// Same as [`get`](Self::get) with a `null` default.
    pub fn get_or_null(&mut self, key: &str) -> Result<Value> {
        self.get(key, Value::Null)
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        self.driver()?.has(key)
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.driver_mut()?.remove(key)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.driver_mut()?.clear()
    }

    pub fn set_prefix_key(&mut self, prefix: &str) -> Result<()> {
        self.driver_mut()?.set_prefix_key(prefix);
        Ok(())
    }

    pub fn prefix_key(&self) -> Result<&str> {
        Ok(self.driver()?.prefix_key())
    }

    pub fn set_value_parser(&mut self, parse: ParseFn) -> Result<()> {
        self.driver_mut()?.set_value_parser(parse);
        Ok(())
    }

    pub fn set_value_converter(&mut self, convert: ConvertFn) -> Result<()> {
        self.driver_mut()?.set_value_converter(convert);
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        Ok(self.driver()?.stats())
    }

    // == Typed Helpers ==
    /// Serializes `value` to JSON before storing it.
    pub fn set_as<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
        expires_after: Option<u64>,
    ) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value, expires_after)
    }

    /// Reads a value and deserializes it. A missing, expired or `null` entry
    /// yields `None`.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.get_or_null(key)? {
            Value::Null => Ok(None),
            value => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("driver", &self.driver.as_ref().map(|driver| driver.name()))
            .finish()
    }
}
