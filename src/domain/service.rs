// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property resolution trait definition.
//!
//! `ConfigurationService` is what application code reads properties through. It
//! hides how many property sources exist and whether they are refreshed live.

use crate::domain::{ConfigKey, ConfigValue, Result};

/// Resolves properties across all registered property sources.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::domain::{ConfigError, ConfigKey, ConfigValue, ConfigurationService, Result};
///
/// struct Fixed;
///
/// impl ConfigurationService for Fixed {
///     fn get(&self, key: &ConfigKey) -> Result<ConfigValue> {
///         match key.as_str() {
///             "my.name" => Ok(ConfigValue::from("microsphere")),
///             other => Err(ConfigError::PropertyNotFound { key: other.to_string() }),
///         }
///     }
/// }
///
/// let service = Fixed;
/// assert_eq!(service.get_str("my.name").unwrap().as_str(), "microsphere");
/// assert!(!service.has(&ConfigKey::from("my.age")));
/// assert_eq!(service.get_or_default(&ConfigKey::from("my.age"), "18").as_str(), "18");
/// ```
pub trait ConfigurationService {
    /// Retrieves the value of a property from the highest priority source that has it.
    ///
    /// # Returns
    ///
    /// * `Ok(ConfigValue)` - The property value
    /// * `Err(ConfigError::PropertyNotFound)` - No source defines the property
    fn get(&self, key: &ConfigKey) -> Result<ConfigValue>;

    /// Retrieves a property or falls back to `default`.
    fn get_or_default(&self, key: &ConfigKey, default: &str) -> ConfigValue {
        self.get(key).unwrap_or_else(|_| ConfigValue::from(default))
    }

    /// Checks whether any source defines the property.
    fn has(&self, key: &ConfigKey) -> bool {
        self.get(key).is_ok()
    }

    /// Convenience wrapper around [`get`](Self::get) taking a string key.
    fn get_str(&self, key: &str) -> Result<ConfigValue> {
        self.get(&ConfigKey::from(key))
    }
}
