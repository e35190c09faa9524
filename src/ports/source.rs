// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property source trait definition.
//!
//! A property source is one layer of flat key/value properties. The environment
//! queries its property sources in priority order; remote resources become
//! property sources once parsed.

use crate::domain::{ConfigKey, ConfigValue, Result};

/// A layer of properties.
///
/// # Priority
///
/// Higher priority values take precedence. Sources with equal priority keep the
/// order in which they were added to the environment.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::domain::{ConfigKey, ConfigValue, Result};
/// use nacoscfg::ports::PropertySource;
///
/// struct Defaults;
///
/// impl PropertySource for Defaults {
///     fn name(&self) -> &str {
///         "defaults"
///     }
///
///     fn priority(&self) -> u8 {
///         0
///     }
///
///     fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
///         Ok((key.as_str() == "my.name").then(|| ConfigValue::from("anonymous")))
///     }
///
///     fn all_keys(&self) -> Result<Vec<ConfigKey>> {
///         Ok(vec![ConfigKey::from("my.name")])
///     }
/// }
///
/// assert_eq!(Defaults.get_str("my.name").unwrap().unwrap().as_str(), "anonymous");
/// ```
pub trait PropertySource: Send + Sync {
    /// The name of this property source, used for replacement and logging.
    fn name(&self) -> &str;

    /// The precedence of this property source.
    fn priority(&self) -> u8;

    /// Looks up one property.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ConfigValue))` - The property is defined here
    /// * `Ok(None)` - The property is not defined here
    /// * `Err(ConfigError)` - The lookup failed
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>>;

    /// Lists every property defined by this source.
    fn all_keys(&self) -> Result<Vec<ConfigKey>>;

    /// Looks up one property by string key.
    fn get_str(&self, key: &str) -> Result<Option<ConfigValue>> {
        self.get(&ConfigKey::from(key))
    }
}
