// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property name newtype.
//!
//! Property names are flat, dot separated paths such as `my.name` or
//! `datasource.pool.size`, produced by flattening the structured content of a
//! remote configuration resource.

use std::fmt;

/// The name of a single property exposed by a property source.
///
/// # Examples
///
/// ```
/// use nacoscfg::domain::ConfigKey;
///
/// let key = ConfigKey::from("my.name");
/// assert_eq!(key.as_str(), "my.name");
/// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["my", "name"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Iterates over the dot separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns a new key with `child` appended as a further segment.
    ///
    /// An empty parent yields the child unchanged, which is how flattening
    /// starts at the document root.
    pub fn child(&self, child: &str) -> ConfigKey {
        if self.0.is_empty() {
            ConfigKey(child.to_string())
        } else {
            ConfigKey(format!("{}.{}", self.0, child))
        }
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
