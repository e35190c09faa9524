// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property sources backed by a parsed resource.

use crate::domain::{ConfigKey, ConfigValue, Resource, Result};
use crate::ports::{ConfigParser, PropertySource};
use std::collections::HashMap;

/// The properties of one resource, parsed once.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::{PropertiesParser, ResourcePropertySource};
/// use nacoscfg::domain::Resource;
/// use nacoscfg::ports::PropertySource;
///
/// let resource = Resource::named("app.properties", "my.name=microsphere");
/// let source =
///     ResourcePropertySource::from_resource("app.properties", 1, &resource, &PropertiesParser::new())
///         .unwrap();
/// assert_eq!(source.get_str("my.name").unwrap().unwrap().as_str(), "microsphere");
/// ```
#[derive(Debug, Clone)]
pub struct ResourcePropertySource {
    name: String,
    priority: u8,
    values: HashMap<String, String>,
}

impl ResourcePropertySource {
    /// Parses `resource` with `parser` into a property source called `name`.
    pub fn from_resource(
        name: impl Into<String>,
        priority: u8,
        resource: &Resource,
        parser: &dyn ConfigParser,
    ) -> Result<Self> {
        let name = name.into();
        let values = parser.parse_resource(resource)?;
        tracing::debug!(
            "Parsed {} propert(ies) for property source '{}' from {}",
            values.len(),
            name,
            resource.description()
        );
        Ok(Self {
            name,
            priority,
            values,
        })
    }

    /// Creates a property source from already flat values.
    pub fn from_values(name: impl Into<String>, priority: u8, values: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            priority,
            values,
        }
    }

    /// Number of properties held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no properties are held.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertySource for ResourcePropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }
}
