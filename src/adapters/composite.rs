// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composite property source.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::PropertySource;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// An ordered group of property sources exposed under one name.
///
/// Members are queried in order and the first one defining a property wins. The
/// member list can be changed through a shared reference, which is how a refresh
/// running on a notification thread swaps in re-parsed content.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::{CompositePropertySource, ResourcePropertySource};
/// use nacoscfg::ports::PropertySource;
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// let composite = CompositePropertySource::new("nacos", 1);
/// let mut values = HashMap::new();
/// values.insert("my.name".to_string(), "microsphere".to_string());
/// composite.add(Arc::new(ResourcePropertySource::from_values("test.json", 1, values)));
///
/// assert_eq!(composite.get_str("my.name").unwrap().unwrap().as_str(), "microsphere");
/// assert_eq!(composite.member_names(), vec!["test.json".to_string()]);
/// ```
pub struct CompositePropertySource {
    name: String,
    priority: u8,
    members: RwLock<Vec<Arc<dyn PropertySource>>>,
}

impl CompositePropertySource {
    /// Creates an empty composite.
    pub fn new(name: impl Into<String>, priority: u8) -> Self {
        Self {
            name: name.into(),
            priority,
            members: RwLock::new(Vec::new()),
        }
    }

    /// Appends a member.
    pub fn add(&self, member: Arc<dyn PropertySource>) {
        if let Ok(mut members) = self.members.write() {
            members.push(member);
        }
    }

    /// Replaces the member with the same name in place, or appends it.
    ///
    /// Returns `true` when an existing member was replaced.
    pub fn replace_or_add(&self, member: Arc<dyn PropertySource>) -> bool {
        let Ok(mut members) = self.members.write() else {
            return false;
        };
        match members.iter().position(|m| m.name() == member.name()) {
            Some(idx) => {
                members[idx] = member;
                true
            }
            None => {
                members.push(member);
                false
            }
        }
    }

    /// Names of the members in lookup order.
    pub fn member_names(&self) -> Vec<String> {
        self.members
            .read()
            .map(|members| members.iter().map(|m| m.name().to_string()).collect())
            .unwrap_or_default()
    }

    fn snapshot(&self) -> Vec<Arc<dyn PropertySource>> {
        self.members
            .read()
            .map(|members| members.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for CompositePropertySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositePropertySource")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("members", &self.member_names())
            .finish()
    }
}

impl PropertySource for CompositePropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        for member in self.snapshot() {
            if let Some(value) = member.get(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        let mut keys = BTreeSet::new();
        for member in self.snapshot() {
            keys.extend(member.all_keys()?);
        }
        Ok(keys.into_iter().collect())
    }
}
