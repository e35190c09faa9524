// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property resolution across registered property sources.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, ConfigurationService, Result};
use crate::ports::PropertySource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// The application's view of all property sources.
///
/// Sources are queried from the highest priority down and the first value found
/// is returned; sources with equal priority keep their registration order.
/// Clones share sources and cache, so a refresh running on a client's
/// notification thread is visible to every reader.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::ResourcePropertySource;
/// use nacoscfg::domain::ConfigurationService;
/// use nacoscfg::service::Environment;
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// let environment = Environment::new();
/// let mut values = HashMap::new();
/// values.insert("my.name".to_string(), "microsphere".to_string());
/// environment.add_source(Arc::new(ResourcePropertySource::from_values("defaults", 0, values)));
///
/// assert_eq!(environment.get_str("my.name").unwrap().as_str(), "microsphere");
/// ```
#[derive(Clone, Default)]
pub struct Environment {
    /// Sources in priority order (highest first)
    sources: Arc<RwLock<Vec<Arc<dyn PropertySource>>>>,
    /// Cache for resolved values
    cache: Arc<RwLock<HashMap<String, ConfigValue>>>,
    /// Bumped on every invalidation, under the cache write lock
    generation: Arc<AtomicU64>,
}

impl Environment {
    /// Creates an environment without sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property source.
    pub fn add_source(&self, source: Arc<dyn PropertySource>) {
        tracing::debug!(
            "Adding property source '{}' with priority {}",
            source.name(),
            source.priority()
        );
        if let Ok(mut sources) = self.sources.write() {
            sources.push(source);
            // stable sort keeps registration order among equal priorities
            sources.sort_by_key(|s| std::cmp::Reverse(s.priority()));
        }
        self.invalidate_cache();
    }

    /// Looks up a registered source by name.
    pub fn source(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        self.sources
            .read()
            .ok()?
            .iter()
            .find(|s| s.name() == name)
            .cloned()
    }

    /// Names of the registered sources in lookup order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .read()
            .map(|sources| sources.iter().map(|s| s.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Drops every cached value so the next lookups see current source content.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            cache.clear();
        }
    }

    fn query_sources(&self, key: &ConfigKey) -> Option<ConfigValue> {
        let sources = self.sources.read().ok()?.clone();
        for source in sources {
            match source.get(key) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(
                        "Error querying source '{}' for key '{}': {}",
                        source.name(),
                        key,
                        e
                    );
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl ConfigurationService for Environment {
    fn get(&self, key: &ConfigKey) -> Result<ConfigValue> {
        if let Ok(cache) = self.cache.read() {
            if let Some(value) = cache.get(key.as_str()) {
                return Ok(value.clone());
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let value = self
            .query_sources(key)
            .ok_or_else(|| ConfigError::PropertyNotFound {
                key: key.as_str().to_string(),
            })?;

        if let Ok(mut cache) = self.cache.write() {
            // an invalidation during the query may have made `value` stale
            if self.generation.load(Ordering::SeqCst) == generation {
                cache.insert(key.as_str().to_string(), value.clone());
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ResourcePropertySource;

    fn source(name: &str, priority: u8, pairs: &[(&str, &str)]) -> Arc<dyn PropertySource> {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(ResourcePropertySource::from_values(name, priority, values))
    }

    #[test]
    fn test_priority_order() {
        let env = Environment::new();
        env.add_source(source("low", 1, &[("key", "low"), ("only.low", "x")]));
        env.add_source(source("high", 3, &[("key", "high")]));

        assert_eq!(env.get_str("key").unwrap().as_str(), "high");
        assert_eq!(env.get_str("only.low").unwrap().as_str(), "x");
        assert_eq!(env.source_names(), vec!["high", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let env = Environment::new();
        env.add_source(source("first", 1, &[("key", "first")]));
        env.add_source(source("second", 1, &[("key", "second")]));
        assert_eq!(env.get_str("key").unwrap().as_str(), "first");
    }

    #[test]
    fn test_missing_property() {
        let env = Environment::new();
        assert!(matches!(
            env.get_str("missing"),
            Err(ConfigError::PropertyNotFound { .. })
        ));
        assert_eq!(
            env.get_or_default(&ConfigKey::from("missing"), "fallback").as_str(),
            "fallback"
        );
        assert!(!env.has(&ConfigKey::from("missing")));
    }

    #[test]
    fn test_clones_share_sources() {
        let env = Environment::new();
        let reader = env.clone();
        env.add_source(source("s", 1, &[("key", "v")]));
        assert_eq!(reader.get_str("key").unwrap().as_str(), "v");
        assert!(reader.source("s").is_some());
    }

    #[test]
    fn test_cache_is_invalidated_by_new_sources() {
        let env = Environment::new();
        env.add_source(source("low", 1, &[("key", "low")]));
        assert_eq!(env.get_str("key").unwrap().as_str(), "low");

        env.add_source(source("high", 2, &[("key", "high")]));
        assert_eq!(env.get_str("key").unwrap().as_str(), "high");
    }
}
