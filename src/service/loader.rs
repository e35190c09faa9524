// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading remote property sources and keeping them refreshed.
//!
//! [`NacosPropertySourceLoader`] fetches the configured data ids through the
//! client cached in a [`ClientRegistry`] and, when live refresh is enabled, bridges
//! the client's change events into a [`PropertySourcesRefresher`].

use crate::adapters::{parser_for, CompositePropertySource, ResourcePropertySource};
use crate::domain::{ConfigError, ConfigEvent, Resource, Result, SourceAttributes};
use crate::ports::{EventListener, PropertySourcesRefresher};
use crate::service::{ClientRegistry, Environment, ResourcePropertySourcesRefresher};
use std::sync::Arc;

/// Resolves remote resources and wires change notifications for property sources.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::{InMemoryClientFactory, InMemoryConfigServer};
/// use nacoscfg::domain::{ConfigurationService, SourceAttributes};
/// use nacoscfg::service::{ClientRegistry, Environment, NacosPropertySourceLoader};
/// use std::sync::Arc;
///
/// # fn main() -> nacoscfg::domain::Result<()> {
/// let server = InMemoryConfigServer::new();
/// server.publish("DEFAULT_GROUP", "app.properties", "my.name=microsphere");
///
/// let registry = Arc::new(ClientRegistry::new(Arc::new(InMemoryClientFactory::new(server))));
/// let loader = NacosPropertySourceLoader::new(registry.clone());
/// let environment = Environment::new();
///
/// let attributes = SourceAttributes::new("nacos").with_key("app.properties");
/// loader.load(&attributes, &environment)?;
/// assert_eq!(environment.get_str("my.name")?.as_str(), "microsphere");
///
/// registry.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NacosPropertySourceLoader {
    registry: Arc<ClientRegistry>,
}

impl NacosPropertySourceLoader {
    /// Creates a loader resolving clients through `registry`.
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// The registry clients are taken from.
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Fetches `key` and returns it as a single resource named after the key.
    ///
    /// Client failures, including a missing data id, are returned unchanged.
    pub fn resolve_resources(
        &self,
        attributes: &SourceAttributes,
        property_source_name: &str,
        key: &str,
    ) -> Result<Vec<Resource>> {
        let client = self.registry.get_or_create(attributes)?;
        let content = client.get_config_content(key)?;
        tracing::debug!(
            "Resolved '{}' for property source '{}' ({} bytes)",
            key,
            property_source_name,
            content.len()
        );
        Ok(vec![Resource::named(key, content)])
    }

    /// Registers a change listener for every key that forwards created and
    /// modified content to `refresher`.
    ///
    /// A refresh failure is returned to the client as
    /// [`ConfigError::RefreshError`]; the client reports it and keeps delivering.
    pub fn configure_refresher(
        &self,
        attributes: &SourceAttributes,
        keys: &[String],
        refresher: Arc<dyn PropertySourcesRefresher>,
    ) -> Result<()> {
        let client = self.registry.get_or_create(attributes)?;
        for key in keys {
            let refresher = Arc::clone(&refresher);
            let listener: EventListener =
                Arc::new(move |event: ConfigEvent| Self::on_config_changed(event, refresher.as_ref()));
            client.add_event_listener(key, listener)?;
            tracing::debug!(
                "Registered refresh listener for '{}' of property source '{}'",
                key,
                attributes.name
            );
        }
        Ok(())
    }

    fn on_config_changed(event: ConfigEvent, refresher: &dyn PropertySourcesRefresher) -> Result<()> {
        if !event.triggers_refresh() {
            tracing::debug!(
                "Ignoring {} event for '{}'",
                event.kind(),
                event.data_id()
            );
            return Ok(());
        }

        let content = event.content().unwrap_or_default();
        let resource = Resource::from_bytes(content);
        refresher
            .refresh(event.data_id(), resource)
            .map_err(|e| ConfigError::refresh(event.data_id(), e))
    }

    /// Loads every key of `attributes` into one composite property source.
    ///
    /// The composite is named after the source, keeps the keys' order (the first
    /// key wins on conflicting properties) and is added to `environment`. When the
    /// source is auto-refreshed, changes are pushed into the composite.
    pub fn load(
        &self,
        attributes: &SourceAttributes,
        environment: &Environment,
    ) -> Result<Arc<CompositePropertySource>> {
        attributes.validate()?;

        let composite = Arc::new(CompositePropertySource::new(
            attributes.name.clone(),
            attributes.priority,
        ));

        for key in &attributes.keys {
            let parser = parser_for(key);
            for resource in self.resolve_resources(attributes, &attributes.name, key)? {
                let member = ResourcePropertySource::from_resource(
                    key.as_str(),
                    attributes.priority,
                    &resource,
                    parser.as_ref(),
                )?;
                composite.add(Arc::new(member));
            }
        }

        environment.add_source(composite.clone());

        if attributes.auto_refreshed {
            let refresher = ResourcePropertySourcesRefresher::new(
                Arc::clone(&composite),
                environment.clone(),
                attributes.priority,
            );
            self.configure_refresher(attributes, &attributes.keys, Arc::new(refresher))?;
        }

        tracing::info!(
            "Loaded property source '{}' with {} key(s)",
            attributes.name,
            attributes.keys.len()
        );
        Ok(composite)
    }
}
