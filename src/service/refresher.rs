// SPDX-License-Identifier: MIT OR Apache-2.0

//! Refresher that re-parses pushed resources into a composite property source.

use crate::adapters::{parser_for, CompositePropertySource, ResourcePropertySource};
use crate::domain::{Resource, Result};
use crate::ports::{PropertySource, PropertySourcesRefresher};
use crate::service::Environment;
use std::sync::Arc;

/// Replaces members of a [`CompositePropertySource`] when their resource changes.
///
/// The member named after the changed data id is rebuilt with the parser for that
/// data id and swapped in at the same position, then the environment cache is
/// dropped so readers see the new values.
pub struct ResourcePropertySourcesRefresher {
    composite: Arc<CompositePropertySource>,
    environment: Environment,
    priority: u8,
}

impl ResourcePropertySourcesRefresher {
    /// Creates a refresher for `composite`, registered in `environment`.
    pub fn new(composite: Arc<CompositePropertySource>, environment: Environment, priority: u8) -> Self {
        Self {
            composite,
            environment,
            priority,
        }
    }
}

impl PropertySourcesRefresher for ResourcePropertySourcesRefresher {
    fn refresh(&self, name: &str, resource: Resource) -> Result<()> {
        let parser = parser_for(name);
        let member = ResourcePropertySource::from_resource(name, self.priority, &resource, parser.as_ref())?;
        let properties = member.len();

        let replaced = self.composite.replace_or_add(Arc::new(member));
        self.environment.invalidate_cache();

        tracing::info!(
            "Refreshed '{}' in property source '{}' ({} propert(ies), {})",
            name,
            self.composite.name(),
            properties,
            if replaced { "replaced" } else { "added" }
        );
        Ok(())
    }
}
