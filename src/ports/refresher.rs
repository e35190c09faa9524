// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property source refresher port.

use crate::domain::{Resource, Result};

/// Recomputes property sources when one of their resources changes.
///
/// The change bridge calls `refresh` from a client's notification thread, so
/// implementations must be safe to call off the startup thread.
///
/// Closures taking `(&str, Resource)` implement this trait:
///
/// ```rust
/// use nacoscfg::domain::{Resource, Result};
/// use nacoscfg::ports::PropertySourcesRefresher;
///
/// let refresher = |name: &str, resource: Resource| -> Result<()> {
///     println!("{} now has {} bytes", name, resource.len());
///     Ok(())
/// };
/// refresher.refresh("test.json", Resource::from_bytes("{}")).unwrap();
/// ```
pub trait PropertySourcesRefresher: Send + Sync {
    /// Replaces the property source built from `name` with one built from `resource`.
    fn refresh(&self, name: &str, resource: Resource) -> Result<()>;
}

impl<F> PropertySourcesRefresher for F
where
    F: Fn(&str, Resource) -> Result<()> + Send + Sync,
{
    fn refresh(&self, name: &str, resource: Resource) -> Result<()> {
        self(name, resource)
    }
}
