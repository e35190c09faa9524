// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide cache of configuration clients.
//!
//! The registry hands out one shared client per property source name. Concurrent
//! first requests for the same name construct a single client, while requests for
//! different names never wait on each other's construction. The application tears
//! the registry down with [`ClientRegistry::shutdown`] on exit.

use crate::domain::{ConfigError, Result, SourceAttributes};
use crate::ports::{ClientFactory, ConfigClient};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Slot {
    client: OnceCell<Arc<dyn ConfigClient>>,
    closed: AtomicBool,
}

impl Slot {
    /// Closes the client if one was built and nobody closed it yet.
    fn close_once(&self, name: &str) -> bool {
        let Some(client) = self.client.get() else {
            return false;
        };
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        match client.close() {
            Ok(()) => tracing::debug!("Closed config client for '{}'", name),
            Err(e) => tracing::error!("Failed to close config client for '{}': {}", name, e),
        }
        true
    }
}

/// Cache of configuration clients keyed by property source name.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::{InMemoryClientFactory, InMemoryConfigServer};
/// use nacoscfg::domain::SourceAttributes;
/// use nacoscfg::service::ClientRegistry;
/// use std::sync::Arc;
///
/// # fn main() -> nacoscfg::domain::Result<()> {
/// let factory = InMemoryClientFactory::new(InMemoryConfigServer::new());
/// let registry = ClientRegistry::new(Arc::new(factory.clone()));
///
/// let attributes = SourceAttributes::new("nacos").with_key("test.json");
/// let first = registry.get_or_create(&attributes)?;
/// let second = registry.get_or_create(&attributes)?;
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(factory.created(), 1);
///
/// assert_eq!(registry.shutdown(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ClientRegistry {
    factory: Arc<dyn ClientFactory>,
    slots: Mutex<HashMap<String, Arc<Slot>>>,
    shut_down: AtomicBool,
}

impl ClientRegistry {
    /// Creates an empty registry building clients with `factory`.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            slots: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Arc<Slot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the client cached under `attributes.name`, building it on first use.
    ///
    /// The configured API version is checked before the cache is consulted, so an
    /// unsupported version fails even when a client is already cached under the name.
    ///
    /// # Errors
    ///
    /// * `ConfigError::UnsupportedApiVersion` - The version is neither V1 nor V2
    /// * `ConfigError::RegistryShutdown` - [`shutdown`](Self::shutdown) was called
    /// * Any error of the factory; nothing is cached in that case
    pub fn get_or_create(&self, attributes: &SourceAttributes) -> Result<Arc<dyn ConfigClient>> {
        let version = attributes.api_version()?;

        let slot = {
            let mut slots = self.slots();
            if self.is_shut_down() {
                return Err(ConfigError::RegistryShutdown);
            }
            Arc::clone(slots.entry(attributes.name.clone()).or_default())
        };

        let client = slot.client.get_or_try_init(|| {
            tracing::info!(
                "Creating {} config client '{}' for {}",
                version,
                attributes.name,
                attributes.effective_server_address()
            );
            self.factory.create(attributes, version)
        })?;

        // built after shutdown drained the cache
        if self.is_shut_down() {
            slot.close_once(&attributes.name);
            return Err(ConfigError::RegistryShutdown);
        }

        Ok(Arc::clone(client))
    }

    /// Returns the client cached under `name`, if it has been built.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ConfigClient>> {
        self.slots()
            .get(name)
            .and_then(|slot| slot.client.get().cloned())
    }

    /// Whether a client has been built for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of clients built so far.
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.client.get().is_some())
            .count()
    }

    /// Whether no client has been built.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Closes every cached client and empties the cache.
    ///
    /// Close failures are logged and do not stop the remaining clients from being
    /// closed. Returns the number of clients closed by this call; calling it again
    /// returns 0.
    pub fn shutdown(&self) -> usize {
        self.shut_down.store(true, Ordering::SeqCst);
        let drained: Vec<(String, Arc<Slot>)> = self.slots().drain().collect();

        let closed = drained
            .iter()
            .filter(|(name, slot)| slot.close_once(name))
            .count();
        if closed > 0 {
            tracing::info!("Config client registry shut down, {} client(s) closed", closed);
        }
        closed
    }
}

impl Drop for ClientRegistry {
    fn drop(&mut self) {
        if !self.is_shut_down() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.slots().keys().cloned().collect();
        names.sort();
        f.debug_struct("ClientRegistry")
            .field("clients", &names)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
