// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process configuration server and client.
//!
//! [`InMemoryConfigServer`] plays the part of a remote configuration center: it stores
//! content per `(group, data id)` and broadcasts change events to every connected
//! [`InMemoryConfigClient`]. Each client delivers events to its listeners on a
//! dedicated dispatcher thread, the same way a network client delivers them on its
//! notification thread.

use crate::domain::{
    ApiVersion, ConfigError, ConfigEvent, Result, SourceAttributes, DEFAULT_GROUP,
};
use crate::ports::{ClientFactory, ConfigClient, EventListener};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

enum Dispatch {
    Event(ConfigEvent),
    Shutdown,
}

#[derive(Default)]
struct ServerState {
    configs: RwLock<HashMap<(String, String), String>>,
    subscribers: Mutex<Vec<Sender<Dispatch>>>,
}

/// A configuration center living in the current process.
///
/// Cloning is cheap; clones share the same store.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::InMemoryConfigServer;
///
/// let server = InMemoryConfigServer::new();
/// server.publish("DEFAULT_GROUP", "test.json", r#"{"my.name":"microsphere"}"#);
/// assert_eq!(
///     server.get("DEFAULT_GROUP", "test.json").as_deref(),
///     Some(r#"{"my.name":"microsphere"}"#)
/// );
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigServer {
    state: Arc<ServerState>,
}

impl InMemoryConfigServer {
    /// Creates an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the content of `data_id` in `group`.
    pub fn get(&self, group: &str, data_id: &str) -> Option<String> {
        self.state
            .configs
            .read()
            .ok()
            .and_then(|configs| configs.get(&(group.to_string(), data_id.to_string())).cloned())
    }

    /// Stores `content` and notifies connected clients.
    ///
    /// New data ids emit a created event, changed content emits a modified event,
    /// and identical content emits nothing.
    pub fn publish(&self, group: &str, data_id: &str, content: &str) -> bool {
        let previous = match self.state.configs.write() {
            Ok(mut configs) => {
                configs.insert((group.to_string(), data_id.to_string()), content.to_string())
            }
            Err(_) => return false,
        };

        let event = match previous {
            None => ConfigEvent::created(group, data_id, content),
            Some(old) if old != content => ConfigEvent::modified(group, data_id, content),
            Some(_) => {
                tracing::debug!("Content of '{}' in '{}' unchanged", data_id, group);
                return true;
            }
        };
        self.broadcast(event);
        true
    }

    /// Removes `data_id` and notifies connected clients. Returns whether it existed.
    pub fn remove(&self, group: &str, data_id: &str) -> bool {
        let removed = self
            .state
            .configs
            .write()
            .ok()
            .and_then(|mut configs| configs.remove(&(group.to_string(), data_id.to_string())))
            .is_some();

        if removed {
            self.broadcast(ConfigEvent::deleted(group, data_id));
        }
        removed
    }

    fn connect(&self) -> (Sender<Dispatch>, Receiver<Dispatch>) {
        let (tx, rx) = channel();
        if let Ok(mut subscribers) = self.state.subscribers.lock() {
            subscribers.push(tx.clone());
        }
        (tx, rx)
    }

    fn broadcast(&self, event: ConfigEvent) {
        tracing::debug!(
            "Broadcasting {} event for '{}' in '{}'",
            event.kind(),
            event.data_id(),
            event.group()
        );
        if let Ok(mut subscribers) = self.state.subscribers.lock() {
            subscribers.retain(|tx| tx.send(Dispatch::Event(event.clone())).is_ok());
        }
    }
}

type ListenerMap = HashMap<String, Vec<EventListener>>;

/// A config client connected to an [`InMemoryConfigServer`].
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::{InMemoryConfigClient, InMemoryConfigServer};
/// use nacoscfg::domain::ApiVersion;
/// use nacoscfg::ports::ConfigClient;
///
/// # fn main() -> nacoscfg::domain::Result<()> {
/// let server = InMemoryConfigServer::new();
/// let client = InMemoryConfigClient::connect(&server, ApiVersion::V2, "DEFAULT_GROUP")?;
///
/// client.publish_config_content("DEFAULT_GROUP", "test.json", "{}")?;
/// assert_eq!(client.get_config_content("test.json")?, "{}");
///
/// client.close()?;
/// assert!(client.get_config_content("test.json").is_err());
/// # Ok(())
/// # }
/// ```
pub struct InMemoryConfigClient {
    server: InMemoryConfigServer,
    version: ApiVersion,
    group: String,
    listeners: Arc<Mutex<ListenerMap>>,
    dispatch_tx: Sender<Dispatch>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl InMemoryConfigClient {
    /// Connects a client for `group` and starts its dispatcher thread.
    pub fn connect(
        server: &InMemoryConfigServer,
        version: ApiVersion,
        group: impl Into<String>,
    ) -> Result<Self> {
        let group = group.into();
        let (dispatch_tx, dispatch_rx) = server.connect();
        let listeners: Arc<Mutex<ListenerMap>> = Arc::new(Mutex::new(HashMap::new()));

        let dispatcher = thread::Builder::new()
            .name(format!("nacoscfg-memory-{}", version))
            .spawn({
                let listeners = Arc::clone(&listeners);
                let group = group.clone();
                move || Self::dispatch_loop(dispatch_rx, listeners, group)
            })
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to spawn dispatcher thread: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            server: server.clone(),
            version,
            group,
            listeners,
            dispatch_tx,
            dispatcher: Mutex::new(Some(dispatcher)),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        })
    }

    fn dispatch_loop(rx: Receiver<Dispatch>, listeners: Arc<Mutex<ListenerMap>>, group: String) {
        for dispatch in rx {
            let event = match dispatch {
                Dispatch::Event(event) => event,
                Dispatch::Shutdown => break,
            };
            if event.group() != group {
                continue;
            }

            // snapshot so listeners may register further listeners
            let targets: Vec<EventListener> = match listeners.lock() {
                Ok(map) => map.get(event.data_id()).cloned().unwrap_or_default(),
                Err(_) => continue,
            };

            for listener in targets {
                if let Err(e) = listener(event.clone()) {
                    tracing::error!(
                        "Listener for '{}' failed on {} event: {}",
                        event.data_id(),
                        event.kind(),
                        e
                    );
                }
            }
        }
        tracing::debug!("In-memory dispatcher for group '{}' stopped", group);
    }

    /// The group this client reads from.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// How many times `close` has been called.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Whether the client has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Removes `data_id` from `group` on the server.
    pub fn remove_config_content(&self, group: &str, data_id: &str) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.server.remove(group, data_id))
    }

    fn describe(&self) -> String {
        format!("memory-{}", self.version)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(ConfigError::ClientClosed {
                client: self.describe(),
            })
        } else {
            Ok(())
        }
    }
}

impl ConfigClient for InMemoryConfigClient {
    fn api_version(&self) -> ApiVersion {
        self.version
    }

    fn get_config_content(&self, data_id: &str) -> Result<String> {
        self.ensure_open()?;
        self.server
            .get(&self.group, data_id)
            .ok_or_else(|| ConfigError::ConfigNotFound {
                data_id: data_id.to_string(),
                group: self.group.clone(),
            })
    }

    fn add_event_listener(&self, data_id: &str, listener: EventListener) -> Result<()> {
        self.ensure_open()?;
        let mut listeners = self.listeners.lock().map_err(|_| ConfigError::WatcherError {
            message: "Listener registry is poisoned".to_string(),
            source: None,
        })?;
        listeners
            .entry(data_id.to_string())
            .or_default()
            .push(listener);
        tracing::debug!("Listening to '{}' in group '{}'", data_id, self.group);
        Ok(())
    }

    fn publish_config_content(&self, group: &str, data_id: &str, content: &str) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.server.publish(group, data_id, content))
    }

    fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let _ = self.dispatch_tx.send(Dispatch::Shutdown);
        let handle = self
            .dispatcher
            .lock()
            .ok()
            .and_then(|mut dispatcher| dispatcher.take());
        if let Some(handle) = handle {
            // a listener closing its own client must not join itself
            if handle.thread().id() != thread::current().id() {
                handle.join().map_err(|_| ConfigError::WatcherError {
                    message: "Failed to join in-memory dispatcher thread".to_string(),
                    source: None,
                })?;
            }
        }
        Ok(())
    }
}

impl Drop for InMemoryConfigClient {
    fn drop(&mut self) {
        if !self.is_closed() {
            let _ = self.dispatch_tx.send(Dispatch::Shutdown);
        }
    }
}

/// Builds [`InMemoryConfigClient`]s connected to one server.
///
/// The server address of the attributes is ignored; the group is honoured.
#[derive(Clone, Default)]
pub struct InMemoryClientFactory {
    server: InMemoryConfigServer,
    created: Arc<AtomicUsize>,
}

impl InMemoryClientFactory {
    /// Creates a factory for `server`.
    pub fn new(server: InMemoryConfigServer) -> Self {
        Self {
            server,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The server clients connect to.
    pub fn server(&self) -> &InMemoryConfigServer {
        &self.server
    }

    /// How many clients this factory has built.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ClientFactory for InMemoryClientFactory {
    fn create(
        &self,
        attributes: &SourceAttributes,
        version: ApiVersion,
    ) -> Result<Arc<dyn ConfigClient>> {
        let group = if attributes.group.is_empty() {
            DEFAULT_GROUP
        } else {
            attributes.group.as_str()
        };
        let client = InMemoryConfigClient::connect(&self.server, version, group)?;
        self.created.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            "Created in-memory {} client for source '{}'",
            version,
            attributes.name
        );
        Ok(Arc::new(client))
    }
}
