// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helper utilities shared by the integration tests.

use nacoscfg::domain::{ApiVersion, ConfigError, ConfigEvent, Resource, Result, SourceAttributes};
use nacoscfg::ports::{ClientFactory, ConfigClient, EventListener, PropertySourcesRefresher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Installs a test writer subscriber once per test binary.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Polls `condition` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    condition()
}

/// A client whose event delivery is driven by the test.
#[allow(dead_code)]
pub struct ScriptedClient {
    pub name: String,
    pub version: ApiVersion,
    pub fail_close: bool,
    close_calls: AtomicUsize,
    listeners: Mutex<HashMap<String, Vec<EventListener>>>,
    contents: Mutex<HashMap<String, String>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new(name: &str, version: ApiVersion) -> Self {
        Self {
            name: name.to_string(),
            version,
            fail_close: false,
            close_calls: AtomicUsize::new(0),
            listeners: Mutex::new(HashMap::new()),
            contents: Mutex::new(HashMap::new()),
        }
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self, data_id: &str) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(data_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Delivers `event` on a separate notification thread and returns what each
    /// listener returned.
    pub fn emit(&self, event: ConfigEvent) -> Vec<Result<()>> {
        let listeners: Vec<EventListener> = self
            .listeners
            .lock()
            .unwrap()
            .get(event.data_id())
            .cloned()
            .unwrap_or_default();

        thread::spawn(move || {
            listeners
                .iter()
                .map(|listener| listener(event.clone()))
                .collect::<Vec<_>>()
        })
        .join()
        .unwrap()
    }
}

impl ConfigClient for ScriptedClient {
    fn api_version(&self) -> ApiVersion {
        self.version
    }

    fn get_config_content(&self, data_id: &str) -> Result<String> {
        self.contents
            .lock()
            .unwrap()
            .get(data_id)
            .cloned()
            .ok_or_else(|| ConfigError::ConfigNotFound {
                data_id: data_id.to_string(),
                group: "DEFAULT_GROUP".to_string(),
            })
    }

    fn add_event_listener(&self, data_id: &str, listener: EventListener) -> Result<()> {
        self.listeners
            .lock()
            .unwrap()
            .entry(data_id.to_string())
            .or_default()
            .push(listener);
        Ok(())
    }

    fn publish_config_content(&self, _group: &str, data_id: &str, content: &str) -> Result<bool> {
        self.contents
            .lock()
            .unwrap()
            .insert(data_id.to_string(), content.to_string());
        Ok(true)
    }

    fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(ConfigError::ClientError {
                client: self.name.clone(),
                message: "close failed".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

/// Builds [`ScriptedClient`]s slowly and remembers every one of them.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedFactory {
    pub build_delay: Duration,
    pub failing_close: Vec<String>,
    created: Mutex<Vec<Arc<ScriptedClient>>>,
}

#[allow(dead_code)]
impl ScriptedFactory {
    pub fn with_delay(build_delay: Duration) -> Self {
        Self {
            build_delay,
            ..Self::default()
        }
    }

    pub fn failing_close_for(mut self, name: &str) -> Self {
        self.failing_close.push(name.to_string());
        self
    }

    pub fn created(&self) -> Vec<Arc<ScriptedClient>> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl ClientFactory for ScriptedFactory {
    fn create(
        &self,
        attributes: &SourceAttributes,
        version: ApiVersion,
    ) -> Result<Arc<dyn ConfigClient>> {
        thread::sleep(self.build_delay);
        let mut client = ScriptedClient::new(&attributes.name, version);
        if self.failing_close.contains(&attributes.name) {
            client = client.failing_close();
        }
        let client = Arc::new(client);
        self.created.lock().unwrap().push(Arc::clone(&client));
        Ok(client)
    }
}

/// Remembers every refresh and optionally fails them.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingRefresher {
    pub fail: bool,
    calls: Mutex<Vec<(String, Vec<u8>, thread::ThreadId)>>,
}

#[allow(dead_code)]
impl RecordingRefresher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, bytes, _)| (name.clone(), bytes.clone()))
            .collect()
    }

    pub fn threads(&self) -> Vec<thread::ThreadId> {
        self.calls.lock().unwrap().iter().map(|(_, _, id)| *id).collect()
    }
}

impl PropertySourcesRefresher for RecordingRefresher {
    fn refresh(&self, name: &str, resource: Resource) -> Result<()> {
        self.calls.lock().unwrap().push((
            name.to_string(),
            resource.into_bytes(),
            thread::current().id(),
        ));
        if self.fail {
            return Err(ConfigError::ParseError {
                message: format!("cannot parse {}", name),
                source: None,
            });
        }
        Ok(())
    }
}

/// Returns the address of the client object, ignoring the vtable.
#[allow(dead_code)]
pub fn client_addr(client: &Arc<dyn ConfigClient>) -> *const () {
    Arc::as_ptr(client) as *const ()
}
