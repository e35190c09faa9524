// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nacos open API client over HTTP.
//!
//! Speaks either the `/nacos/v1/cs/configs` or the `/nacos/v2/cs/config` endpoints.
//! Requests run on a runtime shared by all clients. Calls made from inside another
//! tokio runtime are moved to a helper thread, so the client can be used from
//! ordinary threads and async hosts alike. Listening is done by a poll thread that re-reads every watched
//! data id and turns content differences into created, modified and deleted events.

use crate::domain::{
    ApiVersion, ConfigError, ConfigEvent, Result, SourceAttributes, DEFAULT_GROUP,
};
use crate::ports::{ClientFactory, ConfigClient, EventListener};
use once_cell::sync::OnceCell;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between two polls of the watched data ids.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// V2 result code for a missing configuration.
const CONFIG_NOT_FOUND_CODE: i64 = 20004;

/// Runtime for every request issued by the open api clients
static REQUEST_RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn request_runtime(client: &str) -> Result<&'static Runtime> {
    REQUEST_RUNTIME.get_or_try_init(|| {
        Runtime::new().map_err(|e| ConfigError::ClientError {
            client: client.to_string(),
            message: "Failed to create tokio runtime".to_string(),
            source: Some(Box::new(e)),
        })
    })
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

/// Normalizes a configured server address into a base URL.
pub(crate) fn base_url(server_address: &str) -> String {
    let address = server_address.trim().trim_end_matches('/');
    let address = if address.is_empty() {
        crate::domain::DEFAULT_SERVER_ADDRESS
    } else {
        address
    };
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// The config endpoint for `version` under `base`.
pub(crate) fn config_endpoint(base: &str, version: ApiVersion) -> String {
    match version {
        ApiVersion::V1 => format!("{}/nacos/v1/cs/configs", base),
        ApiVersion::V2 => format!("{}/nacos/v2/cs/config", base),
    }
}

/// Query parameters identifying one data id.
pub(crate) fn config_params(
    version: ApiVersion,
    data_id: &str,
    group: &str,
    namespace: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("dataId", data_id.to_string()),
        ("group", group.to_string()),
    ];
    if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
        let name = match version {
            ApiVersion::V1 => "tenant",
            ApiVersion::V2 => "namespaceId",
        };
        params.push((name, namespace.to_string()));
    }
    params
}

/// Extracts the content from a V2 `get` response body.
///
/// Returns `Ok(None)` when the server reports the configuration as missing.
pub(crate) fn parse_v2_content(client: &str, body: &str) -> Result<Option<String>> {
    let envelope: Envelope<String> = parse_envelope(client, body)?;
    match envelope.code {
        0 => Ok(Some(envelope.data.unwrap_or_default())),
        CONFIG_NOT_FOUND_CODE => Ok(None),
        code => Err(envelope_error(client, code, envelope.message)),
    }
}

/// Extracts the outcome from a V2 `publish` or `delete` response body.
pub(crate) fn parse_v2_flag(client: &str, body: &str) -> Result<bool> {
    let envelope: Envelope<bool> = parse_envelope(client, body)?;
    match envelope.code {
        0 => Ok(envelope.data.unwrap_or(false)),
        code => Err(envelope_error(client, code, envelope.message)),
    }
}

fn parse_envelope<T: serde::de::DeserializeOwned>(client: &str, body: &str) -> Result<Envelope<T>> {
    serde_json::from_str(body).map_err(|e| ConfigError::ClientError {
        client: client.to_string(),
        message: format!("Malformed open api response: {}", e),
        source: Some(Box::new(e)),
    })
}

fn envelope_error(client: &str, code: i64, message: Option<String>) -> ConfigError {
    ConfigError::ClientError {
        client: client.to_string(),
        message: format!(
            "Server returned code {}: {}",
            code,
            message.unwrap_or_else(|| "no message".to_string())
        ),
        source: None,
    }
}

/// Everything needed to issue requests, shared with the poll thread.
struct Endpoint {
    version: ApiVersion,
    base: String,
    group: String,
    namespace: Option<String>,
    http: Client,
}

impl Endpoint {
    fn describe(&self) -> String {
        format!("{}@{}", self.version, self.base)
    }

    fn request_error(&self, action: &str, e: reqwest::Error) -> ConfigError {
        ConfigError::ClientError {
            client: self.describe(),
            message: format!("Failed to {}: {}", action, e),
            source: Some(Box::new(e)),
        }
    }

    fn status_error(&self, action: &str, status: StatusCode, body: &str) -> ConfigError {
        ConfigError::ClientError {
            client: self.describe(),
            message: format!("Failed to {}: HTTP {} {}", action, status, body.trim()),
            source: None,
        }
    }

    /// Drives `request` to completion on the shared runtime.
    ///
    /// Inside an async context the request runs on a scoped thread so the
    /// caller's executor is never blocked from within.
    fn block_on<T, F>(&self, request: F) -> Result<T>
    where
        T: Send,
        F: Future<Output = Result<T>> + Send,
    {
        let runtime = request_runtime(&self.describe())?;
        if Handle::try_current().is_err() {
            return runtime.block_on(request);
        }

        thread::scope(|scope| scope.spawn(|| runtime.block_on(request)).join()).map_err(|_| {
            ConfigError::ClientError {
                client: self.describe(),
                message: "Request thread panicked".to_string(),
                source: None,
            }
        })?
    }

    /// Reads `data_id`; `None` when it does not exist.
    fn fetch(&self, data_id: &str) -> Result<Option<String>> {
        let url = config_endpoint(&self.base, self.version);
        let params = config_params(self.version, data_id, &self.group, self.namespace.as_deref());

        let (status, body) = self.block_on(async {
            let response = self
                .http
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(|e| self.request_error("get config", e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| self.request_error("read config", e))?;
            Ok::<_, ConfigError>((status, body))
        })?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        match self.version {
            ApiVersion::V1 if status.is_success() => Ok(Some(body)),
            // v2 reports application errors in the envelope, often with a non-2xx status
            ApiVersion::V2 if body.trim_start().starts_with('{') => {
                parse_v2_content(&self.describe(), &body)
            }
            _ => Err(self.status_error("get config", status, &body)),
        }
    }

    fn publish(&self, group: &str, data_id: &str, content: &str) -> Result<bool> {
        let url = config_endpoint(&self.base, self.version);
        let mut params = config_params(self.version, data_id, group, self.namespace.as_deref());
        params.push(("content", content.to_string()));

        let (status, body) = self.block_on(async {
            let response = self
                .http
                .post(&url)
                .form(&params)
                .send()
                .await
                .map_err(|e| self.request_error("publish config", e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| self.request_error("read publish response", e))?;
            Ok::<_, ConfigError>((status, body))
        })?;

        self.flag(status, &body, "publish config")
    }

    fn remove(&self, group: &str, data_id: &str) -> Result<bool> {
        let url = config_endpoint(&self.base, self.version);
        let params = config_params(self.version, data_id, group, self.namespace.as_deref());

        let (status, body) = self.block_on(async {
            let response = self
                .http
                .delete(&url)
                .query(&params)
                .send()
                .await
                .map_err(|e| self.request_error("delete config", e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| self.request_error("read delete response", e))?;
            Ok::<_, ConfigError>((status, body))
        })?;

        self.flag(status, &body, "delete config")
    }

    fn flag(&self, status: StatusCode, body: &str, action: &str) -> Result<bool> {
        match self.version {
            ApiVersion::V1 if status.is_success() => Ok(body.trim() == "true"),
            ApiVersion::V2 if body.trim_start().starts_with('{') => {
                parse_v2_flag(&self.describe(), body)
            }
            _ => Err(self.status_error(action, status, body)),
        }
    }
}

struct Watch {
    last: Option<String>,
    listeners: Vec<EventListener>,
}

type Watches = Arc<Mutex<HashMap<String, Watch>>>;

/// A Nacos open API client for one server, group and namespace.
///
/// # Examples
///
/// ```rust,no_run
/// use nacoscfg::adapters::OpenApiClient;
/// use nacoscfg::domain::ApiVersion;
/// use nacoscfg::ports::ConfigClient;
///
/// # fn main() -> nacoscfg::domain::Result<()> {
/// let client = OpenApiClient::new("127.0.0.1:8848", ApiVersion::V2, "DEFAULT_GROUP", None)?;
/// let content = client.get_config_content("test.json")?;
/// println!("{}", content);
/// client.close()?;
/// # Ok(())
/// # }
/// ```
pub struct OpenApiClient {
    endpoint: Arc<Endpoint>,
    watches: Watches,
    poll_interval: Duration,
    poll_stop: Mutex<Option<Sender<()>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl OpenApiClient {
    /// Creates a client with the default timeout and poll interval.
    pub fn new(
        server_address: &str,
        version: ApiVersion,
        group: impl Into<String>,
        namespace: Option<String>,
    ) -> Result<Self> {
        Self::with_options(
            server_address,
            version,
            group,
            namespace,
            DEFAULT_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
    }

    /// Creates a client with an explicit request timeout and poll interval.
    pub fn with_options(
        server_address: &str,
        version: ApiVersion,
        group: impl Into<String>,
        namespace: Option<String>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        let base = base_url(server_address);
        let client_name = format!("{}@{}", version, base);

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::ClientError {
                client: client_name.clone(),
                message: format!("Failed to build HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        request_runtime(&client_name)?;

        let group = group.into();
        let group = if group.is_empty() {
            DEFAULT_GROUP.to_string()
        } else {
            group
        };

        tracing::info!("Created nacos {} open api client for {}", version, base);

        Ok(Self {
            endpoint: Arc::new(Endpoint {
                version,
                base,
                group,
                namespace,
                http,
            }),
            watches: Arc::new(Mutex::new(HashMap::new())),
            poll_interval,
            poll_stop: Mutex::new(None),
            poller: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.endpoint.base
    }

    /// Deletes `data_id` from `group` on the server.
    pub fn remove_config_content(&self, group: &str, data_id: &str) -> Result<bool> {
        self.ensure_open()?;
        self.endpoint.remove(group, data_id)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(ConfigError::ClientClosed {
                client: self.endpoint.describe(),
            })
        } else {
            Ok(())
        }
    }

    fn ensure_poller(&self) -> Result<()> {
        let mut poller = self.poller.lock().map_err(|_| ConfigError::WatcherError {
            message: "Poller state is poisoned".to_string(),
            source: None,
        })?;
        if poller.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = channel::<()>();
        let endpoint = Arc::clone(&self.endpoint);
        let watches = Arc::clone(&self.watches);
        let interval = self.poll_interval;

        let handle = thread::Builder::new()
            .name(format!("nacoscfg-poll-{}", self.endpoint.version))
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => poll_once(&endpoint, &watches),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to spawn poll thread: {}", e),
                source: Some(Box::new(e)),
            })?;

        *poller = Some(handle);
        if let Ok(mut stop) = self.poll_stop.lock() {
            *stop = Some(stop_tx);
        }
        tracing::debug!("Started poll thread for {}", self.endpoint.describe());
        Ok(())
    }
}

/// The event implied by a data id going from `last` to `current` content.
pub(crate) fn content_change(
    group: &str,
    data_id: &str,
    last: Option<&str>,
    current: Option<&str>,
) -> Option<ConfigEvent> {
    match (last, current) {
        (None, Some(content)) => Some(ConfigEvent::created(group, data_id, content)),
        (Some(old), Some(content)) if old != content => {
            Some(ConfigEvent::modified(group, data_id, content))
        }
        (Some(_), None) => Some(ConfigEvent::deleted(group, data_id)),
        _ => None,
    }
}

fn poll_once(endpoint: &Endpoint, watches: &Watches) {
    let data_ids: Vec<String> = match watches.lock() {
        Ok(watches) => watches.keys().cloned().collect(),
        Err(_) => return,
    };

    for data_id in data_ids {
        let current = match endpoint.fetch(&data_id) {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("Polling '{}' failed: {}", data_id, e);
                continue;
            }
        };

        let (event, listeners) = {
            let Ok(mut watches) = watches.lock() else {
                return;
            };
            let Some(watch) = watches.get_mut(&data_id) else {
                continue;
            };
            let event = content_change(
                &endpoint.group,
                &data_id,
                watch.last.as_deref(),
                current.as_deref(),
            );
            watch.last = current;
            (event, watch.listeners.clone())
        };

        if let Some(event) = event {
            tracing::debug!("Detected {} change of '{}'", event.kind(), data_id);
            for listener in listeners {
                if let Err(e) = listener(event.clone()) {
                    tracing::error!(
                        "Listener for '{}' failed on {} event: {}",
                        data_id,
                        event.kind(),
                        e
                    );
                }
            }
        }
    }
}

impl ConfigClient for OpenApiClient {
    fn api_version(&self) -> ApiVersion {
        self.endpoint.version
    }

    fn get_config_content(&self, data_id: &str) -> Result<String> {
        self.ensure_open()?;
        self.endpoint
            .fetch(data_id)?
            .ok_or_else(|| ConfigError::ConfigNotFound {
                data_id: data_id.to_string(),
                group: self.endpoint.group.clone(),
            })
    }

    fn add_event_listener(&self, data_id: &str, listener: EventListener) -> Result<()> {
        self.ensure_open()?;

        let is_new = {
            let watches = self.watches.lock().map_err(|_| ConfigError::WatcherError {
                message: "Watch registry is poisoned".to_string(),
                source: None,
            })?;
            !watches.contains_key(data_id)
        };
        // baseline so the first poll does not report existing content as created
        let baseline = if is_new {
            self.endpoint.fetch(data_id)?
        } else {
            None
        };

        {
            let mut watches = self.watches.lock().map_err(|_| ConfigError::WatcherError {
                message: "Watch registry is poisoned".to_string(),
                source: None,
            })?;
            let watch = watches.entry(data_id.to_string()).or_insert_with(|| Watch {
                last: baseline,
                listeners: Vec::new(),
            });
            watch.listeners.push(listener);
        }

        self.ensure_poller()?;
        tracing::debug!(
            "Listening to '{}' in group '{}' on {}",
            data_id,
            self.endpoint.group,
            self.endpoint.describe()
        );
        Ok(())
    }

    fn publish_config_content(&self, group: &str, data_id: &str, content: &str) -> Result<bool> {
        self.ensure_open()?;
        self.endpoint.publish(group, data_id, content)
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Ok(mut stop) = self.poll_stop.lock() {
            if let Some(tx) = stop.take() {
                let _ = tx.send(());
            }
        }
        let handle = self.poller.lock().ok().and_then(|mut p| p.take());
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                handle.join().map_err(|_| ConfigError::WatcherError {
                    message: "Failed to join poll thread".to_string(),
                    source: None,
                })?;
            }
        }
        tracing::info!("Closed nacos client {}", self.endpoint.describe());
        Ok(())
    }
}

impl Drop for OpenApiClient {
    fn drop(&mut self) {
        if let Ok(mut stop) = self.poll_stop.lock() {
            if let Some(tx) = stop.take() {
                let _ = tx.send(());
            }
        }
    }
}

/// Builds [`OpenApiClient`]s from source attributes.
#[derive(Debug, Clone)]
pub struct OpenApiClientFactory {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for OpenApiClientFactory {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl OpenApiClientFactory {
    /// Creates a factory with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the poll interval used for listening.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl ClientFactory for OpenApiClientFactory {
    fn create(
        &self,
        attributes: &SourceAttributes,
        version: ApiVersion,
    ) -> Result<Arc<dyn ConfigClient>> {
        let client = OpenApiClient::with_options(
            attributes.effective_server_address(),
            version,
            attributes.group.clone(),
            attributes.namespace.clone(),
            self.timeout,
            self.poll_interval,
        )?;
        Ok(Arc::new(client))
    }
}
