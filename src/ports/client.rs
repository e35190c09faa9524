// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote configuration client port.
//!
//! A `ConfigClient` is the only thing in this crate that talks to a configuration
//! server. Everything above it (the registry, the resolver, the change bridge) works
//! against this trait, so clients for different servers or transports plug in by
//! implementing it together with a [`ClientFactory`].

use crate::domain::{ApiVersion, ConfigEvent, Result, SourceAttributes};
use std::sync::Arc;

/// Callback invoked for every change event of a watched data id.
///
/// Listeners run on the client's own notification thread. An `Err` returned by a
/// listener is reported by the client (logged) and does not stop later deliveries.
pub type EventListener = Arc<dyn Fn(ConfigEvent) -> Result<()> + Send + Sync>;

/// A client for one configuration server speaking one API version.
///
/// # Thread Safety
///
/// Clients are shared through `Arc` between the thread that resolves property
/// sources and the client's notification thread, so every method takes `&self`.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::domain::{ApiVersion, ConfigError, Result};
/// use nacoscfg::ports::{ConfigClient, EventListener};
///
/// struct Fixed;
///
/// impl ConfigClient for Fixed {
///     fn api_version(&self) -> ApiVersion {
///         ApiVersion::V2
///     }
///
///     fn get_config_content(&self, data_id: &str) -> Result<String> {
///         match data_id {
///             "test.json" => Ok(r#"{"my.name":"microsphere"}"#.to_string()),
///             other => Err(ConfigError::ConfigNotFound {
///                 data_id: other.to_string(),
///                 group: "DEFAULT_GROUP".to_string(),
///             }),
///         }
///     }
///
///     fn add_event_listener(&self, _data_id: &str, _listener: EventListener) -> Result<()> {
///         Ok(())
///     }
///
///     fn publish_config_content(&self, _group: &str, _data_id: &str, _content: &str) -> Result<bool> {
///         Ok(false)
///     }
///
///     fn close(&self) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// assert!(Fixed.get_config_content("test.json").unwrap().contains("microsphere"));
/// ```
pub trait ConfigClient: Send + Sync {
    /// The API dialect this client speaks.
    fn api_version(&self) -> ApiVersion;

    /// Fetches the current content of `data_id` in the client's group.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The content
    /// * `Err(ConfigError::ConfigNotFound)` - The data id does not exist
    /// * `Err(ConfigError)` - Any other client failure
    fn get_config_content(&self, data_id: &str) -> Result<String>;

    /// Registers `listener` for change events of `data_id` in the client's group.
    fn add_event_listener(&self, data_id: &str, listener: EventListener) -> Result<()>;

    /// Creates or replaces the content of `data_id` in `group`.
    ///
    /// Returns whether the server accepted the content.
    fn publish_config_content(&self, group: &str, data_id: &str, content: &str) -> Result<bool>;

    /// Releases the client's connections and notification threads.
    fn close(&self) -> Result<()>;
}

/// Builds clients for source attributes.
///
/// The registry calls the factory at most once per source name; the factory does
/// not need to cache anything itself.
pub trait ClientFactory: Send + Sync {
    /// Creates a client for `attributes` speaking the already validated `version`.
    fn create(
        &self,
        attributes: &SourceAttributes,
        version: ApiVersion,
    ) -> Result<Arc<dyn ConfigClient>>;
}

impl<F> ClientFactory for F
where
    F: Fn(&SourceAttributes, ApiVersion) -> Result<Arc<dyn ConfigClient>> + Send + Sync,
{
    fn create(
        &self,
        attributes: &SourceAttributes,
        version: ApiVersion,
    ) -> Result<Arc<dyn ConfigClient>> {
        self(attributes, version)
    }
}
