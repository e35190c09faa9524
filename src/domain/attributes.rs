// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property source attributes and the Nacos open API version.
//!
//! Attributes describe one configured remote property source: where its server is,
//! which API dialect to speak, and which data ids to load. They are read once at
//! startup, either built in code or deserialized from an attributes file.

use crate::domain::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The group used when none is configured.
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// The server address used when none (or an empty one) is configured.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8848";

/// The two mutually exclusive open API dialects a client can speak.
///
/// # Examples
///
/// ```
/// use nacoscfg::domain::ApiVersion;
///
/// assert_eq!("v1".parse::<ApiVersion>().unwrap(), ApiVersion::V1);
/// assert_eq!("V2".parse::<ApiVersion>().unwrap(), ApiVersion::V2);
/// assert!("v3".parse::<ApiVersion>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    /// The `/nacos/v1` API.
    V1,
    /// The `/nacos/v2` API.
    V2,
}

impl ApiVersion {
    /// Returns the canonical name of the version.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "V1",
            ApiVersion::V2 => "V2",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ApiVersion::V1),
            "v2" | "2" => Ok(ApiVersion::V2),
            _ => Err(ConfigError::UnsupportedApiVersion {
                version: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_server_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}

fn default_version() -> String {
    ApiVersion::V2.as_str().to_string()
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_priority() -> u8 {
    1
}

fn default_auto_refreshed() -> bool {
    true
}

/// Attributes of one remote property source.
///
/// The API version is kept as configured and only interpreted when a client is
/// built, so an unsupported value surfaces as
/// [`ConfigError::UnsupportedApiVersion`] at that point.
///
/// # Examples
///
/// ```
/// use nacoscfg::domain::{ApiVersion, SourceAttributes};
///
/// let attributes = SourceAttributes::new("nacos")
///     .with_server_address("127.0.0.1:8848")
///     .with_api_version(ApiVersion::V2)
///     .with_key("test.json");
///
/// assert_eq!(attributes.api_version().unwrap(), ApiVersion::V2);
/// assert_eq!(attributes.group, "DEFAULT_GROUP");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttributes {
    /// Logical name of the property source; also the client registry key.
    pub name: String,
    /// Address of the configuration server, with or without a scheme.
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// The configured open API version, e.g. `V1` or `V2`.
    #[serde(default = "default_version")]
    pub version: String,
    /// The data ids to load, in precedence order.
    #[serde(default)]
    pub keys: Vec<String>,
    /// The group the data ids belong to.
    #[serde(default = "default_group")]
    pub group: String,
    /// Optional namespace (tenant).
    #[serde(default)]
    pub namespace: Option<String>,
    /// Precedence among property sources; higher wins.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Whether changes on the server are pushed into the property source.
    #[serde(default = "default_auto_refreshed")]
    pub auto_refreshed: bool,
}

impl SourceAttributes {
    /// Creates attributes for the named source with every other field defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_address: default_server_address(),
            version: default_version(),
            keys: Vec::new(),
            group: default_group(),
            namespace: None,
            priority: default_priority(),
            auto_refreshed: default_auto_refreshed(),
        }
    }

    /// Sets the server address.
    pub fn with_server_address(mut self, address: impl Into<String>) -> Self {
        self.server_address = address.into();
        self
    }

    /// Sets the API version.
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.version = version.as_str().to_string();
        self
    }

    /// Sets the API version from its raw configured form.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Appends a data id to load.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Sets the group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Enables or disables live refresh.
    pub fn with_auto_refreshed(mut self, auto_refreshed: bool) -> Self {
        self.auto_refreshed = auto_refreshed;
        self
    }

    /// Parses the configured API version.
    pub fn api_version(&self) -> Result<ApiVersion> {
        self.version.parse()
    }

    /// Returns the server address, falling back to the default when blank.
    pub fn effective_server_address(&self) -> &str {
        let address = self.server_address.trim();
        if address.is_empty() {
            DEFAULT_SERVER_ADDRESS
        } else {
            address
        }
    }

    /// Checks that the attributes can back a property source.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidAttributes {
                message: "source name must not be empty".to_string(),
            });
        }
        if self.keys.is_empty() {
            return Err(ConfigError::InvalidAttributes {
                message: format!("source '{}' has no keys to load", self.name),
            });
        }
        if let Some(key) = self.keys.iter().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidAttributes {
                message: format!("source '{}' has a blank key '{}'", self.name, key),
            });
        }
        self.api_version().map(|_| ())
    }
}
