// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nacos-backed property sources with cached clients and live refresh.
//!
//! This crate loads configuration documents (JSON, YAML, properties) from a Nacos
//! configuration center into property sources, and pushes later changes of those
//! documents into the same property sources while the application runs.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`SourceAttributes`, `ConfigEvent`, `Resource`,
//!   `ConfigKey`, `ConfigValue`, errors)
//! - **Ports**: Trait definitions (`ConfigClient`, `ClientFactory`,
//!   `PropertySourcesRefresher`, `PropertySource`, `ConfigParser`)
//! - **Adapters**: Clients (in-memory, HTTP open API), parsers and property sources
//! - **Service**: The client registry, the property source loader and the environment
//!
//! # Feature Flags
//!
//! - `json`: JSON documents (default)
//! - `yaml`: YAML documents and attribute files (default)
//! - `http`: The Nacos open API client over HTTP
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use nacoscfg::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> nacoscfg::domain::Result<()> {
//! let server = InMemoryConfigServer::new();
//! server.publish(DEFAULT_GROUP, "test.json", r#"{"my.name":"microsphere"}"#);
//!
//! let registry = Arc::new(ClientRegistry::new(Arc::new(InMemoryClientFactory::new(server))));
//! let loader = NacosPropertySourceLoader::new(registry.clone());
//! let environment = Environment::new();
//!
//! let attributes = SourceAttributes::new("nacos").with_key("test.json");
//! loader.load(&attributes, &environment)?;
//! assert_eq!(environment.get_str("my.name")?.as_str(), "microsphere");
//!
//! registry.shutdown();
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        ApiVersion, ConfigError, ConfigEvent, ConfigKey, ConfigValue, ConfigurationService,
        EventKind, Resource, Result, SourceAttributes, DEFAULT_GROUP,
    };
    pub use crate::ports::{
        ClientFactory, ConfigClient, ConfigParser, EventListener, PropertySource,
        PropertySourcesRefresher,
    };
    pub use crate::service::{
        ClientRegistry, Environment, NacosPropertySourceLoader, ResourcePropertySourcesRefresher,
    };

    pub use crate::adapters::{
        CompositePropertySource, InMemoryClientFactory, InMemoryConfigServer, PropertiesParser,
        ResourcePropertySource,
    };
    #[cfg(feature = "http")]
    pub use crate::adapters::{OpenApiClient, OpenApiClientFactory};
    #[cfg(feature = "json")]
    pub use crate::adapters::JsonParser;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{AttributesFile, YamlParser};
}
