// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! This module holds the types shared by every other layer: source attributes,
//! change events, resources, property keys and values, and errors. It has no
//! knowledge of any concrete client or parser.

pub mod attributes;
pub mod config_key;
pub mod config_value;
pub mod errors;
pub mod event;
pub mod resource;
pub mod service;

// Re-export commonly used types
pub use attributes::{ApiVersion, SourceAttributes, DEFAULT_GROUP, DEFAULT_SERVER_ADDRESS};
pub use config_key::ConfigKey;
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use event::{ConfigEvent, EventKind};
pub use resource::Resource;
pub use service::ConfigurationService;
