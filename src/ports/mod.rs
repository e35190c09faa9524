// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits are the seams between the crate's services and the outside world:
//! the remote configuration client, the host's refresher callback, property
//! sources and content parsers. Adapters implement them.

pub mod client;
pub mod parser;
pub mod refresher;
pub mod source;

// Re-export commonly used types
pub use client::{ClientFactory, ConfigClient, EventListener};
pub use parser::ConfigParser;
pub use refresher::PropertySourcesRefresher;
pub use source::PropertySource;
