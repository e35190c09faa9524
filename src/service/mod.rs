// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer tying clients, property sources and refresh together.
//!
//! The [`ClientRegistry`] owns the configuration clients, the
//! [`NacosPropertySourceLoader`] turns remote data ids into property sources and
//! keeps them refreshed, and the [`Environment`] resolves properties across all
//! registered sources.

pub mod environment;
pub mod loader;
pub mod refresher;
pub mod registry;

// Re-export commonly used types
pub use environment::Environment;
pub use loader::NacosPropertySourceLoader;
pub use refresher::ResourcePropertySourcesRefresher;
pub use registry::ClientRegistry;
