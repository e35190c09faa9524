// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live refresh example.
//!
//! This example demonstrates:
//! - Loading a remote JSON document into the environment
//! - Publishing new content through the cached client
//! - Reading the refreshed value once the change has been pushed
//! - Shutting the client registry down on exit
//!
//! To run this example:
//! ```bash
//! cargo run --example live_refresh
//! ```

use nacoscfg::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== nacoscfg: Live Refresh Example ===\n");

    let server = InMemoryConfigServer::new();
    server.publish(DEFAULT_GROUP, "test.json", r#"{"my.name":"microsphere"}"#);

    let registry = Arc::new(ClientRegistry::new(Arc::new(InMemoryClientFactory::new(
        server,
    ))));
    let loader = NacosPropertySourceLoader::new(registry.clone());
    let environment = Environment::new();

    let attributes = SourceAttributes::new("nacos")
        .with_api_version(ApiVersion::V2)
        .with_key("test.json");
    loader.load(&attributes, &environment)?;
    println!("my.name = {}", environment.get_str("my.name")?);

    let client = registry
        .get("nacos")
        .ok_or_else(|| ConfigError::InvalidAttributes {
            message: "client for 'nacos' was not created".to_string(),
        })?;
    client.publish_config_content(DEFAULT_GROUP, "test.json", r#"{ "my.name": "Microsphere" }"#)?;
    println!("Published new content, waiting for refresh...");

    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if environment.get_str("my.name")?.as_str() == "Microsphere" {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    println!("my.name = {}", environment.get_str("my.name")?);

    let closed = registry.shutdown();
    println!("\nClosed {} client(s)", closed);
    Ok(())
}
