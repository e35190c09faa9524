// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: load remote documents and follow their changes.

mod common;

use common::{init_tracing, wait_until};
use nacoscfg::prelude::*;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    server: InMemoryConfigServer,
    registry: Arc<ClientRegistry>,
    loader: NacosPropertySourceLoader,
    environment: Environment,
}

impl Fixture {
    fn new() -> Self {
        init_tracing();
        let server = InMemoryConfigServer::new();
        let registry = Arc::new(ClientRegistry::new(Arc::new(InMemoryClientFactory::new(
            server.clone(),
        ))));
        Self {
            loader: NacosPropertySourceLoader::new(registry.clone()),
            server,
            registry,
            environment: Environment::new(),
        }
    }

    fn property(&self, key: &str) -> Option<String> {
        self.environment.get_str(key).ok().map(|v| v.as_string())
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.registry.shutdown();
    }
}

#[cfg(feature = "json")]
#[test]
fn test_json_document_follows_remote_updates() {
    let fixture = Fixture::new();
    fixture
        .server
        .publish(DEFAULT_GROUP, "test.json", r#"{"my.name":"microsphere"}"#);

    let attributes = SourceAttributes::new("nacos")
        .with_api_version(ApiVersion::V2)
        .with_key("test.json");
    fixture.loader.load(&attributes, &fixture.environment).unwrap();
    assert_eq!(fixture.property("my.name").as_deref(), Some("microsphere"));

    // publish through the cached client, as an application would
    let client = fixture.registry.get("nacos").unwrap();
    assert!(client
        .publish_config_content(DEFAULT_GROUP, "test.json", r#"{ "my.name": "Microsphere" }"#)
        .unwrap());

    assert!(wait_until(Duration::from_secs(5), || {
        fixture.property("my.name").as_deref() == Some("Microsphere")
    }));
}

#[cfg(feature = "yaml")]
#[test]
fn test_v1_yaml_document_follows_remote_updates() {
    let fixture = Fixture::new();
    fixture
        .server
        .publish(DEFAULT_GROUP, "app.yaml", "my:\n  name: microsphere\n");

    let attributes = SourceAttributes::new("nacos-v1")
        .with_api_version(ApiVersion::V1)
        .with_key("app.yaml");
    fixture.loader.load(&attributes, &fixture.environment).unwrap();
    assert_eq!(fixture.property("my.name").as_deref(), Some("microsphere"));

    fixture
        .server
        .publish(DEFAULT_GROUP, "app.yaml", "my:\n  name: Microsphere\n");
    assert!(wait_until(Duration::from_secs(5), || {
        fixture.property("my.name").as_deref() == Some("Microsphere")
    }));
}

#[test]
fn test_disabled_refresh_keeps_initial_values() {
    let fixture = Fixture::new();
    fixture
        .server
        .publish(DEFAULT_GROUP, "app.properties", "my.name=microsphere");

    let attributes = SourceAttributes::new("static")
        .with_key("app.properties")
        .with_auto_refreshed(false);
    fixture.loader.load(&attributes, &fixture.environment).unwrap();

    fixture
        .server
        .publish(DEFAULT_GROUP, "app.properties", "my.name=Microsphere");
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(fixture.property("my.name").as_deref(), Some("microsphere"));
}

#[test]
fn test_deleted_document_keeps_last_values() {
    let fixture = Fixture::new();
    fixture
        .server
        .publish(DEFAULT_GROUP, "app.properties", "my.name=microsphere");

    let attributes = SourceAttributes::new("nacos").with_key("app.properties");
    fixture.loader.load(&attributes, &fixture.environment).unwrap();

    assert!(fixture.server.remove(DEFAULT_GROUP, "app.properties"));
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(fixture.property("my.name").as_deref(), Some("microsphere"));
}

#[test]
fn test_missing_document_fails_load() {
    let fixture = Fixture::new();
    let attributes = SourceAttributes::new("nacos").with_key("missing.properties");
    let result = fixture.loader.load(&attributes, &fixture.environment);

    assert!(matches!(result, Err(ConfigError::ConfigNotFound { .. })));
    assert!(fixture.environment.source("nacos").is_none());
}

#[test]
fn test_remote_source_overrides_lower_priority_defaults() {
    let fixture = Fixture::new();
    let mut defaults = std::collections::HashMap::new();
    defaults.insert("my.name".to_string(), "default".to_string());
    defaults.insert("my.age".to_string(), "18".to_string());
    fixture
        .environment
        .add_source(Arc::new(ResourcePropertySource::from_values("defaults", 0, defaults)));

    fixture
        .server
        .publish(DEFAULT_GROUP, "app.properties", "my.name=microsphere");
    let attributes = SourceAttributes::new("nacos")
        .with_key("app.properties")
        .with_priority(5);
    fixture.loader.load(&attributes, &fixture.environment).unwrap();

    assert_eq!(fixture.property("my.name").as_deref(), Some("microsphere"));
    assert_eq!(fixture.property("my.age").as_deref(), Some("18"));
    assert_eq!(fixture.environment.source_names(), vec!["nacos", "defaults"]);
}

#[cfg(feature = "yaml")]
#[test]
fn test_sources_from_attributes_file() {
    use std::io::Write;

    let fixture = Fixture::new();
    fixture
        .server
        .publish("APP", "app.properties", "server.port=8080");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "sources:\n  - name: nacos\n    version: V1\n    group: APP\n    keys: [app.properties]"
    )
    .unwrap();

    let attributes_file = AttributesFile::from_file(file.path()).unwrap();
    for attributes in attributes_file.sources() {
        fixture.loader.load(attributes, &fixture.environment).unwrap();
    }

    let port = fixture.environment.get_str("server.port").unwrap();
    assert_eq!(port.as_u32("server.port").unwrap(), 8080);
}
