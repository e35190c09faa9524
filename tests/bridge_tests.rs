// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the change bridge between clients and refreshers.

mod common;

use common::{init_tracing, wait_until, RecordingRefresher, ScriptedFactory};
use nacoscfg::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn setup(keys: &[&str]) -> (NacosPropertySourceLoader, Arc<ScriptedFactory>, SourceAttributes) {
    let factory = Arc::new(ScriptedFactory::default());
    let registry = Arc::new(ClientRegistry::new(factory.clone()));
    let attributes = keys
        .iter()
        .fold(SourceAttributes::new("nacos"), |attrs, key| attrs.with_key(*key));
    (NacosPropertySourceLoader::new(registry), factory, attributes)
}

#[test]
fn test_modified_event_refreshes_once_with_content() {
    init_tracing();
    let (loader, factory, attributes) = setup(&["test.json"]);
    let refresher = Arc::new(RecordingRefresher::default());
    loader
        .configure_refresher(&attributes, &attributes.keys, refresher.clone())
        .unwrap();

    let created = factory.created();
    let client = &created[0];
    let content = r#"{"my.name":"Microsphere"}"#;
    let results = client.emit(ConfigEvent::modified(DEFAULT_GROUP, "test.json", content));

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(
        refresher.calls(),
        vec![("test.json".to_string(), content.as_bytes().to_vec())]
    );
}

#[test]
fn test_created_event_refreshes() {
    let (loader, factory, attributes) = setup(&["test.json"]);
    let refresher = Arc::new(RecordingRefresher::default());
    loader
        .configure_refresher(&attributes, &attributes.keys, refresher.clone())
        .unwrap();

    factory.created()[0].emit(ConfigEvent::created(DEFAULT_GROUP, "test.json", "{}"));
    assert_eq!(refresher.calls().len(), 1);
}

#[test]
fn test_deleted_and_other_events_never_refresh() {
    let (loader, factory, attributes) = setup(&["test.json"]);
    let refresher = Arc::new(RecordingRefresher::default());
    loader
        .configure_refresher(&attributes, &attributes.keys, refresher.clone())
        .unwrap();

    let created = factory.created();
    let client = &created[0];
    client.emit(ConfigEvent::deleted(DEFAULT_GROUP, "test.json"));
    client.emit(ConfigEvent::new(
        DEFAULT_GROUP,
        "test.json",
        Some("{}".to_string()),
        EventKind::Other,
    ));
    assert!(refresher.calls().is_empty());
}

#[test]
fn test_one_listener_per_key() {
    let (loader, factory, attributes) = setup(&["a.json", "b.yaml"]);
    loader
        .configure_refresher(
            &attributes,
            &attributes.keys,
            Arc::new(RecordingRefresher::default()),
        )
        .unwrap();

    let created = factory.created();
    let client = &created[0];
    assert_eq!(client.listener_count("a.json"), 1);
    assert_eq!(client.listener_count("b.yaml"), 1);
    assert_eq!(client.listener_count("c.json"), 0);
}

#[test]
fn test_refresh_runs_on_the_notification_thread() {
    let (loader, factory, attributes) = setup(&["test.json"]);
    let refresher = Arc::new(RecordingRefresher::default());
    loader
        .configure_refresher(&attributes, &attributes.keys, refresher.clone())
        .unwrap();

    factory.created()[0].emit(ConfigEvent::modified(DEFAULT_GROUP, "test.json", "{}"));
    assert_ne!(refresher.threads()[0], thread::current().id());
}

#[test]
fn test_refresh_failure_is_surfaced_and_delivery_continues() {
    init_tracing();
    let (loader, factory, attributes) = setup(&["test.json"]);
    let refresher = Arc::new(RecordingRefresher::failing());
    loader
        .configure_refresher(&attributes, &attributes.keys, refresher.clone())
        .unwrap();

    let created = factory.created();
    let client = &created[0];
    let first = client.emit(ConfigEvent::modified(DEFAULT_GROUP, "test.json", "1"));
    match &first[0] {
        Err(ConfigError::RefreshError { data_id, source }) => {
            assert_eq!(data_id, "test.json");
            assert!(matches!(**source, ConfigError::ParseError { .. }));
        }
        other => panic!("expected a refresh error, got {:?}", other.as_ref().err()),
    }

    client.emit(ConfigEvent::modified(DEFAULT_GROUP, "test.json", "2"));
    assert_eq!(refresher.calls().len(), 2);
}

#[test]
fn test_in_memory_client_keeps_delivering_after_refresh_failure() {
    init_tracing();
    let server = InMemoryConfigServer::new();
    server.publish(DEFAULT_GROUP, "test.json", "0");
    let registry = Arc::new(ClientRegistry::new(Arc::new(InMemoryClientFactory::new(
        server.clone(),
    ))));
    let loader = NacosPropertySourceLoader::new(registry.clone());
    let attributes = SourceAttributes::new("nacos").with_key("test.json");

    let refresher = Arc::new(RecordingRefresher::failing());
    loader
        .configure_refresher(&attributes, &attributes.keys, refresher.clone())
        .unwrap();

    server.publish(DEFAULT_GROUP, "test.json", "1");
    server.publish(DEFAULT_GROUP, "test.json", "2");
    assert!(wait_until(Duration::from_secs(5), || refresher.calls().len() == 2));
    assert_eq!(refresher.calls()[1].1, b"2".to_vec());

    registry.shutdown();
}
