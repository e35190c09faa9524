// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests check the registry, attributes and parsers against arbitrary inputs.

mod common;

use common::ScriptedFactory;
use nacoscfg::adapters::PropertiesParser;
use nacoscfg::domain::{ApiVersion, ConfigError, ConfigKey, ConfigValue, SourceAttributes};
use nacoscfg::ports::ConfigParser;
use nacoscfg::service::ClientRegistry;
use proptest::prelude::*;
use std::sync::Arc;

// Unrecognized versions fail for every server address
proptest! {
    #[test]
    fn test_unsupported_version_for_any_address(
        address in "\\PC*",
        version in "[a-zA-Z0-9.]{0,8}"
            .prop_filter("recognized versions", |v| {
                !matches!(v.to_ascii_lowercase().as_str(), "v1" | "1" | "v2" | "2")
            })
    ) {
        let factory = Arc::new(ScriptedFactory::default());
        let registry = ClientRegistry::new(factory.clone());
        let attributes = SourceAttributes::new("nacos")
            .with_server_address(address)
            .with_version(version.clone());

        let result = registry.get_or_create(&attributes);
        prop_assert!(
            matches!(result, Err(ConfigError::UnsupportedApiVersion { .. })),
            "version '{}' was accepted",
            version
        );
        prop_assert_eq!(factory.created_count(), 0);
    }
}

// Recognized versions parse regardless of case and surrounding whitespace
proptest! {
    #[test]
    fn test_recognized_versions_parse(
        upper in prop::bool::ANY,
        v2 in prop::bool::ANY,
        padding in " {0,3}"
    ) {
        let name = match (v2, upper) {
            (false, false) => "v1",
            (false, true) => "V1",
            (true, false) => "v2",
            (true, true) => "V2",
        };
        let raw = format!("{}{}{}", padding, name, padding);
        let expected = if v2 { ApiVersion::V2 } else { ApiVersion::V1 };
        prop_assert_eq!(raw.parse::<ApiVersion>().unwrap(), expected);
    }
}

// ConfigKey can be created from any string
proptest! {
    #[test]
    fn test_config_key_from_any_string(s in "\\PC*") {
        let key = ConfigKey::from(s.clone());
        prop_assert_eq!(key.as_str(), s.as_str());
    }
}

// ConfigValue integer parsing agrees with the standard library
proptest! {
    #[test]
    fn test_config_value_i64(n in any::<i64>()) {
        let value = ConfigValue::from(n.to_string());
        prop_assert_eq!(value.as_i64("n").unwrap(), n);
    }
}

// Simple key=value lines parse to exactly what was written
proptest! {
    #[test]
    fn test_properties_simple_entries(
        entries in prop::collection::hash_map("[a-z][a-z0-9.]{0,12}", "[a-zA-Z0-9 _-]{0,16}", 0..8)
    ) {
        let content: String = entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect();
        let parsed = PropertiesParser::new().parse(&content).unwrap();

        prop_assert_eq!(parsed.len(), entries.len());
        for (key, value) in &entries {
            prop_assert_eq!(parsed.get(key).map(String::as_str), Some(value.trim()));
        }
    }
}
