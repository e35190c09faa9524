// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON content parser.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_json::Value;
use std::collections::HashMap;

/// Parses JSON documents into flat properties.
///
/// The document root must be an object (or `null`, which yields no properties).
/// Nested objects are joined with dots and array elements are addressed by index.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::JsonParser;
/// use nacoscfg::ports::ConfigParser;
///
/// let parser = JsonParser::new();
/// let map = parser
///     .parse(r#"{"my.name":"microsphere","server":{"ports":[80,443]}}"#)
///     .unwrap();
/// assert_eq!(map.get("my.name"), Some(&"microsphere".to_string()));
/// assert_eq!(map.get("server.ports.1"), Some(&"443".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Creates a new JSON parser.
    pub fn new() -> Self {
        JsonParser
    }

    fn flatten(value: &Value, prefix: &str, result: &mut HashMap<String, String>) {
        match value {
            Value::Object(map) => {
                for (key, val) in map {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten(val, &new_prefix, result);
                }
            }
            Value::Array(items) => {
                for (i, val) in items.iter().enumerate() {
                    Self::flatten(val, &format!("{}.{}", prefix, i), result);
                }
            }
            Value::String(s) => {
                result.insert(prefix.to_string(), s.clone());
            }
            Value::Number(n) => {
                result.insert(prefix.to_string(), n.to_string());
            }
            Value::Bool(b) => {
                result.insert(prefix.to_string(), b.to_string());
            }
            Value::Null => {
                result.insert(prefix.to_string(), String::new());
            }
        }
    }
}

impl ConfigParser for JsonParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let value: Value = serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse JSON: {}", e),
            source: Some(Box::new(e)),
        })?;

        let mut result = HashMap::new();
        match value {
            Value::Object(_) => Self::flatten(&value, "", &mut result),
            Value::Null => {}
            _ => {
                return Err(ConfigError::ParseError {
                    message: "JSON configuration must be an object at the top level".to_string(),
                    source: None,
                })
            }
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}
