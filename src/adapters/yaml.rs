// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML content parser.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_yaml::Value;
use std::collections::HashMap;

/// Parses YAML documents into flat properties.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::YamlParser;
/// use nacoscfg::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let map = parser.parse("my:\n  name: microsphere\n  tags: [a, b]").unwrap();
/// assert_eq!(map.get("my.name"), Some(&"microsphere".to_string()));
/// assert_eq!(map.get("my.tags.1"), Some(&"b".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn flatten(value: &Value, prefix: &str, result: &mut HashMap<String, String>) {
        match value {
            Value::Mapping(map) => {
                for (key, val) in map {
                    let key_str = match key {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => continue,
                    };
                    let new_prefix = if prefix.is_empty() {
                        key_str
                    } else {
                        format!("{}.{}", prefix, key_str)
                    };
                    Self::flatten(val, &new_prefix, result);
                }
            }
            Value::Sequence(seq) => {
                for (i, val) in seq.iter().enumerate() {
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
            Value::Tagged(tagged) => Self::flatten(&tagged.value, prefix, result),
        }
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse YAML: {}", e),
            source: Some(Box::new(e)),
        })?;

        let mut result = HashMap::new();
        match value {
            Value::Mapping(_) => Self::flatten(&value, "", &mut result),
            Value::Null => {}
            _ => {
                return Err(ConfigError::ParseError {
                    message: "YAML configuration must be a mapping at the top level".to_string(),
                    source: None,
                })
            }
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_mapping() {
        let yaml = r#"
spring:
  datasource:
    url: jdbc:h2:mem
    pool: 8
"#;
        let map = YamlParser::new().parse(yaml).unwrap();
        assert_eq!(
            map.get("spring.datasource.url"),
            Some(&"jdbc:h2:mem".to_string())
        );
        assert_eq!(map.get("spring.datasource.pool"), Some(&"8".to_string()));
    }

    #[test]
    fn test_mixed_scalars() {
        let yaml = "enabled: true\nratio: 0.5\nempty: null\n";
        let map = YamlParser::new().parse(yaml).unwrap();
        assert_eq!(map.get("enabled"), Some(&"true".to_string()));
        assert_eq!(map.get("ratio"), Some(&"0.5".to_string()));
        assert_eq!(map.get("empty"), Some(&String::new()));
    }

    #[test]
    fn test_numeric_keys() {
        let map = YamlParser::new().parse("codes:\n  404: missing").unwrap();
        assert_eq!(map.get("codes.404"), Some(&"missing".to_string()));
    }

    #[test]
    fn test_empty_document() {
        assert!(YamlParser::new().parse("").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        assert!(YamlParser::new().parse("just a string").is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(YamlParser::new().parse("invalid: yaml: content:").is_err());
    }

    #[test]
    fn test_supported_extensions() {
        let parser = YamlParser::new();
        assert!(parser.supports("yaml"));
        assert!(parser.supports("YML"));
        assert!(!parser.supports("json"));
    }
}
