// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties content parser.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::collections::HashMap;

/// Parses `key=value` properties documents.
///
/// Supported syntax: `=`, `:` or whitespace separators, `#` and `!` comment lines,
/// blank lines, and a trailing backslash to continue a value on the next line. A
/// line holding only a key maps it to an empty value. Later duplicates win.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::PropertiesParser;
/// use nacoscfg::ports::ConfigParser;
///
/// let map = PropertiesParser::new()
///     .parse("# owner\nmy.name = microsphere\nmy.city: Hangzhou\n")
///     .unwrap();
/// assert_eq!(map.get("my.name"), Some(&"microsphere".to_string()));
/// assert_eq!(map.get("my.city"), Some(&"Hangzhou".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }

    /// Splits at the first `=`, `:` or whitespace ending the key.
    fn split_entry(line: &str) -> (&str, &str) {
        let line = line.trim();
        let Some(idx) = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace()) else {
            return (line, "");
        };
        let key = &line[..idx];
        let rest = line[idx..].trim_start();
        // `key = value` has whitespace before the real separator
        let value = rest
            .strip_prefix(['=', ':'])
            .map(str::trim_start)
            .unwrap_or(rest);
        (key, value.trim_end())
    }
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let mut result = HashMap::new();
        let mut pending = String::new();

        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            // continuation
            if let Some(stripped) = line.strip_suffix('\\') {
                pending.push_str(stripped);
                continue;
            }
            pending.push_str(line);

            let entry = std::mem::take(&mut pending);
            let (key, value) = Self::split_entry(&entry);
            if key.is_empty() {
                return Err(ConfigError::ParseError {
                    message: format!("Empty property name at line {}", number + 1),
                    source: None,
                });
            }
            result.insert(key.to_string(), value.to_string());
        }

        if !pending.is_empty() {
            let (key, value) = Self::split_entry(&pending);
            if !key.is_empty() {
                result.insert(key.to_string(), value.to_string());
            }
        }

        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}
