// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration content parser trait definition.
//!
//! Remote resources are structured documents (JSON, YAML, properties). A parser turns
//! one document into the flat property map a property source serves.

use crate::domain::{Resource, Result};
use std::collections::HashMap;

/// Parses configuration content into flat properties.
///
/// Nested structures are flattened with dot notation, so
///
/// ```json
/// { "my": { "name": "microsphere" } }
/// ```
///
/// and `{ "my.name": "microsphere" }` both yield `my.name -> "microsphere"`.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::ports::ConfigParser;
/// use nacoscfg::domain::Result;
/// use std::collections::HashMap;
///
/// struct LineParser;
///
/// impl ConfigParser for LineParser {
///     fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
///         Ok(content
///             .lines()
///             .filter_map(|line| line.split_once(':'))
///             .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
///             .collect())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
///
/// let map = LineParser.parse("my.name: microsphere").unwrap();
/// assert_eq!(map.get("my.name"), Some(&"microsphere".to_string()));
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses document text into a flat key/value map.
    fn parse(&self, content: &str) -> Result<HashMap<String, String>>;

    /// The file extensions (without the dot) this parser handles.
    fn supported_extensions(&self) -> &[&str];

    /// Parses the content of a resource.
    fn parse_resource(&self, resource: &Resource) -> Result<HashMap<String, String>> {
        self.parse(resource.as_str()?)
    }

    /// Whether this parser handles the given extension, ignoring case.
    fn supports(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
