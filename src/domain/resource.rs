// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory configuration resources.

use crate::domain::errors::{ConfigError, Result};
use std::fmt;

/// Fetched or pushed configuration content held in memory.
///
/// Resources produced while resolving a source are named after the data id they
/// were fetched from. Resources built from change events carry no name; the data id
/// travels next to them instead.
///
/// # Examples
///
/// ```
/// use nacoscfg::domain::Resource;
///
/// let resource = Resource::named("test.json", br#"{"my.name":"microsphere"}"#.to_vec());
/// assert_eq!(resource.name(), Some("test.json"));
/// assert_eq!(resource.extension(), Some("json"));
/// assert_eq!(resource.as_str().unwrap(), r#"{"my.name":"microsphere"}"#);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Resource {
    name: Option<String>,
    content: Vec<u8>,
}

impl Resource {
    /// Creates a resource identified by `name`.
    pub fn named(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: Some(name.into()),
            content: content.into(),
        }
    }

    /// Creates an unnamed resource.
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            content: content.into(),
        }
    }

    /// The identifying name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// A human readable description used in logs and errors.
    pub fn description(&self) -> String {
        match &self.name {
            Some(name) => format!("Byte array resource [{}]", name),
            None => "Byte array resource [resource loaded from byte array]".to_string(),
        }
    }

    /// The file extension of the name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.name.as_deref().and_then(extension_of)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// The content as UTF-8 text.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.content).map_err(|e| ConfigError::ParseError {
            message: format!("{} is not valid UTF-8", self.description()),
            source: Some(Box::new(e)),
        })
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the resource holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Consumes the resource and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Returns the extension of a data id such as `application.yaml`.
pub(crate) fn extension_of(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        None
    } else {
        Some(ext)
    }
}
