// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading property source attributes from a YAML file.
//!
//! ```yaml
//! sources:
//!   - name: nacos
//!     server_address: 127.0.0.1:8848
//!     version: V2
//!     keys: [test.json, application.yaml]
//! ```

use crate::domain::{ConfigError, Result, SourceAttributes};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed size of an attributes file (10MB).
const MAX_ATTRIBUTES_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File name looked up in the OS configuration directory.
pub const DEFAULT_ATTRIBUTES_FILE_NAME: &str = "nacos-sources.yaml";

#[derive(Debug, Deserialize)]
struct AttributesDocument {
    #[serde(default)]
    sources: Vec<SourceAttributes>,
}

/// Property source attributes read from a YAML file.
///
/// Every source is validated on load and source names must be unique, since
/// the name is what a client is cached under.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::AttributesFile;
///
/// let file = AttributesFile::parse_str(
///     "sources:\n  - name: nacos\n    version: V1\n    keys: [test.json]\n",
/// )
/// .unwrap();
/// assert_eq!(file.sources()[0].name, "nacos");
/// assert_eq!(file.sources()[0].group, "DEFAULT_GROUP");
/// ```
#[derive(Debug, Clone)]
pub struct AttributesFile {
    file_path: Option<PathBuf>,
    sources: Vec<SourceAttributes>,
}

impl AttributesFile {
    /// Reads attributes from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unknown>")
            .to_string();

        let canonical_path = file_path.canonicalize().map_err(|e| ConfigError::InvalidAttributes {
            message: format!("Invalid or inaccessible attributes file {}: {}", file_name, e),
        })?;

        let metadata = fs::metadata(&canonical_path)?;
        if metadata.len() > MAX_ATTRIBUTES_FILE_SIZE {
            return Err(ConfigError::InvalidAttributes {
                message: format!(
                    "Attributes file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_ATTRIBUTES_FILE_SIZE
                ),
            });
        }

        let content = fs::read_to_string(&canonical_path)?;
        let mut file = Self::parse_str(&content)?;
        tracing::debug!(
            "Loaded {} property source(s) from {}",
            file.sources.len(),
            canonical_path.display()
        );
        file.file_path = Some(canonical_path);
        Ok(file)
    }

    /// Reads `nacos-sources.yaml` from the OS-appropriate configuration directory.
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
            ConfigError::InvalidAttributes {
                message: "Failed to determine project directories".to_string(),
            }
        })?;

        Self::from_file(proj_dirs.config_dir().join(DEFAULT_ATTRIBUTES_FILE_NAME))
    }

    /// Parses attributes from YAML text.
    pub fn parse_str(content: &str) -> Result<Self> {
        let document: AttributesDocument =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse attributes file: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut names = HashSet::new();
        for source in &document.sources {
            source.validate()?;
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::InvalidAttributes {
                    message: format!("Duplicate property source name '{}'", source.name),
                });
            }
        }

        Ok(Self {
            file_path: None,
            sources: document.sources,
        })
    }

    /// The canonical path the attributes were read from, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// The configured sources in file order.
    pub fn sources(&self) -> &[SourceAttributes] {
        &self.sources
    }

    /// Looks up a source by name.
    pub fn source(&self, name: &str) -> Option<&SourceAttributes> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Consumes the file and returns its sources.
    pub fn into_sources(self) -> Vec<SourceAttributes> {
        self.sources
    }
}
