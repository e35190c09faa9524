// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the nacoscfg crate.
//!
//! Every fallible operation in the crate returns [`ConfigError`]. Client-level failures
//! are carried unchanged from the client that produced them up to the caller, so the
//! caller's own startup or supervision logic decides what to do with them.

use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for nacoscfg operations.
///
/// # Examples
///
/// ```
/// use nacoscfg::domain::errors::ConfigError;
///
/// let error = ConfigError::UnsupportedApiVersion {
///     version: "v3".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unsupported nacos open api version v3");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested property was not found in any property source.
    #[error("Property not found: {key}")]
    PropertyNotFound {
        /// The property name that was not found
        key: String,
    },

    /// Failed to convert a property value to the requested type.
    #[error("Failed to convert property value for key '{key}' to type {target_type}: {source}")]
    TypeConversionError {
        /// The property being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The configured API version is neither of the two supported dialects.
    #[error("Unsupported nacos open api version {version}")]
    UnsupportedApiVersion {
        /// The raw version value that was rejected
        version: String,
    },

    /// Source attributes are incomplete or contradictory.
    #[error("Invalid property source attributes: {message}")]
    InvalidAttributes {
        /// What is wrong with the attributes
        message: String,
    },

    /// The remote configuration does not exist.
    #[error("Configuration not found: dataId '{data_id}' in group '{group}'")]
    ConfigNotFound {
        /// The data id that was requested
        data_id: String,
        /// The group the data id was requested in
        group: String,
    },

    /// A configuration client failed to talk to its server.
    #[error("Config client '{client}' error: {message}")]
    ClientError {
        /// A short description of the client that failed
        client: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The client has already been closed.
    #[error("Config client '{client}' is closed")]
    ClientClosed {
        /// A short description of the closed client
        client: String,
    },

    /// The client registry has been shut down and no longer hands out clients.
    #[error("Config client registry has been shut down")]
    RegistryShutdown,

    /// Pushing changed content into the property sources failed.
    #[error("Failed to refresh property source for dataId '{data_id}': {source}")]
    RefreshError {
        /// The data id whose change could not be applied
        data_id: String,
        /// The error raised by the refresher
        source: Box<ConfigError>,
    },

    /// Failed to parse configuration content.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Registering or running a change listener failed.
    #[error("Configuration watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }

    /// Wraps a refresher failure for the given data id.
    pub fn refresh(data_id: impl Into<String>, err: ConfigError) -> Self {
        ConfigError::RefreshError {
            data_id: data_id.into(),
            source: Box::new(err),
        }
    }
}

/// A specialized Result type for nacoscfg operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_not_found_error() {
        let error = ConfigError::PropertyNotFound {
            key: "my.name".to_string(),
        };
        assert_eq!(error.to_string(), "Property not found: my.name");
    }

    #[test]
    fn test_unsupported_api_version_error() {
        let error = ConfigError::UnsupportedApiVersion {
            version: "V3".to_string(),
        };
        assert_eq!(error.to_string(), "Unsupported nacos open api version V3");
    }

    #[test]
    fn test_config_not_found_error() {
        let error = ConfigError::ConfigNotFound {
            data_id: "test.json".to_string(),
            group: "DEFAULT_GROUP".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration not found: dataId 'test.json' in group 'DEFAULT_GROUP'"
        );
    }

    #[test]
    fn test_client_error() {
        let error = ConfigError::ClientError {
            client: "nacos-v2@127.0.0.1:8848".to_string(),
            message: "connection refused".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Config client 'nacos-v2@127.0.0.1:8848' error: connection refused"
        );
    }

    #[test]
    fn test_refresh_error_wraps_source() {
        let inner = ConfigError::ParseError {
            message: "bad json".to_string(),
            source: None,
        };
        let error = ConfigError::refresh("test.json", inner);
        assert!(error.to_string().contains("test.json"));
        assert!(error.to_string().contains("bad json"));
        match error {
            ConfigError::RefreshError { source, .. } => {
                assert!(matches!(*source, ConfigError::ParseError { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = ConfigError::from(io_error);
        assert!(matches!(error, ConfigError::IoError(_)));
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "not_a_number".parse::<i32>().unwrap_err();
        let error = ConfigError::from_parse_int_error("server.port".to_string(), parse_err);
        assert!(matches!(error, ConfigError::TypeConversionError { .. }));
        assert!(error.to_string().contains("integer"));
    }

    #[test]
    fn test_from_parse_bool_error() {
        let parse_err = "maybe".parse::<bool>().unwrap_err();
        let error = ConfigError::from_parse_bool_error("feature.on".to_string(), parse_err);
        assert!(error.to_string().contains("boolean"));
    }
}
