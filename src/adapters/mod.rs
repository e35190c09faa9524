// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing the concrete clients, parsers and property sources.
//!
//! Clients implement [`ConfigClient`](crate::ports::ConfigClient) for a particular
//! transport, parsers implement [`ConfigParser`] for a document format, and the
//! property sources turn parsed resources into something the environment can query.

#[cfg(feature = "yaml")]
pub mod attributes_file;
pub mod composite;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "json")]
pub mod json;
pub mod memory;
pub mod properties;
pub mod resource_source;
#[cfg(feature = "yaml")]
pub mod yaml;

#[cfg(feature = "yaml")]
pub use attributes_file::{AttributesFile, DEFAULT_ATTRIBUTES_FILE_NAME};
pub use composite::CompositePropertySource;
#[cfg(feature = "http")]
pub use http::{OpenApiClient, OpenApiClientFactory};
#[cfg(feature = "json")]
pub use json::JsonParser;
pub use memory::{InMemoryClientFactory, InMemoryConfigClient, InMemoryConfigServer};
pub use properties::PropertiesParser;
pub use resource_source::ResourcePropertySource;
#[cfg(feature = "yaml")]
pub use yaml::YamlParser;

use crate::domain::resource::extension_of;
use crate::ports::ConfigParser;

/// Picks the parser for a data id by its extension.
///
/// `json` and `yaml`/`yml` map to their parsers when the matching feature is
/// enabled; anything else is read as a properties document.
///
/// # Examples
///
/// ```rust
/// use nacoscfg::adapters::parser_for;
///
/// let parser = parser_for("application.properties");
/// let map = parser.parse("my.name=microsphere").unwrap();
/// assert_eq!(map.get("my.name"), Some(&"microsphere".to_string()));
/// ```
pub fn parser_for(data_id: &str) -> Box<dyn ConfigParser> {
    let extension = extension_of(data_id).unwrap_or_default();

    #[cfg(feature = "json")]
    {
        let parser = JsonParser::new();
        if parser.supports(extension) {
            return Box::new(parser);
        }
    }

    #[cfg(feature = "yaml")]
    {
        let parser = YamlParser::new();
        if parser.supports(extension) {
            return Box::new(parser);
        }
    }

    tracing::trace!(
        "Reading '{}' as properties (extension '{}')",
        data_id,
        extension
    );
    Box::new(PropertiesParser::new())
}
