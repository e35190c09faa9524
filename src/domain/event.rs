// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration change events delivered by config clients.

use std::fmt;

/// What happened to a remote configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The data id did not exist before and now has content.
    Created,
    /// The content of an existing data id changed.
    Modified,
    /// The data id was removed from the server.
    Deleted,
    /// Any other notification a client may forward.
    Other,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Created => "created",
            EventKind::Modified => "modified",
            EventKind::Deleted => "deleted",
            EventKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// A change notification for one data id.
///
/// # Examples
///
/// ```
/// use nacoscfg::domain::{ConfigEvent, EventKind};
///
/// let event = ConfigEvent::modified("DEFAULT_GROUP", "test.json", "{}");
/// assert_eq!(event.kind(), EventKind::Modified);
/// assert!(event.triggers_refresh());
///
/// let event = ConfigEvent::deleted("DEFAULT_GROUP", "test.json");
/// assert!(event.content().is_none());
/// assert!(!event.triggers_refresh());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigEvent {
    data_id: String,
    group: String,
    content: Option<String>,
    kind: EventKind,
}

impl ConfigEvent {
    /// Creates an event from its parts.
    pub fn new(
        group: impl Into<String>,
        data_id: impl Into<String>,
        content: Option<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            data_id: data_id.into(),
            group: group.into(),
            content,
            kind,
        }
    }

    /// A creation event carrying the new content.
    pub fn created(
        group: impl Into<String>,
        data_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(group, data_id, Some(content.into()), EventKind::Created)
    }

    /// A modification event carrying the new content.
    pub fn modified(
        group: impl Into<String>,
        data_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(group, data_id, Some(content.into()), EventKind::Modified)
    }

    /// A deletion event; deleted configurations have no content.
    pub fn deleted(group: impl Into<String>, data_id: impl Into<String>) -> Self {
        Self::new(group, data_id, None, EventKind::Deleted)
    }

    /// The data id the event is about.
    pub fn data_id(&self) -> &str {
        &self.data_id
    }

    /// The group of the data id.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The content after the change, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// The kind of change.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Whether the event signals creation.
    pub fn is_created(&self) -> bool {
        self.kind == EventKind::Created
    }

    /// Whether the event signals modification.
    pub fn is_modified(&self) -> bool {
        self.kind == EventKind::Modified
    }

    /// Whether the event signals deletion.
    pub fn is_deleted(&self) -> bool {
        self.kind == EventKind::Deleted
    }

    /// Only creations and modifications are pushed into property sources.
    pub fn triggers_refresh(&self) -> bool {
        self.is_created() || self.is_modified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_event() {
        let event = ConfigEvent::created("G", "a.json", "{}");
        assert!(event.is_created());
        assert!(event.triggers_refresh());
        assert_eq!(event.group(), "G");
        assert_eq!(event.data_id(), "a.json");
        assert_eq!(event.content(), Some("{}"));
    }

    #[test]
    fn test_other_event_does_not_refresh() {
        let event = ConfigEvent::new("G", "a.json", Some("x".to_string()), EventKind::Other);
        assert!(!event.triggers_refresh());
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Created.to_string(), "created");
        assert_eq!(EventKind::Deleted.to_string(), "deleted");
    }
}
