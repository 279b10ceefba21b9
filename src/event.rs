//! Nostr event model as consumed by the NIP-34 parsers.

use serde::{Deserialize, Serialize};

/// Kind of a git repository announcement (addressable, keyed by its `d` tag).
pub const REPO_ANNOUNCEMENT_KIND: u32 = 30617;

/// Kind of a git patch event.
pub const PATCH_KIND: u32 = 1617;

/// A tag expressed as an array of strings.
///
/// The first element names the tag and the rest hold its values, e.g.
/// `["clone", "https://example.com/repo.git", "git@example.com:repo.git"]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag(pub Vec<String>);

impl Tag {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tag(parts.into_iter().map(Into::into).collect())
    }

    /// Tag name, `None` for an empty tag.
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// First value after the name.
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// Every value after the name, in order.
    pub fn values(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// A signed protocol event.
///
/// ```json
/// {
///   "id": "5c83...",
///   "pubkey": "a008...",
///   "kind": 30617,
///   "created_at": 1700000000,
///   "tags": [["d", "gitstr"], ["clone", "https://example.com/gitstr.git"]],
///   "content": "",
///   "sig": "deadbeef"
/// }
/// ```
///
/// Signatures are carried but never verified here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Event identifier (hex of SHA-256 hash).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    pub kind: u32,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sig: String,
}

impl Event {
    /// First tag carrying the given name.
    pub fn find_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name() == Some(name))
    }

    pub fn classify(&self) -> EventKind {
        EventKind::from(self.kind)
    }
}

/// Coarse classification used to route events to a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Repo,
    Patch,
    Other(u32),
}

impl From<u32> for EventKind {
    fn from(kind: u32) -> Self {
        match kind {
            REPO_ANNOUNCEMENT_KIND => EventKind::Repo,
            PATCH_KIND => EventKind::Patch,
            other => EventKind::Other(other),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Repo => write!(f, "repo"),
            EventKind::Patch => write!(f, "patch"),
            EventKind::Other(kind) => write!(f, "kind {}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_accessors() {
        let tag = Tag::new(["clone", "a", "b"]);
        assert_eq!(tag.name(), Some("clone"));
        assert_eq!(tag.value(), Some("a"));
        assert_eq!(tag.values(), &["a".to_string(), "b".to_string()]);
        assert_eq!(tag.get(2), Some("b"));
        assert_eq!(tag.get(3), None);
    }

    #[test]
    fn test_empty_tag_has_no_name_or_values() {
        let tag = Tag::default();
        assert_eq!(tag.name(), None);
        assert_eq!(tag.value(), None);
        assert!(tag.values().is_empty());
    }

    #[test]
    fn test_deserialize_event_with_missing_optional_fields() {
        let json = r#"{"id":"ab","pubkey":"cd","kind":1617,"tags":[["a","30617:cd:repo"]]}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, PATCH_KIND);
        assert_eq!(event.created_at, 0);
        assert!(event.content.is_empty());
        assert_eq!(event.find_tag("a").and_then(Tag::value), Some("30617:cd:repo"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(EventKind::from(30617), EventKind::Repo);
        assert_eq!(EventKind::from(1617), EventKind::Patch);
        assert_eq!(EventKind::from(1), EventKind::Other(1));
        assert_eq!(EventKind::Other(7).to_string(), "kind 7");
    }
}
