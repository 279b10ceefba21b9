use tracing::debug;

use super::types::RepoRef;
use crate::event::{Event, REPO_ANNOUNCEMENT_KIND};

/// Resolve the repository a patch points at through its first `a` tag.
///
/// The tag value is `<kind>:<owner>:<id>` and an optional third tag element
/// is taken as a single relay hint. Fields past the third are ignored, and
/// the kind must be spelled exactly `30617`. Returns `None` when the tag is
/// missing, has fewer than three fields, or addresses anything other than a
/// repository announcement.
pub fn resolve_repo_ref(event: &Event) -> Option<RepoRef> {
    let tag = event.find_tag("a")?;
    let Some(value) = tag.value() else {
        debug!(event = %event.id, "a tag has no value");
        return None;
    };

    let mut fields = value.split(':');
    let (Some(kind), Some(owner), Some(id)) = (fields.next(), fields.next(), fields.next()) else {
        debug!(event = %event.id, address = value, "malformed a tag");
        return None;
    };

    if kind != REPO_ANNOUNCEMENT_KIND.to_string() {
        debug!(event = %event.id, kind, "a tag does not address a repository");
        return None;
    }

    let relays = tag
        .get(2)
        .filter(|relay| !relay.is_empty())
        .map(|relay| vec![relay.to_string()])
        .unwrap_or_default();

    Some(RepoRef {
        owner: owner.to_string(),
        id: id.to_string(),
        relays,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Tag, PATCH_KIND};

    fn event_with_tags(tags: Vec<Tag>) -> Event {
        Event {
            id: "e1".to_string(),
            pubkey: "author".to_string(),
            kind: PATCH_KIND,
            created_at: 0,
            tags,
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_resolves_repo_triple() {
        let event = event_with_tags(vec![Tag::new(["a", "30617:ownerX:repoY"])]);
        let repo = resolve_repo_ref(&event).unwrap();
        assert_eq!(repo.owner, "ownerX");
        assert_eq!(repo.id, "repoY");
        assert!(repo.relays.is_empty());
    }

    #[test]
    fn test_third_element_is_relay_hint() {
        let event = event_with_tags(vec![Tag::new([
            "a",
            "30617:ownerX:repoY",
            "wss://relay.example",
        ])]);
        let repo = resolve_repo_ref(&event).unwrap();
        assert_eq!(repo.relays, vec!["wss://relay.example"]);
    }

    #[test]
    fn test_other_kind_is_absent() {
        let event = event_with_tags(vec![Tag::new(["a", "1:ownerX:repoY"])]);
        assert!(resolve_repo_ref(&event).is_none());
    }

    #[test]
    fn test_missing_or_malformed_tag_is_absent() {
        assert!(resolve_repo_ref(&event_with_tags(vec![])).is_none());
        assert!(resolve_repo_ref(&event_with_tags(vec![Tag::new(["a"])])).is_none());
        assert!(
            resolve_repo_ref(&event_with_tags(vec![Tag::new(["a", "30617:onlyonefield"])]))
                .is_none()
        );
    }

    #[test]
    fn test_kind_must_match_exactly() {
        for address in ["+30617:ownerX:repoY", "030617:ownerX:repoY", " 30617:ownerX:repoY"] {
            let event = event_with_tags(vec![Tag::new(["a", address])]);
            assert!(resolve_repo_ref(&event).is_none(), "{} should not resolve", address);
        }
    }

    #[test]
    fn test_empty_owner_is_kept() {
        let event = event_with_tags(vec![Tag::new(["a", "30617::repo"])]);
        let repo = resolve_repo_ref(&event).unwrap();
        assert_eq!(repo.owner, "");
        assert_eq!(repo.id, "repo");
    }

    #[test]
    fn test_only_first_a_tag_counts() {
        let event = event_with_tags(vec![
            Tag::new(["a", "1:x:y"]),
            Tag::new(["a", "30617:ownerX:repoY"]),
        ]);
        assert!(resolve_repo_ref(&event).is_none());
    }

    #[test]
    fn test_fields_past_the_third_are_ignored() {
        let event = event_with_tags(vec![Tag::new(["a", "30617:ownerX:team:repo"])]);
        assert_eq!(resolve_repo_ref(&event).unwrap().id, "team");
    }
}
