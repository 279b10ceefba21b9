pub mod address;
pub mod diff;
pub mod segment;
pub mod types;

pub use address::resolve_repo_ref;
pub use diff::{DiffError, DiffTokenizer, UnifiedDiffTokenizer};
pub use types::{FileChange, Hunk, Patch, RepoRef};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::event::Event;

/// Why a patch event was rejected. Callers of [`parse_patch`] only see
/// `None`; the reason is logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("no diffstat line found in patch body")]
    NoDiffStat,

    #[error("diff contains no file changes")]
    NoFileChanges,

    #[error("Failed to parse diff: {0}")]
    Diff(#[from] DiffError),
}

/// Parse a patch event with the default unified diff tokenizer.
///
/// Returns `None` for anything that is not a usable patch; a missing or
/// foreign `a` tag only leaves `repo` unset.
pub fn parse_patch(event: &Event, source_relays: &[String]) -> Option<Patch> {
    parse_patch_with(&UnifiedDiffTokenizer, event, source_relays)
}

pub fn parse_patch_with<T: DiffTokenizer>(
    tokenizer: &T,
    event: &Event,
    source_relays: &[String],
) -> Option<Patch> {
    match try_parse_patch(tokenizer, event, source_relays) {
        Ok(patch) => Some(patch),
        Err(err) => {
            debug!(event = %event.id, error = %err, "skipping patch event");
            None
        }
    }
}

/// Same as [`parse_patch_with`] but keeps the rejection reason.
#[instrument(skip_all, fields(event = %event.id))]
pub fn try_parse_patch<T: DiffTokenizer>(
    tokenizer: &T,
    event: &Event,
    source_relays: &[String],
) -> Result<Patch, PatchError> {
    let parts = segment::segment(&event.content).ok_or(PatchError::NoDiffStat)?;

    let files = tokenizer.tokenize(parts.diff)?;
    if files.is_empty() {
        return Err(PatchError::NoFileChanges);
    }
    debug!(files = files.len(), "tokenized patch diff");

    let repo = resolve_repo_ref(event);
    if repo.is_none() {
        debug!("patch has no repository reference");
    }

    Ok(Patch {
        event: event.clone(),
        preamble: parts.preamble.to_string(),
        comment: parts.comment.to_string(),
        files,
        source_relays: source_relays.to_vec(),
        repo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Tag, PATCH_KIND};
    use crate::nip19::{self, Nip19Entity};

    const AUTHOR: &str = "a008def15796fba9a0d6fab04e8fd57089285d9fd505da5a83fe8aad57a3564d";
    const EVENT_ID: &str = "5c83da77af1dec6d7289834998ad7aafbd9e2191396d75ec3cc27f5a77226f36";
    const BODY: &str = "Subject: x\n---\n looks ok\n a.txt | 2 +-\n@@ -1,1 +1,1 @@\n-old\n+new\n";

    fn patch_event(content: &str, tags: Vec<Tag>) -> Event {
        Event {
            id: EVENT_ID.to_string(),
            pubkey: AUTHOR.to_string(),
            kind: PATCH_KIND,
            created_at: 1_700_000_000,
            tags,
            content: content.to_string(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_parse_patch_splits_body() {
        let patch = parse_patch(&patch_event(BODY, vec![]), &[]).unwrap();
        assert_eq!(patch.files.len(), 1);
        assert_eq!(patch.comment, " looks ok\n");
        assert_eq!(patch.preamble, "Subject: x");
        assert!(patch.repo.is_none());
        assert_eq!(patch.additions(), 1);
        assert_eq!(patch.deletions(), 1);
    }

    #[test]
    fn test_parse_patch_without_diffstat_is_absent() {
        let event = patch_event("Subject: x\n---\nno diff here\n", vec![]);
        assert!(parse_patch(&event, &[]).is_none());
        assert_eq!(
            try_parse_patch(&UnifiedDiffTokenizer, &event, &[]),
            Err(PatchError::NoDiffStat)
        );
    }

    #[test]
    fn test_diffstat_without_hunks_is_absent() {
        let event = patch_event("s\n---\n a.txt | 2 +-\n 1 file changed\n", vec![]);
        assert_eq!(
            try_parse_patch(&UnifiedDiffTokenizer, &event, &[]),
            Err(PatchError::NoFileChanges)
        );
    }

    #[test]
    fn test_bad_repo_ref_does_not_abort_parse() {
        let event = patch_event(BODY, vec![Tag::new(["a", "30617:onlyonefield"])]);
        let patch = parse_patch(&event, &[]).unwrap();
        assert!(patch.repo.is_none());
    }

    #[test]
    fn test_repo_ref_is_attached() {
        let address = format!("30617:{}:gitstr", AUTHOR);
        let event = patch_event(
            BODY,
            vec![Tag::new(["a", address.as_str(), "wss://r.example"])],
        );
        let patch = parse_patch(&event, &[]).unwrap();
        let repo = patch.repo.as_ref().unwrap();
        assert_eq!(repo.guid(), format!("{}/gitstr", AUTHOR));
        assert!(repo.naddr().unwrap().starts_with("naddr1"));
    }

    #[test]
    fn test_nevent_uses_source_relays() {
        let relays = vec!["wss://source.example".to_string()];
        let patch = parse_patch(&patch_event(BODY, vec![]), &relays).unwrap();
        match nip19::decode(&patch.nevent().unwrap()).unwrap() {
            Nip19Entity::Event(pointer) => {
                assert_eq!(pointer.id, EVENT_ID);
                assert_eq!(pointer.author.as_deref(), Some(AUTHOR));
                assert_eq!(pointer.kind, Some(PATCH_KIND));
                assert_eq!(pointer.relays, relays);
            }
            other => panic!("unexpected entity {:?}", other),
        }
    }

    #[test]
    fn test_parsing_twice_gives_equal_values() {
        let event = patch_event(BODY, vec![Tag::new(["a", "30617:ownerX:repoY"])]);
        let relays = vec!["wss://one.example".to_string()];
        let first = parse_patch(&event, &relays).unwrap();
        let second = parse_patch(&event, &relays).unwrap();
        assert_eq!(first, second);
    }

    struct NoFiles;

    impl DiffTokenizer for NoFiles {
        fn tokenize(&self, _text: &str) -> Result<Vec<FileChange>, DiffError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_custom_tokenizer_is_used() {
        assert!(parse_patch_with(&NoFiles, &patch_event(BODY, vec![]), &[]).is_none());
    }
}
