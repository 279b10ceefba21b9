use serde::Serialize;

use crate::event::{Event, REPO_ANNOUNCEMENT_KIND};
use crate::nip19::{AddressCodec, AddressError, AddressPointer, EventPointer, Nip19Codec};

/// A git patch event decomposed into its human and machine parts.
/// Built once by `parse_patch`; never partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patch {
    /// The event this patch was parsed from
    pub event: Event,
    /// Text before the `---` separator (usually the mail headers and subject)
    pub preamble: String,
    /// Text between the separator and the diffstat
    pub comment: String,
    /// Parsed file changes, never empty
    pub files: Vec<FileChange>,
    /// Relays the caller fetched this event from
    pub source_relays: Vec<String>,
    /// Repository this patch targets, when the `a` tag names one
    pub repo: Option<RepoRef>,
}

impl Patch {
    pub fn additions(&self) -> usize {
        self.files.iter().map(|f| f.additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.files.iter().map(|f| f.deletions).sum()
    }

    pub fn event_pointer(&self) -> EventPointer {
        EventPointer {
            id: self.event.id.clone(),
            author: Some(self.event.pubkey.clone()),
            kind: Some(self.event.kind),
            relays: self.source_relays.clone(),
        }
    }

    /// `nevent` address of the patch event.
    pub fn nevent(&self) -> Result<String, AddressError> {
        self.nevent_with(&Nip19Codec)
    }

    pub fn nevent_with<C: AddressCodec>(&self, codec: &C) -> Result<String, AddressError> {
        codec.encode_event(&self.event_pointer())
    }
}

/// Reference from a patch to the repository announcement it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    /// Repository owner's public key
    pub owner: String,
    /// Repository `d` identifier
    pub id: String,
    /// Relay hint carried by the `a` tag, if any
    pub relays: Vec<String>,
}

impl RepoRef {
    /// Local join key, `owner/id`. Ambiguous if either part contains `/`.
    pub fn guid(&self) -> String {
        format!("{}/{}", self.owner, self.id)
    }

    pub fn address_pointer(&self) -> AddressPointer {
        AddressPointer {
            kind: REPO_ANNOUNCEMENT_KIND,
            pubkey: self.owner.clone(),
            identifier: self.id.clone(),
            relays: self.relays.clone(),
        }
    }

    pub fn naddr(&self) -> Result<String, AddressError> {
        self.naddr_with(&Nip19Codec)
    }

    pub fn naddr_with<C: AddressCodec>(&self, codec: &C) -> Result<String, AddressError> {
        codec.encode_address(&self.address_pointer())
    }
}

/// A single file within the patch diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Resulting file path; empty for a bare hunk with no header
    pub path: String,
    /// Path on the old side (`a/` stripped)
    pub from: Option<String>,
    /// Path on the new side (`b/` stripped)
    pub to: Option<String>,
    pub is_new: bool,
    pub is_deleted: bool,
    /// Lines added in this file
    pub additions: usize,
    /// Lines deleted in this file
    pub deletions: usize,
    pub hunks: Vec<Hunk>,
}

/// A contiguous region of changes within a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hunk {
    /// Starting line number in the old file
    pub old_start: usize,
    /// Number of lines in the old file
    pub old_count: usize,
    /// Starting line number in the new file
    pub new_start: usize,
    /// Number of lines in the new file
    pub new_count: usize,
    /// Raw lines of the hunk (prefixed with +, -, or space)
    pub lines: Vec<String>,
}
