use serde::Serialize;

use crate::event::{Event, REPO_ANNOUNCEMENT_KIND};
use crate::nip19::{AddressCodec, AddressError, AddressPointer, Nip19Codec};

/// A git repository announcement.
/// Built by `parse_repo`; an empty `id` marks an incomplete announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repo {
    /// The announcement event
    pub event: Event,
    /// Value of the `d` tag, empty if absent
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Browsable URLs from `web` tags
    pub web: Vec<String>,
    /// Clone URLs from `clone` tags
    pub clone: Vec<String>,
    /// `patches`, `issues` and `relays` values combined in tag order
    pub relay_hints: Vec<String>,
    /// The same values kept per source tag
    pub relay_lists: RelayLists,
    /// Relays the caller fetched this event from
    pub source_relays: Vec<String>,
}

/// Relay values split by the tag they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelayLists {
    pub patches: Vec<String>,
    pub issues: Vec<String>,
    pub relays: Vec<String>,
}

impl RelayLists {
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.issues.is_empty() && self.relays.is_empty()
    }
}

impl Repo {
    pub fn owner(&self) -> &str {
        &self.event.pubkey
    }

    /// Local join key, `owner/id`. Not a protocol address, and ambiguous if
    /// either part contains `/`.
    pub fn guid(&self) -> String {
        format!("{}/{}", self.event.pubkey, self.id)
    }

    pub fn is_complete(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn address_pointer(&self) -> AddressPointer {
        AddressPointer {
            kind: REPO_ANNOUNCEMENT_KIND,
            pubkey: self.event.pubkey.clone(),
            identifier: self.id.clone(),
            relays: self.source_relays.clone(),
        }
    }

    /// `naddr` of this announcement, hinting the relays it was found on.
    pub fn naddr(&self) -> Result<String, AddressError> {
        self.naddr_with(&Nip19Codec)
    }

    pub fn naddr_with<C: AddressCodec>(&self, codec: &C) -> Result<String, AddressError> {
        codec.encode_address(&self.address_pointer())
    }
}
