//! Parsing of NIP-34 git events: repository announcements (kind 30617) and
//! patches (kind 1617) into addressable [`Repo`] and [`Patch`] values.
//!
//! Parsing is pure and tolerant. [`parse_repo`] always yields a value;
//! [`parse_patch`] yields `None` for events that carry no usable diff.

pub mod config;
pub mod event;
pub mod input;
pub mod nip19;
pub mod patch;
pub mod repo;
pub mod report;
pub mod scan;

pub use event::{Event, EventKind, Tag, PATCH_KIND, REPO_ANNOUNCEMENT_KIND};
pub use nip19::{AddressCodec, AddressError, AddressPointer, EventPointer, Nip19Codec};
pub use patch::{parse_patch, resolve_repo_ref, FileChange, Patch, RepoRef};
pub use repo::{parse_repo, Repo};
