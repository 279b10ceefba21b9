//! Routing a stream of events to the repository and patch parsers.

use tracing::{debug, info_span};

use crate::event::{Event, EventKind};
use crate::patch::{parse_patch, Patch};
use crate::repo::{parse_repo, Repo};

/// Everything recognised in one event stream.
#[derive(Debug, Default)]
pub struct Scan {
    pub repos: Vec<Repo>,
    pub patches: Vec<Patch>,
    /// Events of unrelated kinds
    pub skipped: usize,
    /// Patch events that did not contain a usable diff
    pub rejected: usize,
}

/// Parse every repository announcement and patch in `events`.
/// Each event is parsed on its own; nothing is shared between them.
pub fn scan(events: &[Event], source_relays: &[String]) -> Scan {
    let _span = info_span!("scan", events = events.len()).entered();
    let mut scan = Scan::default();
    for event in events {
        match event.classify() {
            EventKind::Repo => scan.repos.push(parse_repo(event, source_relays)),
            EventKind::Patch => match parse_patch(event, source_relays) {
                Some(patch) => scan.patches.push(patch),
                None => scan.rejected += 1,
            },
            other => {
                debug!(event = %event.id, kind = %other, "ignoring event");
                scan.skipped += 1;
            }
        }
    }
    debug!(
        repos = scan.repos.len(),
        patches = scan.patches.len(),
        skipped = scan.skipped,
        rejected = scan.rejected,
        "scan complete"
    );
    scan
}
