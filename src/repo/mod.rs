pub mod types;

pub use types::{RelayLists, Repo};

use tracing::{debug, instrument};

use crate::event::Event;

/// Fold a repository announcement's tags into a [`Repo`].
///
/// Never fails. `d`, `name` and `description` keep their last occurrence;
/// `web`, `clone` and the relay tags append every value in order.
#[instrument(skip_all, fields(event = %event.id))]
pub fn parse_repo(event: &Event, source_relays: &[String]) -> Repo {
    let mut repo = Repo {
        event: event.clone(),
        id: String::new(),
        name: None,
        description: None,
        web: Vec::new(),
        clone: Vec::new(),
        relay_hints: Vec::new(),
        relay_lists: RelayLists::default(),
        source_relays: source_relays.to_vec(),
    };

    for tag in &event.tags {
        let Some(name) = tag.name() else { continue };
        match name {
            "d" => repo.id = tag.value().unwrap_or_default().to_string(),
            "name" => repo.name = tag.value().map(str::to_string),
            "description" => repo.description = tag.value().map(str::to_string),
            "web" => repo.web.extend_from_slice(tag.values()),
            "clone" => repo.clone.extend_from_slice(tag.values()),
            "patches" | "issues" | "relays" => {
                let list = match name {
                    "patches" => &mut repo.relay_lists.patches,
                    "issues" => &mut repo.relay_lists.issues,
                    _ => &mut repo.relay_lists.relays,
                };
                list.extend_from_slice(tag.values());
                repo.relay_hints.extend_from_slice(tag.values());
            }
            _ => {}
        }
    }

    if repo.id.is_empty() {
        debug!("repository announcement has no d tag");
    }
    debug!(id = %repo.id, clone = repo.clone.len(), relays = repo.relay_hints.len(), "parsed repository");
    repo
}
