//! Loading captured events from files or stdin.

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::event::Event;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read events: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse event array: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read events from `path`, or stdin when `path` is `None` or `-`.
pub fn load(path: Option<&Path>) -> Result<Vec<Event>, InputError> {
    let text = match path {
        Some(path) if path != Path::new("-") => {
            debug!(path = %path.display(), "reading events from file");
            std::fs::read_to_string(path)?
        }
        _ => {
            debug!("reading events from stdin");
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_events(&text)
}

/// Accepts either a JSON array of events or one event object per line.
///
/// In line mode, lines that are not valid events are logged and skipped so
/// a noisy capture still yields whatever it can. A malformed array is an
/// error.
pub fn parse_events(text: &str) -> Result<Vec<Event>, InputError> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }

    let mut events = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(line) {
            Ok(event) => events.push(event),
            Err(err) => warn!(line = number + 1, error = %err, "skipping unparseable event"),
        }
    }
    Ok(events)
}
