use std::sync::OnceLock;

use regex::Regex;

/// Line that separates the mail preamble from the rest of the body.
pub const SEPARATOR: &str = "\n---\n";

/// The three textual parts of a patch body. `diff` still has to go through a
/// tokenizer before the patch counts as valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments<'a> {
    pub preamble: &'a str,
    pub comment: &'a str,
    pub diff: &'a str,
}

/// First diffstat line, e.g. ` src/lib.rs | 12 +++++-----`. The leading
/// word character and the count are ASCII only.
fn diffstat_line() -> &'static Regex {
    static DIFFSTAT_RE: OnceLock<Regex> = OnceLock::new();
    DIFFSTAT_RE.get_or_init(|| {
        Regex::new(r"(?m)^ (?-u:\w).* +\| +[0-9]+ +[+-]+").expect("diffstat pattern is valid")
    })
}

/// Split a patch body into preamble, comment and diff text.
///
/// The body is cut at the first `\n---\n`; without one the whole body is
/// scanned and the preamble is empty. The diff starts one character into the
/// first diffstat line, dropping the leading space. Returns `None` when no
/// diffstat line is found.
pub fn segment(content: &str) -> Option<Segments<'_>> {
    let (preamble, rest) = content.split_once(SEPARATOR).unwrap_or(("", content));
    let start = diffstat_line().find(rest)?.start();
    Some(Segments {
        preamble,
        comment: &rest[..start],
        diff: &rest[start + 1..],
    })
}
