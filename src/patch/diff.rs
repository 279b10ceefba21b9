use thiserror::Error;

use super::types::{FileChange, Hunk};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("Invalid hunk header: {0}")]
    MalformedHunk(String),

    #[error("Invalid diff header: {0}")]
    MalformedHeader(String),
}

/// Turns a diff payload into file-change records.
///
/// Backends decide which dialect they accept; an input with no recognizable
/// file changes yields an empty vector rather than an error.
pub trait DiffTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<FileChange>, DiffError>;
}

/// Unified diff as emitted by `git diff` / `git format-patch`.
///
/// Anything before the first header (diffstat lines, the "N files changed"
/// summary, `index` lines, the format-patch signature) is skipped. Hunk
/// bodies are read by the line counts in their `@@` header, so removed lines
/// starting with `--` stay in the hunk. Counts that are off are tolerated: a
/// `---`/`+++` pair always opens a new file, and extra `+`/`-`/` ` lines past
/// the counts still join the hunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedDiffTokenizer;

/// Separator `git format-patch` puts before its version signature.
const SIGNATURE: &str = "-- ";

impl DiffTokenizer for UnifiedDiffTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<FileChange>, DiffError> {
        parse_diff(text)
    }
}

/// Open hunk plus how many old/new lines it still expects.
struct OpenHunk {
    hunk: Hunk,
    old_left: usize,
    new_left: usize,
}

impl OpenHunk {
    fn is_full(&self) -> bool {
        self.old_left == 0 && self.new_left == 0
    }
}

#[derive(Default)]
struct Tokenizer {
    files: Vec<FileChange>,
    file: Option<FileChange>,
    hunk: Option<OpenHunk>,
    /// The current file came from a `diff --git` line and has not seen `---` yet.
    awaiting_headers: bool,
}

impl Tokenizer {
    fn finish_hunk(&mut self) {
        if let (Some(file), Some(open)) = (self.file.as_mut(), self.hunk.take()) {
            file.hunks.push(open.hunk);
        }
    }

    fn finish_file(&mut self) {
        self.finish_hunk();
        if let Some(file) = self.file.take() {
            self.files.push(file);
        }
        self.awaiting_headers = false;
    }

    fn start_file(&mut self, file: FileChange) {
        self.finish_file();
        self.file = Some(file);
    }

    fn feed(&mut self, line: &str, next: Option<&str>) -> Result<(), DiffError> {
        if is_file_header(line, next) {
            self.finish_hunk();
            return self.feed_header(line);
        }

        if let Some(open) = self.hunk.as_mut() {
            let file = self
                .file
                .as_mut()
                .ok_or_else(|| DiffError::MalformedHunk("hunk without file".to_string()))?;
            // past the header counts, keep taking +/-/space lines as
            // parse-diff does, so short counts don't drop changes
            let full = open.is_full();
            match line.chars().next() {
                // "\ No newline at end of file"
                Some('\\') => return Ok(()),
                _ if full && line == SIGNATURE => {
                    self.finish_hunk();
                    return Ok(());
                }
                Some('+') => {
                    open.new_left = open.new_left.saturating_sub(1);
                    file.additions += 1;
                }
                Some('-') => {
                    open.old_left = open.old_left.saturating_sub(1);
                    file.deletions += 1;
                }
                Some(' ') => {
                    open.old_left = open.old_left.saturating_sub(1);
                    open.new_left = open.new_left.saturating_sub(1);
                }
                // context whose lone space a mailer stripped
                None if !full => {
                    open.old_left = open.old_left.saturating_sub(1);
                    open.new_left = open.new_left.saturating_sub(1);
                }
                _ => {
                    self.finish_hunk();
                    return self.feed_header(line);
                }
            }
            open.hunk.lines.push(line.to_string());
            return Ok(());
        }
        self.feed_header(line)
    }

    fn feed_header(&mut self, line: &str) -> Result<(), DiffError> {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            let (a_path, b_path) =
                split_git_paths(rest).ok_or_else(|| DiffError::MalformedHeader(line.to_string()))?;
            let from = strip_side(a_path, "a/");
            let to = strip_side(b_path, "b/");
            self.start_file(FileChange {
                path: to.clone(),
                from: Some(from),
                to: Some(to),
                ..FileChange::default()
            });
            self.awaiting_headers = true;
            return Ok(());
        }

        if line.starts_with("new file mode") {
            if let Some(file) = self.file.as_mut() {
                file.is_new = true;
            }
            return Ok(());
        }

        if line.starts_with("deleted file mode") {
            if let Some(file) = self.file.as_mut() {
                file.is_deleted = true;
            }
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("--- ") {
            // plain unified diff: `---` opens a new file unless it belongs
            // to the `diff --git` header just seen
            if !self.awaiting_headers {
                self.start_file(FileChange::default());
            }
            self.awaiting_headers = false;
            self.finish_hunk();
            if let Some(file) = self.file.as_mut() {
                let path = header_path(rest);
                if path == "/dev/null" {
                    file.is_new = true;
                } else {
                    let from = strip_side(path, "a/");
                    if file.path.is_empty() {
                        file.path = from.clone();
                    }
                    file.from = Some(from);
                }
            }
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("+++ ") {
            if self.file.is_none() {
                self.start_file(FileChange::default());
            }
            self.awaiting_headers = false;
            if let Some(file) = self.file.as_mut() {
                let path = header_path(rest);
                if path == "/dev/null" {
                    file.is_deleted = true;
                } else {
                    let to = strip_side(path, "b/");
                    file.path = to.clone();
                    file.to = Some(to);
                }
            }
            return Ok(());
        }

        if line.starts_with("@@") {
            self.finish_hunk();
            if self.file.is_none() {
                // bare hunk with no file header still counts as a change
                self.file = Some(FileChange::default());
            }
            self.awaiting_headers = false;
            let (old_start, old_count, new_start, new_count) = parse_hunk_header(line)?;
            self.hunk = Some(OpenHunk {
                hunk: Hunk {
                    old_start,
                    old_count,
                    new_start,
                    new_count,
                    lines: Vec::new(),
                },
                old_left: old_count,
                new_left: new_count,
            });
        }

        Ok(())
    }
}

/// Parse a unified diff string into file-change records.
///
/// Each file section starts with `diff --git a/{path} b/{path}` or, for plain
/// unified diffs, with a `--- {path}` / `+++ {path}` pair. A hunk that
/// appears with no file header at all opens an anonymous record (empty path).
///
/// New files have: `--- /dev/null`
/// Deleted files have: `+++ /dev/null`
///
/// Hunks start with: @@ -{old_start},{old_count} +{new_start},{new_count} @@
pub fn parse_diff(raw_diff: &str) -> Result<Vec<FileChange>, DiffError> {
    if raw_diff.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut tokenizer = Tokenizer::default();
    let mut lines = raw_diff.lines().peekable();
    while let Some(line) = lines.next() {
        tokenizer.feed(line, lines.peek().copied())?;
    }
    tokenizer.finish_file();
    Ok(tokenizer.files)
}

/// A `--- ` line directly followed by `+++ ` opens a file even inside a
/// hunk whose counts say otherwise.
fn is_file_header(line: &str, next: Option<&str>) -> bool {
    line.starts_with("diff --git ")
        || (line.starts_with("--- ") && next.is_some_and(|n| n.starts_with("+++ ")))
}

/// Split `a/{old} b/{new}` from a `diff --git` line. Paths may contain
/// spaces; when both sides name the same file the line is cut in the middle,
/// otherwise at the first ` b/`.
fn split_git_paths(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim_end();
    let mid = rest.len() / 2;
    if rest.len() % 2 == 1 && rest.as_bytes().get(mid) == Some(&b' ') {
        if let (Some(a), Some(b)) = (rest.get(..mid), rest.get(mid + 1..)) {
            if a.strip_prefix("a/").is_some() && a.strip_prefix("a/") == b.strip_prefix("b/") {
                return Some((a, b));
            }
        }
    }
    rest.split_once(" b/").map(|(a, _)| (a, &rest[a.len() + 1..]))
}

/// Drop the trailing timestamp some tools append after a tab.
fn header_path(rest: &str) -> &str {
    rest.split('\t').next().unwrap_or(rest).trim()
}

fn strip_side(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

fn parse_hunk_header(line: &str) -> Result<(usize, usize, usize, usize), DiffError> {
    let header = line
        .trim()
        .strip_prefix("@@")
        .ok_or_else(|| DiffError::MalformedHunk(line.to_string()))?
        .trim();
    let mut parts = header.split_whitespace();
    let old_part = parts
        .next()
        .ok_or_else(|| DiffError::MalformedHunk(format!("missing old range in {}", line)))?;
    let new_part = parts
        .next()
        .ok_or_else(|| DiffError::MalformedHunk(format!("missing new range in {}", line)))?;

    let (old_start, old_count) = parse_range(old_part, '-')?;
    let (new_start, new_count) = parse_range(new_part, '+')?;

    Ok((old_start, old_count, new_start, new_count))
}

fn parse_range(part: &str, prefix: char) -> Result<(usize, usize), DiffError> {
    let range = part
        .strip_prefix(prefix)
        .ok_or_else(|| DiffError::MalformedHunk(format!("invalid range prefix in {}", part)))?;
    let (start_str, count_str) = match range.split_once(',') {
        Some((start, count)) => (start, count),
        None => (range, "1"),
    };
    let start = start_str
        .parse::<usize>()
        .map_err(|_| DiffError::MalformedHunk(format!("invalid range start in {}", part)))?;
    let count = count_str
        .parse::<usize>()
        .map_err(|_| DiffError::MalformedHunk(format!("invalid range count in {}", part)))?;
    Ok((start, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIFF: &str = r#"diff --git a/src/main.rs b/src/main.rs
index abc1234..def5678 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@
 fn main() {
-    println!("old");
+    println!("new");
+    // Added a comment
 }
"#;

    #[test]
    fn test_parse_single_file_diff() {
        let files = parse_diff(SAMPLE_DIFF).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/main.rs");
        assert_eq!(files[0].from.as_deref(), Some("src/main.rs"));
        assert_eq!(files[0].additions, 2);
        assert_eq!(files[0].deletions, 1);
        assert_eq!(files[0].hunks.len(), 1);
        assert_eq!(files[0].hunks[0].lines.len(), 5);
    }

    #[test]
    fn test_parse_new_file_diff() {
        let diff = r#"diff --git a/new_file.txt b/new_file.txt
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/new_file.txt
@@ -0,0 +1,2 @@
+hello
+world
"#;
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].is_new);
        assert!(!files[0].is_deleted);
        assert_eq!(files[0].additions, 2);
    }

    #[test]
    fn test_parse_deleted_file_diff() {
        let diff = r#"diff --git a/old_file.txt b/old_file.txt
deleted file mode 100644
index e69de29..0000000
--- a/old_file.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-hello
-world
"#;
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert!(!files[0].is_new);
        assert!(files[0].is_deleted);
        assert_eq!(files[0].deletions, 2);
    }

    #[test]
    fn test_parse_empty_diff() {
        let files = parse_diff("").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_bare_hunk_opens_anonymous_file() {
        let diff = "a.txt | 2 +-\n@@ -1,1 +1,1 @@\n-old\n+new\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "");
        assert_eq!(files[0].additions, 1);
        assert_eq!(files[0].deletions, 1);
    }

    #[test]
    fn test_diffstat_without_hunks_yields_nothing() {
        let diff = "a.txt | 2 +-\n 1 file changed, 1 insertion(+), 1 deletion(-)\n";
        assert!(parse_diff(diff).unwrap().is_empty());
    }

    #[test]
    fn test_removed_line_starting_with_dashes_stays_in_hunk() {
        let diff = "--- a/notes.md\n+++ b/notes.md\n@@ -1,2 +1,1 @@\n--- old rule\n keep\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "notes.md");
        assert_eq!(files[0].deletions, 1);
        assert_eq!(files[0].hunks[0].lines, vec!["--- old rule", " keep"]);
    }

    #[test]
    fn test_format_patch_signature_is_ignored() {
        let diff = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1 +1 @@\n-a\n+b\n-- \n2.43.0\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].additions, 1);
        assert_eq!(files[0].deletions, 1);
    }

    #[test]
    fn test_multiple_files() {
        let diff = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1 +1 @@\n-a\n+b\ndiff --git a/b.txt b/c.txt\n--- a/b.txt\n+++ b/c.txt\n@@ -1,0 +2,1 @@\n+c\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].from.as_deref(), Some("b.txt"));
        assert_eq!(files[1].path, "c.txt");
    }

    #[test]
    fn test_overcounted_hunk_does_not_swallow_next_file() {
        let diff = "--- a/x\n+++ b/x\n@@ -1,3 +1,3 @@\n-a\n+b\n--- a/y\n+++ b/y\n@@ -1 +1 @@\n-c\n+d\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!((files[0].path.as_str(), files[0].additions, files[0].deletions), ("x", 1, 1));
        assert_eq!((files[1].path.as_str(), files[1].additions, files[1].deletions), ("y", 1, 1));
    }

    #[test]
    fn test_undercounted_hunk_keeps_trailing_changes() {
        let files = parse_diff("@@ -1 +1 @@\n-a\n+b\n+c\n").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].additions, 2);
        assert_eq!(files[0].deletions, 1);
        assert_eq!(files[0].hunks[0].lines, vec!["-a", "+b", "+c"]);
    }

    #[test]
    fn test_git_header_paths_with_spaces() {
        let diff = "diff --git a/my file b/my file\nsimilarity index 100%\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files[0].path, "my file");
        assert_eq!(files[0].from.as_deref(), Some("my file"));
    }

    #[test]
    fn test_git_header_rename_with_spaces() {
        let diff = "diff --git a/old name.txt b/new name.txt\nrename from old name.txt\nrename to new name.txt\n";
        let files = parse_diff(diff).unwrap();
        assert_eq!(files[0].from.as_deref(), Some("old name.txt"));
        assert_eq!(files[0].path, "new name.txt");
    }

    #[test]
    fn test_malformed_git_header() {
        assert!(matches!(
            parse_diff("diff --git onlyonepath\n"),
            Err(DiffError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_malformed_hunk_header() {
        let err = parse_diff("@@ -x,1 +1,1 @@\n").unwrap_err();
        assert!(matches!(err, DiffError::MalformedHunk(_)));
    }

    #[test]
    fn test_tokenizer_trait_delegates() {
        let files = UnifiedDiffTokenizer.tokenize(SAMPLE_DIFF).unwrap();
        assert_eq!(files.len(), 1);
    }
}
