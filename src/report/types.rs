/// An address that could be encoded, or the reason it could not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Encoded(String),
    Invalid(String),
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Encoded(address) => write!(f, "{}", address),
            Address::Invalid(reason) => write!(f, "(unavailable: {})", reason),
        }
    }
}

impl<E: std::fmt::Display> From<Result<String, E>> for Address {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(address) => Address::Encoded(address),
            Err(err) => Address::Invalid(err.to_string()),
        }
    }
}

/// One repository announcement in the report.
#[derive(Debug, Clone)]
pub struct RepoSummary {
    /// `owner/id` join key
    pub guid: String,
    pub naddr: Address,
    /// Display name, falling back to the id
    pub title: String,
    pub description: Option<String>,
    pub clone: Vec<String>,
    pub web: Vec<String>,
    pub relay_hints: Vec<String>,
    /// Missing `d` tag
    pub incomplete: bool,
}

/// One patch in the report.
#[derive(Debug, Clone)]
pub struct PatchSummary {
    pub nevent: Address,
    /// First preamble line that looks like a subject, else the first line
    pub subject: String,
    /// Target repository guid, if known
    pub repo: Option<String>,
    pub files: Vec<String>,
    /// Lines added
    pub additions: usize,
    /// Lines deleted
    pub deletions: usize,
}

/// Complete report over one event stream.
#[derive(Debug)]
pub struct Report {
    pub repos: Vec<RepoSummary>,
    pub patches: Vec<PatchSummary>,
    /// Events of unrelated kinds
    pub skipped: usize,
    /// Patch events without a usable diff
    pub rejected: usize,
}
