use std::fmt;

/// Number of hex digits shown for abbreviated commit ids.
pub const SHORT_ID_LEN: usize = 7;

/// Full hex object id of a commit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated id (first 7 characters, or the whole id when shorter).
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(SHORT_ID_LEN)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short metadata for one commit, as reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    pub id: CommitId,
    /// Parent ids in recorded order (first parent first).
    pub parents: Vec<CommitId>,
    pub author: String,
    /// Commit time in seconds since the Unix epoch.
    pub timestamp: i64,
    /// First line of the commit message.
    pub summary: String,
}

/// How a path changed within a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    /// Single-letter status badge (`A`, `M`, `D`, `R`).
    pub fn badge(self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Deleted => 'D',
            ChangeKind::Renamed => 'R',
        }
    }
}

/// One entry of a commit's path-level change list.
///
/// Paths are repository-relative and always use `/` as the separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: String,
    pub kind: ChangeKind,
    /// Previous location, set for renames only.
    pub old_path: Option<String>,
}

impl ChangedPath {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            old_path: None,
        }
    }

    pub fn renamed(old_path: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Renamed,
            old_path: Some(old_path.into()),
        }
    }

    /// Display form: `path` or `old -> new` for renames.
    pub fn display(&self) -> String {
        match &self.old_path {
            Some(old) => format!("{old} -> {}", self.path),
            None => self.path.clone(),
        }
    }
}

/// A commit together with its full (unfiltered) change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub meta: CommitMeta,
    pub changes: Vec<ChangedPath>,
}

impl Commit {
    pub fn id(&self) -> &CommitId {
        &self.meta.id
    }
}

/// A commit plus the verdict of the change classifier.
///
/// Only [`crate::classify::classify`] builds these; the fields are never
/// mutated afterwards. Re-filtering means classifying the [`Commit`] again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    commit: Commit,
    surviving: Vec<ChangedPath>,
}

impl ClassifiedCommit {
    pub(crate) fn new(commit: Commit, surviving: Vec<ChangedPath>) -> Self {
        Self { commit, surviving }
    }

    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    pub fn id(&self) -> &CommitId {
        self.commit.id()
    }

    pub fn meta(&self) -> &CommitMeta {
        &self.commit.meta
    }

    /// Changed paths that survived filtering, in their original order.
    pub fn surviving(&self) -> &[ChangedPath] {
        &self.surviving
    }

    /// True when at least one changed path survived filtering.
    pub fn is_interesting(&self) -> bool {
        !self.surviving.is_empty()
    }
}

/// Enumeration order of the walk and of the resulting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Parents before children (the default).
    #[default]
    OldestFirst,
    /// Exact reverse of `OldestFirst`.
    NewestFirst,
}
