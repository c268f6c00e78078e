//! The narrow query interface to the version-control collaborator.
//!
//! The engine never touches repository storage directly. Everything it needs
//! goes through [`VcsQuery`]; the `coi` binary implements it on top of `git2`,
//! and [`MemoryVcs`] implements it over a hand-built history for tests.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::types::{ChangedPath, CommitId, CommitMeta};
use crate::Result;

/// Lazily produced commit metadata.
pub type CommitMetaIter<'a> = Box<dyn Iterator<Item = Result<CommitMeta>> + 'a>;

/// Queries the engine issues against the version-control system.
pub trait VcsQuery {
    /// Resolves a revision expression to a commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRevision`] when `reference` names no commit.
    fn resolve_revision(&self, reference: &str) -> Result<CommitId>;

    /// The commit currently checked out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when head cannot be read (e.g. an empty repository).
    fn head(&self) -> Result<CommitId>;

    /// True when `ancestor` is reachable from `descendant` (or equal to it).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] on collaborator failure.
    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool>;

    /// Metadata of every commit reachable from `head` but not from `base`.
    ///
    /// The order of the returned items is unspecified; the walker imposes its own.
    fn list_commits_ahead<'a>(&'a self, base: &CommitId, head: &CommitId) -> CommitMetaIter<'a>;

    /// Path-level changes of `commit` against its first parent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] on collaborator failure.
    fn list_changed_paths(&self, commit: &CommitId) -> Result<Vec<ChangedPath>>;

    /// Unified-diff hunk text for one changed path of `commit`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentUnavailable`] when the content cannot be produced.
    fn diff_hunks(&self, commit: &CommitId, change: &ChangedPath) -> Result<String>;
}

/// One commit of a [`MemoryVcs`] history.
#[derive(Debug, Clone)]
pub struct MemoryCommit {
    pub meta: CommitMeta,
    pub changes: Vec<ChangedPath>,
    /// Hunk text per path; paths without an entry report `ContentUnavailable`.
    pub hunks: HashMap<String, String>,
}

/// An immutable in-memory history.
#[derive(Debug, Clone, Default)]
pub struct MemoryVcs {
    commits: HashMap<CommitId, MemoryCommit>,
    head: Option<CommitId>,
    /// Commits appended in insertion order, reported in that order.
    insertion: Vec<CommitId>,
}

impl MemoryVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a commit and makes it head.
    pub fn push(&mut self, commit: MemoryCommit) {
        let id = commit.meta.id.clone();
        self.insertion.push(id.clone());
        self.commits.insert(id.clone(), commit);
        self.head = Some(id);
    }

    /// Moves head to an existing commit.
    pub fn set_head(&mut self, id: &CommitId) {
        self.head = Some(id.clone());
    }

    fn ancestors(&self, start: &CommitId) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let mut stack = vec![start.clone()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&id) {
                stack.extend(commit.meta.parents.iter().cloned());
            }
        }
        seen
    }

    fn get(&self, id: &CommitId) -> Result<&MemoryCommit> {
        self.commits
            .get(id)
            .ok_or_else(|| Error::Query(format!("unknown commit {id}")))
    }
}

impl VcsQuery for MemoryVcs {
    fn resolve_revision(&self, reference: &str) -> Result<CommitId> {
        if reference == "HEAD" {
            return self.head();
        }
        let mut matches = self
            .commits
            .keys()
            .filter(|id| id.as_str().starts_with(reference) && !reference.is_empty());
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id.clone()),
            _ => Err(Error::InvalidRevision {
                revision: reference.to_owned(),
            }),
        }
    }

    fn head(&self) -> Result<CommitId> {
        self.head
            .clone()
            .ok_or_else(|| Error::Query("repository has no commits".to_owned()))
    }

    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool> {
        Ok(self.ancestors(descendant).contains(ancestor))
    }

    fn list_commits_ahead<'a>(&'a self, base: &CommitId, head: &CommitId) -> CommitMetaIter<'a> {
        let hidden = self.ancestors(base);
        let visible = self.ancestors(head);
        Box::new(
            self.insertion
                .iter()
                .filter(move |id| visible.contains(*id) && !hidden.contains(*id))
                .map(move |id| self.get(id).map(|c| c.meta.clone())),
        )
    }

    fn list_changed_paths(&self, commit: &CommitId) -> Result<Vec<ChangedPath>> {
        Ok(self.get(commit)?.changes.clone())
    }

    fn diff_hunks(&self, commit: &CommitId, change: &ChangedPath) -> Result<String> {
        self.get(commit)?
            .hunks
            .get(&change.path)
            .cloned()
            .ok_or_else(|| Error::ContentUnavailable {
                commit: commit.short().to_owned(),
                path: change.path.clone(),
                reason: "no content recorded".to_owned(),
            })
    }
}
