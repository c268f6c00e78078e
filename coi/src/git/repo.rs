//! `git2`-backed implementation of the engine's [`VcsQuery`] collaborator.

use std::path::{Path, PathBuf};

use coi_core::vcs::CommitMetaIter;
use coi_core::{ChangeKind, ChangedPath, CommitId, CommitMeta, Error, VcsQuery};
use git2::{Delta, DiffFindOptions, DiffFormat, DiffOptions, Oid, Repository};

type Result<T> = coi_core::Result<T>;

/// Message used when a commit has no message at all.
const NO_MESSAGE: &str = "<no message>";

/// A repository opened for read-only queries.
pub struct GitRepo {
    inner: Repository,
    root: PathBuf,
}

fn query(err: git2::Error) -> Error {
    Error::Query(err.message().to_owned())
}

impl GitRepo {
    /// Opens the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when `path` is not inside a non-bare git repository.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = Repository::discover(path).map_err(|err| {
            Error::Query(format!("not a git repository '{}': {}", path.display(), err.message()))
        })?;
        let root = inner
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Query(format!("'{}' is a bare repository", path.display())))?;
        Ok(Self { inner, root })
    }

    /// Working-tree root; the override file is looked up here.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the most recent tag reachable from head.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when no tag is reachable.
    pub fn most_recent_tag(&self) -> Result<String> {
        let mut opts = git2::DescribeOptions::new();
        opts.describe_tags();
        let describe = self.inner.describe(&opts).map_err(|err| {
            Error::Query(format!(
                "no previous tag found; specify a revision explicitly ({})",
                err.message()
            ))
        })?;
        let mut format = git2::DescribeFormatOptions::new();
        format.abbreviated_size(0);
        describe.format(Some(&format)).map_err(query)
    }

    /// URL of the `origin` remote, if any.
    pub fn origin_url(&self) -> Option<String> {
        let remote = self.inner.find_remote("origin").ok()?;
        remote.url().map(str::to_owned)
    }

    fn oid(id: &CommitId) -> Result<Oid> {
        Oid::from_str(id.as_str()).map_err(query)
    }

    fn find_commit(&self, id: &CommitId) -> Result<git2::Commit<'_>> {
        self.inner.find_commit(Self::oid(id)?).map_err(query)
    }

    fn meta(commit: &git2::Commit<'_>) -> CommitMeta {
        CommitMeta {
            id: CommitId::new(commit.id().to_string()),
            parents: commit
                .parent_ids()
                .map(|oid| CommitId::new(oid.to_string()))
                .collect(),
            author: commit.author().name().unwrap_or("unknown").to_owned(),
            timestamp: commit.time().seconds(),
            summary: commit.summary().unwrap_or(NO_MESSAGE).to_owned(),
        }
    }

    /// Diff of `commit` against its first parent (or the empty tree for roots),
    /// with rename detection, optionally restricted to `pathspecs`.
    fn first_parent_diff(
        &self,
        commit: &git2::Commit<'_>,
        pathspecs: &[&str],
    ) -> std::result::Result<git2::Diff<'_>, git2::Error> {
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        let tree = commit.tree()?;

        let mut opts = DiffOptions::new();
        if !pathspecs.is_empty() {
            opts.disable_pathspec_match(true);
            for spec in pathspecs {
                opts.pathspec(spec);
            }
        }
        let mut diff = self
            .inner
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;
        Ok(diff)
    }
}

impl VcsQuery for GitRepo {
    fn resolve_revision(&self, reference: &str) -> Result<CommitId> {
        self.inner
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| CommitId::new(commit.id().to_string()))
            .map_err(|_| Error::InvalidRevision {
                revision: reference.to_owned(),
            })
    }

    fn head(&self) -> Result<CommitId> {
        let commit = self
            .inner
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(query)?;
        Ok(CommitId::new(commit.id().to_string()))
    }

    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        self.inner
            .graph_descendant_of(Self::oid(descendant)?, Self::oid(ancestor)?)
            .map_err(query)
    }

    fn list_commits_ahead<'a>(&'a self, base: &CommitId, head: &CommitId) -> CommitMetaIter<'a> {
        let walk = (|| {
            let mut walk = self.inner.revwalk()?;
            walk.push(Oid::from_str(head.as_str())?)?;
            walk.hide(Oid::from_str(base.as_str())?)?;
            Ok::<_, git2::Error>(walk)
        })();

        match walk {
            Ok(walk) => Box::new(walk.map(move |oid| -> Result<CommitMeta> {
                let commit = self.inner.find_commit(oid.map_err(query)?).map_err(query)?;
                Ok(Self::meta(&commit))
            })),
            Err(err) => Box::new(std::iter::once(Err(query(err)))),
        }
    }

    fn list_changed_paths(&self, commit: &CommitId) -> Result<Vec<ChangedPath>> {
        let commit = self.find_commit(commit)?;
        let diff = self.first_parent_diff(&commit, &[]).map_err(query)?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let kind = match delta.status() {
                Delta::Added | Delta::Copied => ChangeKind::Added,
                Delta::Deleted => ChangeKind::Deleted,
                Delta::Modified | Delta::Typechange => ChangeKind::Modified,
                Delta::Renamed => ChangeKind::Renamed,
                _ => continue,
            };
            let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                continue;
            };
            let mut change = ChangedPath::new(path.to_string_lossy(), kind);
            if kind == ChangeKind::Renamed {
                change.old_path = delta
                    .old_file()
                    .path()
                    .map(|old| old.to_string_lossy().into_owned());
            }
            changes.push(change);
        }
        Ok(changes)
    }

    fn diff_hunks(&self, commit: &CommitId, change: &ChangedPath) -> Result<String> {
        let unavailable = |reason: String| Error::ContentUnavailable {
            commit: commit.short().to_owned(),
            path: change.path.clone(),
            reason,
        };

        let git_commit = self.find_commit(commit).map_err(|err| unavailable(err.to_string()))?;
        let mut pathspecs = vec![change.path.as_str()];
        if let Some(old) = change.old_path.as_deref() {
            pathspecs.push(old);
        }
        let diff = self
            .first_parent_diff(&git_commit, &pathspecs)
            .map_err(|err| unavailable(err.message().to_owned()))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let content = String::from_utf8_lossy(line.content());
            match line.origin() {
                origin @ ('+' | '-' | ' ') => {
                    text.push(origin);
                    text.push_str(&content);
                }
                // Hunk headers, binary notices and end-of-file markers carry their own text.
                'H' | 'B' | '=' | '>' | '<' => text.push_str(&content),
                _ => return true,
            }
            if !text.ends_with('\n') {
                text.push('\n');
            }
            true
        })
        .map_err(|err| unavailable(err.message().to_owned()))?;

        Ok(text)
    }
}
