//! Walker + classifier composed into the commits-of-interest sequence.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::changelog::PullRequests;
use crate::classify::classify;
use crate::error::{Error, Warning};
use crate::filter::FilterSet;
use crate::types::{ClassifiedCommit, Order};
use crate::vcs::VcsQuery;
use crate::walker::{RevisionWalker, Walk};
use crate::Result;

/// Progress of a materialization, reported after every scanned commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Commits classified so far.
    pub scanned: usize,
    /// Commits in the range.
    pub total: usize,
    /// Interesting commits found so far.
    pub interesting: usize,
}

/// The navigable, fully materialized list of interesting commits.
///
/// Order matches the walker's enumeration order and never changes afterwards.
/// Pull-request numbers may be attached later; they only annotate.
#[derive(Debug, Clone, Default)]
pub struct CommitsOfInterest {
    commits: Vec<ClassifiedCommit>,
    warnings: Vec<Warning>,
    scanned: usize,
    pull_requests: PullRequests,
}

impl CommitsOfInterest {
    pub fn new(commits: Vec<ClassifiedCommit>, warnings: Vec<Warning>, scanned: usize) -> Self {
        Self {
            commits,
            warnings,
            scanned,
            pull_requests: PullRequests::new(),
        }
    }

    pub fn commits(&self) -> &[ClassifiedCommit] {
        &self.commits
    }

    pub fn get(&self, index: usize) -> Option<&ClassifiedCommit> {
        self.commits.get(index)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Total number of commits examined, interesting or not.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    pub fn pull_requests(&self) -> &PullRequests {
        &self.pull_requests
    }

    /// Attaches pull-request numbers to the commits.
    pub fn annotate(&mut self, pull_requests: PullRequests) {
        self.pull_requests = pull_requests;
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

/// Produces the commits of interest for one invocation.
pub struct InterestPipeline<'v, V: VcsQuery + ?Sized> {
    walker: RevisionWalker<'v, V>,
    filters: FilterSet,
}

impl<'v, V: VcsQuery + ?Sized> InterestPipeline<'v, V> {
    pub fn new(vcs: &'v V, order: Order, filters: FilterSet) -> Self {
        Self {
            walker: RevisionWalker::new(vcs, order),
            filters,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Lazy sequence of interesting commits.
    ///
    /// Each commit's change list is fetched only when the iterator reaches it.
    ///
    /// # Errors
    ///
    /// Fails as [`RevisionWalker::walk`] does.
    pub fn interesting(&self, base: &str) -> Result<Interesting<'_, 'v, V>> {
        Ok(Interesting {
            walk: self.walker.walk(base)?,
            filters: &self.filters,
        })
    }

    /// Drains the lazy sequence into a [`CommitsOfInterest`].
    ///
    /// `progress` is called once before the first commit and after every
    /// scanned commit. `cancel` is checked while the range is read and between
    /// commits; once set, the partial result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when `cancel` is observed, or the first
    /// error from the walker or the collaborator.
    pub fn materialize(
        &self,
        base: &str,
        mut progress: impl FnMut(Progress),
        cancel: &AtomicBool,
    ) -> Result<CommitsOfInterest> {
        let mut walk = self.walker.walk_cancellable(base, cancel)?;
        let warnings = walk.warnings().to_vec();
        let mut state = Progress {
            total: walk.remaining(),
            ..Progress::default()
        };
        progress(state);

        let mut commits = Vec::new();
        loop {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(scanned = state.scanned, "materialization cancelled");
                return Err(Error::Cancelled);
            }
            let Some(commit) = walk.next() else { break };
            let classified = classify(commit?, &self.filters);
            state.scanned += 1;
            if classified.is_interesting() {
                state.interesting += 1;
                commits.push(classified);
            }
            progress(state);
        }

        tracing::info!(
            scanned = state.scanned,
            interesting = state.interesting,
            "commits of interest materialized"
        );
        Ok(CommitsOfInterest::new(commits, warnings, state.scanned))
    }
}

/// Iterator over the interesting commits of one walk.
pub struct Interesting<'p, 'v, V: VcsQuery + ?Sized> {
    walk: Walk<'v, V>,
    filters: &'p FilterSet,
}

impl<V: VcsQuery + ?Sized> Interesting<'_, '_, V> {
    pub fn warnings(&self) -> &[Warning] {
        self.walk.warnings()
    }
}

impl<V: VcsQuery + ?Sized> Iterator for Interesting<'_, '_, V> {
    type Item = Result<ClassifiedCommit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walk.next()? {
                Ok(commit) => {
                    let classified = classify(commit, self.filters);
                    if classified.is_interesting() {
                        return Some(Ok(classified));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
