//! Ordered, restartable enumeration of the commits ahead of a base revision.
//!
//! Only commit metadata (ids, parents, timestamps) is collected up front; the
//! per-commit changed-path lists are fetched as the [`Walk`] iterator advances.
//! Collecting the metadata of a long range takes a while, so it can be aborted
//! through [`RevisionWalker::walk_cancellable`].
//!
//! # Ordering
//!
//! Commits are sorted topologically — every parent inside the range comes
//! before its children — using Kahn's algorithm with a min-heap keyed on
//! `(timestamp, id)`. The heap key makes the order a pure function of the
//! history, so two walks over the same history always agree.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Warning};
use crate::types::{Commit, CommitId, CommitMeta, Order};
use crate::vcs::VcsQuery;
use crate::Result;

/// Enumerates commits reachable from head but not from a base revision.
pub struct RevisionWalker<'v, V: VcsQuery + ?Sized> {
    vcs: &'v V,
    order: Order,
}

impl<'v, V: VcsQuery + ?Sized> RevisionWalker<'v, V> {
    pub fn new(vcs: &'v V, order: Order) -> Self {
        Self { vcs, order }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Starts a walk from `base` (exclusive) to head (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRevision`] when `base` does not resolve,
    /// or [`crate::Error::Query`] when head or the commit range cannot be read.
    pub fn walk(&self, base: &str) -> Result<Walk<'v, V>> {
        self.walk_cancellable(base, &AtomicBool::new(false))
    }

    /// Like [`walk`](Self::walk), but gives up as soon as `cancel` is set.
    ///
    /// `cancel` is checked before each commit's metadata is pulled from the
    /// collaborator and once more before sorting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when `cancel` is observed, otherwise fails
    /// as [`walk`](Self::walk) does.
    pub fn walk_cancellable(&self, base: &str, cancel: &AtomicBool) -> Result<Walk<'v, V>> {
        let base = self.vcs.resolve_revision(base)?;
        let head = self.vcs.head()?;

        let mut warnings = Vec::new();
        if !self.vcs.is_ancestor(&base, &head)? {
            tracing::warn!(
                base = %base.short(),
                head = %head.short(),
                "base is not an ancestor of head"
            );
            warnings.push(Warning::NotAnAncestor {
                base: base.clone(),
                head: head.clone(),
            });
        }

        let mut ahead = self.vcs.list_commits_ahead(&base, &head);
        let mut metas = Vec::new();
        loop {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(collected = metas.len(), "walk cancelled while reading history");
                return Err(Error::Cancelled);
            }
            let Some(meta) = ahead.next() else { break };
            metas.push(meta?);
        }
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        let mut ordered = topological_order(metas);
        if self.order == Order::NewestFirst {
            ordered.reverse();
        }
        tracing::debug!(commits = ordered.len(), base = %base.short(), "walk prepared");

        Ok(Walk {
            vcs: self.vcs,
            base,
            head,
            pending: ordered.into_iter(),
            warnings,
        })
    }
}

/// One pass over the commit range. Yields each commit with its raw change list.
pub struct Walk<'v, V: VcsQuery + ?Sized> {
    vcs: &'v V,
    base: CommitId,
    head: CommitId,
    pending: std::vec::IntoIter<CommitMeta>,
    warnings: Vec<Warning>,
}

impl<V: VcsQuery + ?Sized> Walk<'_, V> {
    pub fn base(&self) -> &CommitId {
        &self.base
    }

    pub fn head(&self) -> &CommitId {
        &self.head
    }

    /// Non-fatal anomalies found while preparing the walk.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of commits not yet yielded.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl<V: VcsQuery + ?Sized> Iterator for Walk<'_, V> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let meta = self.pending.next()?;
        Some(
            self.vcs
                .list_changed_paths(&meta.id)
                .map(|changes| Commit { meta, changes }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

/// Sorts `metas` parents-first, breaking ties by `(timestamp, id)`.
///
/// Parents outside the given set are ignored. Should the input contain a cycle
/// (impossible in a real history), the remaining commits are appended in
/// `(timestamp, id)` order rather than dropped.
pub fn topological_order(metas: Vec<CommitMeta>) -> Vec<CommitMeta> {
    let index: HashMap<CommitId, usize> = metas
        .iter()
        .enumerate()
        .map(|(idx, meta)| (meta.id.clone(), idx))
        .collect();

    let mut indegree = vec![0usize; metas.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); metas.len()];
    for (idx, meta) in metas.iter().enumerate() {
        for parent in &meta.parents {
            if let Some(&parent_idx) = index.get(parent) {
                indegree[idx] += 1;
                children[parent_idx].push(idx);
            }
        }
    }

    let key = |idx: usize| Reverse((metas[idx].timestamp, metas[idx].id.clone(), idx));
    let mut ready: BinaryHeap<_> = (0..metas.len())
        .filter(|&idx| indegree[idx] == 0)
        .map(key)
        .collect();

    let mut order = Vec::with_capacity(metas.len());
    let mut emitted = vec![false; metas.len()];
    while let Some(Reverse((_, _, idx))) = ready.pop() {
        order.push(idx);
        emitted[idx] = true;
        for &child in &children[idx] {
            indegree[child] -= 1;
            if indegree[child] == 0 {
                ready.push(key(child));
            }
        }
    }

    if order.len() < metas.len() {
        let mut rest: Vec<usize> = (0..metas.len()).filter(|&idx| !emitted[idx]).collect();
        rest.sort_by(|&a, &b| {
            (metas[a].timestamp, &metas[a].id).cmp(&(metas[b].timestamp, &metas[b].id))
        });
        order.extend(rest);
    }

    let mut slots: Vec<Option<CommitMeta>> = metas.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
