//! Integration test for the walker → classifier → materialization path.
//!
//! Exercises: RevisionWalker::walk, InterestPipeline::interesting,
//! InterestPipeline::materialize (progress + cancellation), against an
//! in-memory history and an unbounded one.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use coi_core::vcs::{CommitMetaIter, MemoryCommit, MemoryVcs};
use coi_core::{
    ChangeKind, ChangedPath, CommitId, CommitMeta, Error, FilterSet, InterestPipeline, Order,
    RevisionWalker, VcsQuery, Warning,
};

fn commit(id: &str, parents: &[&str], timestamp: i64, changes: Vec<ChangedPath>) -> MemoryCommit {
    let hunks = changes
        .iter()
        .map(|c| (c.path.clone(), format!("@@ -0,0 +1 @@\n+{}\n", c.path)))
        .collect::<HashMap<_, _>>();
    MemoryCommit {
        meta: CommitMeta {
            id: CommitId::new(id),
            parents: parents.iter().map(|p| CommitId::new(*p)).collect(),
            author: "Test".to_owned(),
            timestamp,
            summary: format!("commit {id}"),
        },
        changes,
        hunks,
    }
}

fn modified(path: &str) -> ChangedPath {
    ChangedPath::new(path, ChangeKind::Modified)
}

/// base ── a ── b ── c ── d   (linear)
fn linear_history() -> MemoryVcs {
    let mut vcs = MemoryVcs::new();
    vcs.push(commit("base000", &[], 1, vec![modified("src/lib.rs")]));
    vcs.push(commit(
        "aaaa111",
        &["base000"],
        2,
        vec![modified("src/a.go"), modified("tests/a_test.go")],
    ));
    vcs.push(commit("bbbb222", &["aaaa111"], 3, vec![modified("tests/b_test.go")]));
    vcs.push(commit(
        "cccc333",
        &["bbbb222"],
        4,
        vec![ChangedPath::renamed("tests/old.go", "src/new.go")],
    ));
    vcs.push(commit("dddd444", &["cccc333"], 5, vec![modified("Cargo.lock")]));
    vcs
}

fn filters() -> FilterSet {
    FilterSet::defaults().union(["tests"])
}

#[test]
fn materialize_keeps_only_interesting_commits() {
    let vcs = linear_history();
    let pipeline = InterestPipeline::new(&vcs, Order::OldestFirst, filters());
    let cancel = AtomicBool::new(false);

    let list = pipeline.materialize("base000", |_| {}, &cancel).unwrap();

    let ids: Vec<&str> = list.commits().iter().map(|c| c.id().as_str()).collect();
    assert_eq!(ids, vec!["aaaa111", "cccc333"]);
    assert_eq!(list.scanned(), 4, "base itself is excluded");
    assert!(list.warnings().is_empty());

    let surviving: Vec<&str> = list.commits()[0]
        .surviving()
        .iter()
        .map(|c| c.path.as_str())
        .collect();
    assert_eq!(surviving, vec!["src/a.go"]);
}

#[test]
fn newest_first_is_exact_reverse() {
    let vcs = linear_history();
    let cancel = AtomicBool::new(false);

    let oldest = InterestPipeline::new(&vcs, Order::OldestFirst, filters())
        .materialize("base000", |_| {}, &cancel)
        .unwrap();
    let newest = InterestPipeline::new(&vcs, Order::NewestFirst, filters())
        .materialize("base000", |_| {}, &cancel)
        .unwrap();

    let mut reversed: Vec<_> = oldest.commits().iter().map(|c| c.id().clone()).collect();
    reversed.reverse();
    let newest_ids: Vec<_> = newest.commits().iter().map(|c| c.id().clone()).collect();
    assert_eq!(reversed, newest_ids);
}

#[test]
fn walker_is_restartable() {
    let vcs = linear_history();
    let walker = RevisionWalker::new(&vcs, Order::OldestFirst);

    let first: Vec<_> = walker.walk("base000").unwrap().map(Result::unwrap).collect();
    let second: Vec<_> = walker.walk("base000").unwrap().map(Result::unwrap).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn merge_history_orders_parents_first() {
    //        ┌─ left (t=9) ─┐
    // base ──┤              ├── merge (t=4)
    //        └─ right (t=3) ┘
    let mut vcs = MemoryVcs::new();
    vcs.push(commit("base", &[], 1, vec![modified("src/a.rs")]));
    vcs.push(commit("left", &["base"], 9, vec![modified("src/l.rs")]));
    vcs.push(commit("right", &["base"], 3, vec![modified("src/r.rs")]));
    vcs.push(commit("merge", &["left", "right"], 4, Vec::new()));

    let walker = RevisionWalker::new(&vcs, Order::OldestFirst);
    let ids: Vec<String> = walker
        .walk("base")
        .unwrap()
        .map(|c| c.unwrap().meta.id.to_string())
        .collect();
    assert_eq!(ids, vec!["right", "left", "merge"]);

    // The merge has no changes of its own and is therefore not interesting.
    let list = InterestPipeline::new(&vcs, Order::OldestFirst, filters())
        .materialize("base", |_| {}, &AtomicBool::new(false))
        .unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn unresolvable_base_is_invalid_revision() {
    let vcs = linear_history();
    let pipeline = InterestPipeline::new(&vcs, Order::OldestFirst, filters());
    let err = pipeline
        .materialize("nope", |_| {}, &AtomicBool::new(false))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRevision { ref revision } if revision == "nope"));
}

#[test]
fn base_not_ancestor_warns_and_enumerates_ahead() {
    // base ── a ── head, plus a side commit that is not an ancestor of head.
    let mut vcs = MemoryVcs::new();
    vcs.push(commit("base", &[], 1, vec![modified("src/a.rs")]));
    vcs.push(commit("side", &["base"], 2, vec![modified("src/side.rs")]));
    vcs.push(commit("main1", &["base"], 3, vec![modified("src/m1.rs")]));
    vcs.push(commit("main2", &["main1"], 4, vec![modified("src/m2.rs")]));

    let list = InterestPipeline::new(&vcs, Order::OldestFirst, filters())
        .materialize("side", |_| {}, &AtomicBool::new(false))
        .unwrap();

    let ids: Vec<&str> = list.commits().iter().map(|c| c.id().as_str()).collect();
    assert_eq!(ids, vec!["main1", "main2"]);
    assert!(matches!(list.warnings(), [Warning::NotAnAncestor { .. }]));
}

#[test]
fn progress_reports_every_commit() {
    let vcs = linear_history();
    let pipeline = InterestPipeline::new(&vcs, Order::OldestFirst, filters());
    let mut reports = Vec::new();

    pipeline
        .materialize("base000", |p| reports.push(p), &AtomicBool::new(false))
        .unwrap();

    assert_eq!(reports.len(), 5, "initial report plus one per commit");
    assert!(reports.iter().all(|p| p.total == 4));
    let last = reports.last().unwrap();
    assert_eq!((last.scanned, last.interesting), (4, 2));
}

#[test]
fn cancellation_discards_partial_results() {
    let vcs = linear_history();
    let pipeline = InterestPipeline::new(&vcs, Order::OldestFirst, filters());
    let cancel = AtomicBool::new(false);

    let result = pipeline.materialize(
        "base000",
        |p| {
            if p.scanned == 2 {
                cancel.store(true, Ordering::Relaxed);
            }
        },
        &cancel,
    );
    assert!(matches!(result, Err(Error::Cancelled)));
}

/// A range that never ends. Counts the metadata it hands out and raises
/// `cancel` once `cancel_after` items have been read.
struct EndlessHistory<'c> {
    pulled: Cell<usize>,
    cancel: &'c AtomicBool,
    cancel_after: usize,
}

impl<'c> EndlessHistory<'c> {
    fn new(cancel: &'c AtomicBool, cancel_after: usize) -> Self {
        Self {
            pulled: Cell::new(0),
            cancel,
            cancel_after,
        }
    }
}

impl VcsQuery for EndlessHistory<'_> {
    fn resolve_revision(&self, reference: &str) -> coi_core::Result<CommitId> {
        Ok(CommitId::new(reference))
    }

    fn head(&self) -> coi_core::Result<CommitId> {
        Ok(CommitId::new("head"))
    }

    fn is_ancestor(&self, _ancestor: &CommitId, _descendant: &CommitId) -> coi_core::Result<bool> {
        Ok(true)
    }

    fn list_commits_ahead<'a>(&'a self, _base: &CommitId, _head: &CommitId) -> CommitMetaIter<'a> {
        Box::new(std::iter::repeat_with(move || {
            let n = self.pulled.get() + 1;
            self.pulled.set(n);
            if n == self.cancel_after {
                self.cancel.store(true, Ordering::Relaxed);
            }
            Ok(CommitMeta {
                id: CommitId::new(format!("{n:040}")),
                parents: Vec::new(),
                author: "Test".to_owned(),
                timestamp: n as i64,
                summary: String::new(),
            })
        }))
    }

    fn list_changed_paths(&self, _commit: &CommitId) -> coi_core::Result<Vec<ChangedPath>> {
        Ok(vec![modified("src/lib.rs")])
    }

    fn diff_hunks(&self, _commit: &CommitId, _change: &ChangedPath) -> coi_core::Result<String> {
        Ok(String::new())
    }
}

#[test]
fn cancelled_before_start_reads_no_history() {
    let cancel = AtomicBool::new(true);
    let vcs = EndlessHistory::new(&cancel, usize::MAX);
    let mut reports = 0;

    let result = InterestPipeline::new(&vcs, Order::OldestFirst, filters())
        .materialize("base", |_| reports += 1, &cancel);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(vcs.pulled.get(), 0);
    assert_eq!(reports, 0);
}

#[test]
fn cancellation_stops_reading_the_range() {
    let cancel = AtomicBool::new(false);
    let vcs = EndlessHistory::new(&cancel, 1_000);

    let result = InterestPipeline::new(&vcs, Order::OldestFirst, filters())
        .materialize("base", |_| {}, &cancel);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(vcs.pulled.get(), 1_000);
}

#[test]
fn lazy_sequence_matches_materialized_list() {
    let vcs = linear_history();
    let pipeline = InterestPipeline::new(&vcs, Order::OldestFirst, filters());

    let lazy: Vec<_> = pipeline
        .interesting("base000")
        .unwrap()
        .map(Result::unwrap)
        .collect();
    let list = pipeline
        .materialize("base000", |_| {}, &AtomicBool::new(false))
        .unwrap();
    assert_eq!(lazy.as_slice(), list.commits());
}

#[test]
fn memory_vcs_reports_missing_content() {
    let vcs = linear_history();
    let id = vcs.resolve_revision("aaaa").unwrap();
    let err = vcs.diff_hunks(&id, &modified("src/missing.rs")).unwrap_err();
    assert!(matches!(err, Error::ContentUnavailable { .. }));
}
