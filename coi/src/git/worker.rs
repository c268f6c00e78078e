//! Background thread that owns the repository for its lifetime.
//!
//! `git2::Repository` is !Send, so it is opened inside the thread rather than
//! passed in. All communication is via channels: `GitRequest` in,
//! `AppEvent::Git` out.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use coi_core::changelog::GithubRemote;
use coi_core::{
    ChangedPath, CommitId, CommitsOfInterest, Error, FilterSet, InterestPipeline, Order, VcsQuery,
    Warning,
};
use crossbeam_channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;
use crate::git::github::lookup_pull_requests;
use crate::git::highlight;
use crate::git::repo::GitRepo;
use crate::git::types::{DiffContent, GitEvent, GitRequest};

/// Entry point for the git background thread.
///
/// Loops over incoming requests until the channel is closed (sender dropped).
/// `cancel` is shared with the main loop; once set, in-flight work stops at the
/// next commit or path boundary and its partial result is dropped.
pub fn git_worker_loop(
    path: PathBuf,
    rx: Receiver<GitRequest>,
    event_tx: UnboundedSender<AppEvent>,
    cancel: Arc<AtomicBool>,
) {
    highlight::warm_up();

    let repo = match GitRepo::open(&path) {
        Ok(repo) => repo,
        Err(err) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "git worker could not open repository"
            );
            for request in rx {
                let reply = match request {
                    GitRequest::Materialize { .. } => {
                        GitEvent::Materialized(Err(Error::Query(err.to_string())))
                    }
                    GitRequest::LoadDiff { index, .. } => GitEvent::DiffLoaded {
                        index,
                        diff: Err(err.to_string()),
                    },
                };
                let _ = event_tx.send(AppEvent::Git(Box::new(reply)));
            }
            return;
        }
    };

    for request in rx {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        match request {
            GitRequest::Materialize { base, order, filters, pull_requests } => {
                let remote = pull_requests.as_ref();
                materialize(&repo, &base, order, filters, remote, &event_tx, &cancel);
            }
            GitRequest::LoadDiff { index, commit, changes } => {
                if let Some(diff) = load_diff(&repo, &commit, &changes, &cancel) {
                    let _ = event_tx.send(AppEvent::Git(Box::new(GitEvent::DiffLoaded {
                        index,
                        diff: Ok(diff),
                    })));
                }
            }
        }
    }
    tracing::debug!("git worker exiting");
}

fn materialize(
    repo: &GitRepo,
    base: &str,
    order: Order,
    filters: FilterSet,
    remote: Option<&GithubRemote>,
    event_tx: &UnboundedSender<AppEvent>,
    cancel: &AtomicBool,
) {
    let send = |event: GitEvent| {
        let _ = event_tx.send(AppEvent::Git(Box::new(event)));
    };
    let pipeline = InterestPipeline::new(repo, order, filters);
    let result = pipeline.materialize(
        base,
        |progress| send(GitEvent::Progress(progress)),
        cancel,
    );
    let mut list = match result {
        Err(Error::Cancelled) => {
            tracing::info!(base, "materialization cancelled");
            return;
        }
        Err(err) => {
            send(GitEvent::Materialized(Err(err)));
            return;
        }
        Ok(list) => list,
    };
    tracing::info!(
        base,
        scanned = list.scanned(),
        interesting = list.len(),
        "materialization finished"
    );

    if let Some(remote) = remote.filter(|_| !list.is_empty()) {
        send(GitEvent::LookingUpPullRequests);
        annotate_pull_requests(&mut list, remote, cancel);
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(base, "pull request lookup cancelled");
            return;
        }
    }
    send(GitEvent::Materialized(Ok(list)));
}

/// Labels `list` with pull requests, or records why that was not possible.
fn annotate_pull_requests(
    list: &mut CommitsOfInterest,
    remote: &GithubRemote,
    cancel: &AtomicBool,
) {
    let ids: Vec<CommitId> = list.commits().iter().map(|c| c.id().clone()).collect();
    match lookup_pull_requests(remote, &ids, cancel) {
        Ok(pulls) => list.annotate(pulls),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "pull request lookup failed");
            list.push_warning(Warning::PullRequests(format!("{err:#}")));
        }
    }
}

/// Fetches hunk text for each surviving path and highlights it.
///
/// Returns `None` when cancelled part-way. A single unreadable path does not
/// fail the whole commit; it becomes an inline placeholder.
fn load_diff(
    repo: &GitRepo,
    commit: &CommitId,
    changes: &[ChangedPath],
    cancel: &AtomicBool,
) -> Option<DiffContent> {
    let mut sections = Vec::with_capacity(changes.len());
    for change in changes {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let text = repo.diff_hunks(commit, change);
        if let Err(err) = &text {
            tracing::warn!(
                commit = %commit.short(),
                path = %change.path,
                error = %err,
                "content unavailable"
            );
        }
        sections.push((change.clone(), text));
    }
    Some(highlight::render_commit_diff(&sections))
}
