//! Owned messages exchanged with the git background thread.
//!
//! Everything here is `Send` and free of borrowed lifetimes so that results
//! produced next to the `git2::Repository` can be stored directly in the
//! review session on the main thread.

use coi_core::changelog::GithubRemote;
use coi_core::{ChangedPath, CommitId, CommitsOfInterest, FilterSet, Order, Progress};

/// Commands sent from the main loop to the git worker thread.
///
/// Sent over a `crossbeam_channel::Sender<GitRequest>` owned by the main loop.
#[derive(Debug)]
pub enum GitRequest {
    /// Build the commits-of-interest list for `base..HEAD`.
    Materialize {
        base: String,
        order: Order,
        filters: FilterSet,
        /// Repository to look pull requests up in; `None` skips the lookup.
        pull_requests: Option<GithubRemote>,
    },
    /// Fetch and highlight the diff of the surviving paths of one commit.
    LoadDiff {
        /// Position of the commit in the commits-of-interest list.
        index: usize,
        commit: CommitId,
        /// Surviving paths only. Filtered paths are never requested.
        changes: Vec<ChangedPath>,
    },
}

/// Completed values sent from the git worker back to the main loop.
///
/// Carried inside `AppEvent::Git(Box<GitEvent>)`; boxing keeps the channel
/// item small since a highlighted diff can be large.
#[derive(Debug)]
pub enum GitEvent {
    /// Materialization advanced by one commit.
    Progress(Progress),
    /// Every commit is classified; pull requests are being looked up.
    LookingUpPullRequests,
    /// Materialization finished (successfully or not). Never sent when cancelled.
    Materialized(coi_core::Result<CommitsOfInterest>),
    /// Diff for the commit at `index` is ready, or could not be produced at all.
    DiffLoaded {
        index: usize,
        diff: Result<DiffContent, String>,
    },
}

/// Pre-highlighted diff of one commit, ready for the diff view.
///
/// `'static` lines are built from owned `String`s, so no re-rendering or arena
/// is needed per frame.
#[derive(Debug, Clone, Default)]
pub struct DiffContent {
    pub lines: Vec<ratatui::text::Line<'static>>,
    /// Indices into `lines` where `@@` hunk headers appear.
    pub hunk_offsets: Vec<usize>,
    /// Indices into `lines` where each file section starts.
    pub file_offsets: Vec<usize>,
    /// Number of paths whose content could not be retrieved.
    pub unavailable: usize,
}
