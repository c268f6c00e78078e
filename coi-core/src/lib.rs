//! Engine behind `coi`: decides which commits between a base revision and
//! head touch anything beyond filtered noise.
//!
//! The pieces compose leaves-first:
//!
//! - [`filter`] — [`FilterSet`] and the component-equality path filter.
//! - [`classify`] — per-commit verdict and surviving change list.
//! - [`walker`] — ordered, restartable enumeration of the commits ahead of base.
//! - [`pipeline`] — lazy commits-of-interest sequence and its one-time materialization.
//! - [`vcs`] — the query interface to the version-control collaborator.
//! - [`changelog`] — proposed changelog text and pull-request annotations.

pub mod changelog;
pub mod classify;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod types;
pub mod vcs;
pub mod walker;

pub use changelog::PullRequests;
pub use error::{ConfigWarning, Error, Warning};
pub use filter::FilterSet;
pub use pipeline::{CommitsOfInterest, InterestPipeline, Progress};
pub use types::{ChangeKind, ChangedPath, ClassifiedCommit, Commit, CommitId, CommitMeta, Order};
pub use vcs::VcsQuery;
pub use walker::RevisionWalker;

pub type Result<T> = std::result::Result<T, Error>;
