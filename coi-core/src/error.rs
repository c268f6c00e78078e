//! Error and warning taxonomy shared by every stage of the pipeline.
//!
//! Fatal conditions are variants of [`Error`]; conditions the user must see but
//! that never stop the tool are variants of [`Warning`]. Callers decide how to
//! surface warnings (status line, log), but must never drop them silently.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::CommitId;

/// Errors produced while building or reviewing the commits of interest.
#[derive(Debug, Error)]
pub enum Error {
    /// The base revision does not resolve to a known commit.
    #[error("invalid revision '{revision}'")]
    InvalidRevision { revision: String },

    /// Diff content for one path of one commit could not be retrieved.
    ///
    /// Scoped to a single commit's diff view — rendered inline, never fatal.
    #[error("content unavailable for '{path}' in {commit}: {reason}")]
    ContentUnavailable {
        commit: String,
        path: String,
        reason: String,
    },

    /// The version-control collaborator failed for a reason other than the above.
    #[error("version control query failed: {0}")]
    Query(String),

    /// A long-running operation was aborted because the user quit.
    #[error("operation cancelled")]
    Cancelled,

    /// Terminal I/O failed; the interactive session cannot continue.
    #[error("render surface failure")]
    RenderSurface(#[source] std::io::Error),
}

/// Non-fatal conditions that must be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A configuration source was unreadable or malformed; defaults were used.
    Config(ConfigWarning),
    /// The base revision is not an ancestor of head.
    NotAnAncestor { base: CommitId, head: CommitId },
    /// Pull requests could not be looked up; commits are shown without them.
    PullRequests(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Config(warning) => warning.fmt(f),
            Warning::NotAnAncestor { base, head } => write!(
                f,
                "{} is not an ancestor of {}; showing commits reachable only from head",
                base.short(),
                head.short()
            ),
            Warning::PullRequests(reason) => write!(f, "pull requests not looked up: {reason}"),
        }
    }
}

/// A configuration source could not be used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The file the problem was found in.
    pub path: PathBuf,
    /// Human-readable description of the problem.
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl From<ConfigWarning> for Warning {
    fn from(warning: ConfigWarning) -> Self {
        Warning::Config(warning)
    }
}
