//! Top-level application state.
//!
//! `App` wraps the two stages of a run: a loading stage while the git worker
//! materializes the commits of interest, and the review stage driven by
//! [`ReviewSession`]. Like the session, it holds no terminal handles and does
//! no I/O; the main loop feeds it events and acts on the returned effects.

use coi_core::{ChangedPath, CommitId, Progress};

use crate::git::types::{GitEvent, GitRequest};
use crate::session::{Command, Effect, ReviewSession};

/// Frames of the loading spinner, advanced on every logic tick.
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Which stage of the run is active.
#[derive(Debug)]
pub enum Stage {
    /// The commit list is still being built.
    Loading(Progress),
    Review(ReviewSession),
}

#[derive(Debug)]
pub struct App {
    pub stage: Stage,
    /// Base revision as the user named it (or the default tag).
    pub base: String,
    /// Every non-fatal condition, shown in the status line.
    pub warnings: Vec<String>,
    pub spinner: usize,
    /// The list is built and its pull requests are being looked up.
    pub looking_up_pulls: bool,
    /// Set when building the list failed; the main loop exits with it.
    pub fatal: Option<coi_core::Error>,
    quit: bool,
}

impl App {
    pub fn new(base: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            stage: Stage::Loading(Progress::default()),
            base: base.into(),
            warnings,
            spinner: 0,
            looking_up_pulls: false,
            fatal: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// True when the user asked for the proposed changelog on the way out.
    pub fn wants_changelog(&self) -> bool {
        match &self.stage {
            Stage::Review(session) => session.wants_changelog(),
            Stage::Loading(_) => false,
        }
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        match &self.stage {
            Stage::Review(session) => Some(session),
            Stage::Loading(_) => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut ReviewSession> {
        match &mut self.stage {
            Stage::Review(session) => Some(session),
            Stage::Loading(_) => None,
        }
    }

    pub fn tick(&mut self) {
        if matches!(self.stage, Stage::Loading(_)) {
            self.spinner = (self.spinner + 1) % SPINNER.len();
        }
    }

    /// Routes a user command; while loading, only quitting is possible.
    pub fn handle_command(&mut self, command: Command) -> Effect {
        let effect = match &mut self.stage {
            Stage::Review(session) => session.handle(command),
            Stage::Loading(_) => match command {
                Command::Quit | Command::Escape => Effect::Quit,
                _ => Effect::None,
            },
        };
        if effect == Effect::Quit {
            self.quit = true;
        }
        effect
    }

    /// Merges a completed value from the git worker.
    pub fn apply_git_event(&mut self, event: GitEvent) {
        match event {
            GitEvent::Progress(progress) => {
                if let Stage::Loading(current) = &mut self.stage {
                    *current = progress;
                }
            }
            GitEvent::LookingUpPullRequests => self.looking_up_pulls = true,
            GitEvent::Materialized(Ok(commits)) => {
                self.looking_up_pulls = false;
                for warning in commits.warnings() {
                    tracing::warn!(%warning, "commit range");
                    self.warnings.push(warning.to_string());
                }
                self.stage = Stage::Review(ReviewSession::new(commits));
            }
            GitEvent::Materialized(Err(err)) => {
                tracing::error!(error = %err, "could not build the commits of interest");
                self.fatal = Some(err);
                self.quit = true;
            }
            GitEvent::DiffLoaded { index, diff } => {
                if let Some(session) = self.session_mut() {
                    session.apply_diff(index, diff);
                }
            }
        }
    }

    /// Builds the worker requests for a [`Effect::Fetch`].
    ///
    /// Only surviving paths are requested; filtered paths are never fetched.
    pub fn diff_requests(&self, indices: &[usize]) -> Vec<GitRequest> {
        let Some(session) = self.session() else {
            return Vec::new();
        };
        indices
            .iter()
            .filter_map(|&index| {
                let commit = session.commits().get(index)?;
                let changes: Vec<ChangedPath> = commit.surviving().to_vec();
                let id: CommitId = commit.id().clone();
                Some(GitRequest::LoadDiff { index, commit: id, changes })
            })
            .collect()
    }
}
