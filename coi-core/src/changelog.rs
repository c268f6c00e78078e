//! Proposed changelog text built from the commits of interest, and the
//! GitHub details used to link it.

use std::collections::HashMap;
use std::fmt::Write;

use crate::types::{ClassifiedCommit, CommitId};

/// A repository hosted on GitHub, used to link commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRemote {
    pub owner: String,
    pub name: String,
}

impl GithubRemote {
    /// Parses `git@github.com:owner/repo.git` or `https://github.com/owner/repo(.git)`.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let path = url
            .strip_prefix("git@github.com:")
            .or_else(|| url.strip_prefix("https://github.com/"))
            .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;
        let path = path.strip_suffix(".git").unwrap_or(path);
        let path = path.trim_end_matches('/');
        let (owner, name) = path.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    pub fn commit_url(&self, id: &str) -> String {
        format!("https://github.com/{}/{}/commit/{id}", self.owner, self.name)
    }

    pub fn pull_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/pull/{number}", self.owner, self.name)
    }
}

/// Label shown for commits without a known pull request.
pub const NO_PULL_REQUEST: &str = "??";

/// Pull-request numbers of the commits that have one.
///
/// Annotation only: attaching these to a list never reorders it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequests {
    numbers: HashMap<CommitId, u64>,
    /// Width of the widest label, kept so rendering never scans the map.
    widest: usize,
}

impl PullRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, commit: CommitId, number: u64) {
        self.widest = self.widest.max(number.to_string().len() + 1);
        self.numbers.insert(commit, number);
    }

    pub fn get(&self, commit: &CommitId) -> Option<u64> {
        self.numbers.get(commit).copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// `#N`, or [`NO_PULL_REQUEST`] when the commit has none.
    pub fn label(&self, commit: &CommitId) -> String {
        match self.get(commit) {
            Some(number) => format!("#{number}"),
            None => NO_PULL_REQUEST.to_owned(),
        }
    }

    /// Column width that fits every label.
    pub fn label_width(&self) -> usize {
        self.widest.max(NO_PULL_REQUEST.len())
    }
}

impl Extend<(CommitId, u64)> for PullRequests {
    fn extend<I: IntoIterator<Item = (CommitId, u64)>>(&mut self, iter: I) {
        for (commit, number) in iter {
            self.insert(commit, number);
        }
    }
}

impl FromIterator<(CommitId, u64)> for PullRequests {
    fn from_iter<I: IntoIterator<Item = (CommitId, u64)>>(iter: I) -> Self {
        let mut pulls = Self::new();
        pulls.extend(iter);
        pulls
    }
}

/// One markdown bullet per commit: `- summary [short](url)`, or `- summary (short)`
/// when no GitHub remote is known. A known pull request is appended as
/// `([#N](url))`, or `#N` without a remote.
pub fn format_proposed_changelog(
    commits: &[ClassifiedCommit],
    pulls: &PullRequests,
    remote: Option<&GithubRemote>,
) -> String {
    let mut content = String::new();
    for commit in commits {
        let meta = commit.meta();
        let short = meta.id.short();
        let pull = pulls.get(&meta.id);
        // Writing into a String cannot fail.
        let _ = match remote {
            Some(remote) => write!(
                content,
                "- {} [{}]({})",
                meta.summary,
                short,
                remote.commit_url(meta.id.as_str())
            ),
            None => write!(content, "- {} ({})", meta.summary, short),
        };
        let _ = match (pull, remote) {
            (Some(number), Some(remote)) => {
                writeln!(content, " ([#{number}]({}))", remote.pull_url(number))
            }
            (Some(number), None) => writeln!(content, " #{number}"),
            (None, _) => writeln!(content),
        };
    }
    content
}
