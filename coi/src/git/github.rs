//! Pull-request lookup through the GitHub CLI.
//!
//! Commits are sent in batches of [`BATCH_SIZE`], one GraphQL query per batch,
//! via `gh api graphql`. The lookup is best effort: the caller turns a failure
//! into a warning and shows the list without labels.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Context as _};
use coi_core::changelog::GithubRemote;
use coi_core::{CommitId, PullRequests};
use serde::Deserialize;

/// Commits per GraphQL query.
pub const BATCH_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
struct Response {
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
struct Data {
    /// Keyed by the `c{i}` aliases of the query.
    repository: Option<HashMap<String, Option<CommitNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    associated_pull_requests: Option<Connection>,
}

#[derive(Debug, Deserialize)]
struct Connection {
    nodes: Vec<PullNode>,
}

#[derive(Debug, Deserialize)]
struct PullNode {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    message: String,
}

/// Looks up the pull request that introduced each commit in `ids`.
///
/// Stops between batches once `cancel` is set and returns what was found.
///
/// # Errors
///
/// Fails when `gh` is missing, exits unsuccessfully, or answers with
/// something other than repository data.
pub fn lookup_pull_requests(
    remote: &GithubRemote,
    ids: &[CommitId],
    cancel: &AtomicBool,
) -> anyhow::Result<PullRequests> {
    lookup_with(remote, ids, cancel, run_gh)
}

fn lookup_with(
    remote: &GithubRemote,
    ids: &[CommitId],
    cancel: &AtomicBool,
    mut run: impl FnMut(&str) -> anyhow::Result<Vec<u8>>,
) -> anyhow::Result<PullRequests> {
    let mut found = PullRequests::new();
    for batch in ids.chunks(BATCH_SIZE) {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let body = run(&graphql_query(remote, batch))?;
        found.extend(parse_response(batch, &body)?);
    }
    tracing::info!(
        commits = ids.len(),
        found = found.len(),
        repository = %format!("{}/{}", remote.owner, remote.name),
        "pull requests looked up"
    );
    Ok(found)
}

fn run_gh(query: &str) -> anyhow::Result<Vec<u8>> {
    let output = match Command::new("gh")
        .args(["api", "graphql", "-f"])
        .arg(format!("query={query}"))
        .output()
    {
        Ok(output) => output,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            bail!("the GitHub CLI `gh` is not installed")
        }
        Err(err) => return Err(err).context("cannot run `gh`"),
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr.lines().next().unwrap_or("no output").trim().to_owned();
        bail!("`gh api graphql` failed: {reason}");
    }
    Ok(output.stdout)
}

/// One aliased `object(oid:)` lookup per commit, `c0` to `cN`.
fn graphql_query(remote: &GithubRemote, ids: &[CommitId]) -> String {
    let mut query = format!(
        "query {{\n  repository(owner: \"{}\", name: \"{}\") {{\n",
        remote.owner, remote.name
    );
    for (i, id) in ids.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = writeln!(
            query,
            "    c{i}: object(oid: \"{id}\") {{ ... on Commit {{ \
             associatedPullRequests(first: 1) {{ nodes {{ number }} }} }} }}"
        );
    }
    query.push_str("  }\n}");
    query
}

/// Pairs each id of the batch with the first pull request GitHub reports.
fn parse_response(ids: &[CommitId], body: &[u8]) -> anyhow::Result<Vec<(CommitId, u64)>> {
    let response: Response =
        serde_json::from_slice(body).context("unexpected answer from GitHub")?;
    let Some(repository) = response.data.and_then(|data| data.repository) else {
        match response.errors.first() {
            Some(error) => bail!("GitHub: {}", error.message),
            None => bail!("GitHub returned no repository data"),
        }
    };

    Ok(ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let node = repository.get(&format!("c{i}"))?.as_ref()?;
            let pull = node.associated_pull_requests.as_ref()?.nodes.first()?;
            Some((id.clone(), pull.number))
        })
        .collect())
}
