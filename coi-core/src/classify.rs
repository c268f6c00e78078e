//! Per-commit verdicts: does any changed path survive filtering?

use crate::filter::{is_filtered, FilterSet};
use crate::types::{ChangedPath, ClassifiedCommit, Commit};

/// True when `change` is entirely inside filtered territory.
///
/// A rename counts as filtered only when both its new and its old location are
/// filtered, so moving a file out of `tests/` into `src/` stays interesting.
pub fn is_change_filtered(change: &ChangedPath, filters: &FilterSet) -> bool {
    is_filtered(&change.path, filters)
        && change
            .old_path
            .as_deref()
            .map_or(true, |old| is_filtered(old, filters))
}

/// Classifies `commit` under `filters`.
///
/// Pure: the same commit and filter set always give the same result.
pub fn classify(commit: Commit, filters: &FilterSet) -> ClassifiedCommit {
    let surviving: Vec<ChangedPath> = commit
        .changes
        .iter()
        .filter(|change| !is_change_filtered(change, filters))
        .cloned()
        .collect();
    ClassifiedCommit::new(commit, surviving)
}
