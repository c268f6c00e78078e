//! Path filtering by exact component match.
//!
//! A [`FilterSet`] is built once at startup and passed explicitly to every
//! filtering call. Matching is **case-sensitive** and compares whole path
//! components only: the component rule `test` filters `test/a.rs` but never
//! `testing.go` or `src/contest/a.rs`.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::ConfigWarning;

/// Components filtered when no configuration says otherwise.
pub const DEFAULT_FILTERED_COMPONENTS: &[&str] = &[
    ".github",
    "CHANGELOG.md",
    "Cargo.toml",
    "Cargo.lock",
    "examples",
    "fixtures",
    "tests",
];

/// Repository-relative name of the per-repository override file.
pub const OVERRIDE_FILE_NAME: &str = ".filtered_components.txt";

/// Path separator used by every path the collaborator reports.
pub const SEPARATOR: char = '/';

/// Immutable set of filtered path components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    components: BTreeSet<String>,
}

impl FilterSet {
    /// Builds a set from arbitrary components.
    ///
    /// Surrounding whitespace is trimmed; empty entries and duplicates are ignored.
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let components = components
            .into_iter()
            .map(|c| c.as_ref().trim().to_owned())
            .filter(|c| !c.is_empty())
            .collect();
        Self { components }
    }

    /// The built-in default set.
    pub fn defaults() -> Self {
        Self::new(DEFAULT_FILTERED_COMPONENTS)
    }

    /// Returns a new set containing `self` plus `extra`.
    pub fn union<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut components = self.components.clone();
        components.extend(Self::new(extra).components);
        Self { components }
    }

    /// Unions `self` with the override file found at `repo_root`.
    ///
    /// A missing override file is not a problem. An unreadable one (permissions,
    /// invalid UTF-8) yields `self` unchanged plus a warning. Lines that contain
    /// a separator can never match a single component; they are skipped and
    /// reported in the warning.
    pub fn with_override_file(&self, repo_root: &Path) -> (Self, Option<ConfigWarning>) {
        let path = repo_root.join(OVERRIDE_FILE_NAME);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return (self.clone(), None),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "override file unreadable");
                let warning = ConfigWarning {
                    path,
                    message: format!("unreadable, using defaults ({err})"),
                };
                return (self.clone(), Some(warning));
            }
        };

        let (valid, rejected): (Vec<&str>, Vec<&str>) = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .partition(|line| !line.contains(SEPARATOR));

        let merged = self.union(valid);
        tracing::debug!(components = merged.len(), "filter set loaded");

        let warning = (!rejected.is_empty()).then(|| ConfigWarning {
            path,
            message: format!(
                "ignored entries containing '{SEPARATOR}': {}",
                rejected.join(", ")
            ),
        });
        (merged, warning)
    }

    pub fn contains(&self, component: &str) -> bool {
        self.components.contains(component)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// Shorthand for [`is_filtered`].
    pub fn is_filtered(&self, path: &str) -> bool {
        is_filtered(path, self)
    }
}

/// True iff some `/`-separated component of `path` is a member of `filters`.
pub fn is_filtered(path: &str, filters: &FilterSet) -> bool {
    path.split(SEPARATOR)
        .filter(|component| !component.is_empty())
        .any(|component| filters.contains(component))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn directory_component_matches() {
        let filters = FilterSet::new(["test"]);
        assert!(is_filtered("test/a.go", &filters));
        assert!(is_filtered("src/test/a.go", &filters));
    }

    #[test]
    fn substring_of_component_never_matches() {
        let filters = FilterSet::new(["test"]);
        assert!(!is_filtered("testing.go", &filters));
        assert!(!is_filtered("src/testing/x", &filters));
        assert!(!is_filtered("src/contest/x", &filters));
    }

    #[test]
    fn file_name_component_matches() {
        let filters = FilterSet::defaults();
        assert!(is_filtered("Cargo.lock", &filters));
        assert!(is_filtered("crates/core/Cargo.toml", &filters));
        assert!(!is_filtered("crates/core/src/lib.rs", &filters));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let filters = FilterSet::new(["tests"]);
        assert!(!is_filtered("Tests/a.rs", &filters));
    }

    #[test]
    fn empty_components_are_ignored() {
        let filters = FilterSet::new(["", "  ", "tests", "tests"]);
        assert_eq!(filters.len(), 1);
        assert!(!is_filtered("//a.rs", &filters));
        assert!(is_filtered("/tests//a.rs", &filters));
    }

    #[test]
    fn union_keeps_both_sides() {
        let merged = FilterSet::new(["a"]).union(["b", "a"]);
        assert_eq!(merged.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn missing_override_file_is_silent() {
        let dir = TempDir::new().unwrap();
        let (filters, warning) = FilterSet::defaults().with_override_file(dir.path());
        assert_eq!(filters, FilterSet::defaults());
        assert!(warning.is_none());
    }

    #[test]
    fn override_file_adds_components() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_FILE_NAME), "vendor\n\n  dist  \nvendor\n").unwrap();

        let (filters, warning) = FilterSet::defaults().with_override_file(dir.path());
        assert!(warning.is_none());
        assert!(filters.contains("vendor"));
        assert!(filters.contains("dist"));
        assert!(filters.contains("tests"));
        assert_eq!(filters.len(), DEFAULT_FILTERED_COMPONENTS.len() + 2);
    }

    #[test]
    fn override_entries_with_separator_are_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_FILE_NAME), "docs\nsrc/gen\n").unwrap();

        let (filters, warning) =
            FilterSet::new(Vec::<String>::new()).with_override_file(dir.path());
        assert!(filters.contains("docs"));
        assert!(!filters.contains("src/gen"));
        let warning = warning.expect("malformed entry should warn");
        assert!(warning.message.contains("src/gen"));
    }

    #[test]
    fn unreadable_override_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_FILE_NAME), b"\xff\xfe\x00\x80").unwrap();

        let (filters, warning) = FilterSet::defaults().with_override_file(dir.path());
        assert_eq!(filters, FilterSet::defaults());
        assert!(warning.is_some());
    }
}
