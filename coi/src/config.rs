//! User configuration for coi.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/coi/config.toml`. A missing
//! file means defaults; an unreadable or malformed one means defaults plus a
//! [`ConfigWarning`] that ends up in the status line.

use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use coi_core::{ConfigWarning, FilterSet, Order};
use serde::Deserialize;

/// Enumeration order as spelled on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderArg {
    OldestFirst,
    NewestFirst,
}

impl From<OrderArg> for Order {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::OldestFirst => Order::OldestFirst,
            OrderArg::NewestFirst => Order::NewestFirst,
        }
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Theme name, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub theme: Option<String>,
    pub order: Option<OrderArg>,
    /// Components filtered in addition to the defaults.
    pub filtered_components: Vec<String>,
    /// Set to `false` to filter only what the config and override file list.
    pub use_default_filters: bool,
    /// Look up pull requests with `gh` when `origin` is on GitHub.
    pub pull_requests: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            order: None,
            filtered_components: Vec::new(),
            use_default_filters: true,
            pull_requests: true,
        }
    }
}

/// Returns the path to the coi config file.
///
/// Prefers `$XDG_CONFIG_HOME/coi/config.toml`; falls back to
/// `~/.config/coi/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("coi").join("config.toml")
}

impl Config {
    /// Loads the config at `path`. Never fails; problems become a warning.
    pub fn load(path: &Path) -> (Self, Option<ConfigWarning>) {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return (Self::default(), None),
            Err(err) => {
                return (
                    Self::default(),
                    Some(ConfigWarning {
                        path: path.to_path_buf(),
                        message: format!("unreadable, using defaults: {err}"),
                    }),
                );
            }
        };
        match toml::from_str(&raw) {
            Ok(config) => (config, None),
            Err(err) => (
                Self::default(),
                Some(ConfigWarning {
                    path: path.to_path_buf(),
                    message: format!("invalid, using defaults: {}", err.message()),
                }),
            ),
        }
    }

    /// Builds the filter set for the repository rooted at `repo_root`.
    ///
    /// Starts from the defaults (unless disabled), adds the configured
    /// components and finally the repository's override file.
    pub fn filter_set(
        &self,
        config_file: &Path,
        repo_root: &Path,
    ) -> (FilterSet, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let base = if self.use_default_filters {
            FilterSet::defaults()
        } else {
            FilterSet::new(Vec::<String>::new())
        };

        let (valid, invalid): (Vec<&String>, Vec<&String>) = self
            .filtered_components
            .iter()
            .partition(|component| !component.contains('/'));
        if !invalid.is_empty() {
            let names: Vec<&str> = invalid.iter().map(|c| c.as_str()).collect();
            warnings.push(ConfigWarning {
                path: config_file.to_path_buf(),
                message: format!("ignoring components containing '/': {}", names.join(", ")),
            });
        }

        let (filters, warning) = base.union(valid).with_override_file(repo_root);
        warnings.extend(warning);
        (filters, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_gives_defaults_silently() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warning) = Config::load(&dir.path().join("config.toml"));
        assert_eq!(config, Config::default());
        assert!(config.use_default_filters);
        assert!(config.pull_requests);
        assert!(warning.is_none());
    }

    #[test]
    fn parses_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
theme = "catppuccin-mocha"
order = "newest-first"
filtered_components = ["vendor", "benches"]
use_default_filters = false
pull_requests = false
"#,
        )
        .unwrap();

        let (config, warning) = Config::load(&path);
        assert!(warning.is_none());
        assert_eq!(config.theme.as_deref(), Some("catppuccin-mocha"));
        assert_eq!(config.order, Some(OrderArg::NewestFirst));
        assert_eq!(config.filtered_components, vec!["vendor", "benches"]);
        assert!(!config.use_default_filters);
        assert!(!config.pull_requests);
    }

    #[test]
    fn malformed_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "order = \"sideways\"\n").unwrap();

        let (config, warning) = Config::load(&path);
        assert_eq!(config, Config::default());
        let warning = warning.expect("warning");
        assert_eq!(warning.path, path);
        assert!(warning.message.starts_with("invalid, using defaults"));
    }

    #[test]
    fn filter_set_combines_sources() {
        let repo = tempfile::tempdir().unwrap();
        fs::write(repo.path().join(".filtered_components.txt"), "docs\n").unwrap();
        let config = Config {
            filtered_components: vec!["vendor".to_owned(), "a/b".to_owned()],
            use_default_filters: false,
            ..Config::default()
        };

        let (filters, warnings) = config.filter_set(Path::new("config.toml"), repo.path());
        let names: Vec<&str> = filters.iter().collect();
        assert_eq!(names, vec!["docs", "vendor"]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("a/b"));
    }

    #[test]
    fn defaults_are_kept_unless_disabled() {
        let repo = tempfile::tempdir().unwrap();
        let (filters, warnings) =
            Config::default().filter_set(Path::new("config.toml"), repo.path());
        assert!(warnings.is_empty());
        assert!(filters.contains("tests"));
    }
}
