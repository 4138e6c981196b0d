//! Rule source access
//!
//! A source is a directory of `*.md` rule files, optionally a git clone that
//! is refreshed before commands run.

use crate::hash::{ContentHash, hash_rule_file};
use crate::resolver::{RuleIndex, is_ignored_rule, rule_filename, rule_name};
use crate::system::{RealSystem, System};
use chrono::{DateTime, Utc};
use rulekeeper_config::git::{GitProvider, is_git_repo};
use rulekeeper_config::GlobalConfig;
use rulekeeper_core::path::RULE_EXTENSION;
use rulekeeper_core::{Error, Result};
use std::path::{Path, PathBuf};

/// A rule present in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableRule {
    /// Rule name (file name without `.md`)
    pub name: String,
    /// File name inside the source
    pub file: String,
    /// Absolute path of the file
    pub path: PathBuf,
}

/// Read access to the rule source
pub trait SourceGateway {
    /// Source root directory
    fn root(&self) -> &Path;

    /// Every rule in the source, sorted by name, README excluded
    fn available_rules(&self) -> Result<Vec<AvailableRule>>;

    /// Path of `name` inside the source (whether or not it exists)
    fn rule_path(&self, name: &str) -> PathBuf {
        self.root().join(rule_filename(name))
    }

    /// Whether `name` exists in the source
    fn exists(&self, name: &str) -> bool {
        self.rule_path(name).is_file()
    }

    /// Hash of `name`, `None` if absent
    fn hash(&self, name: &str) -> Result<Option<ContentHash>> {
        hash_rule_file(name, &self.rule_path(name))
    }

    /// Content of `name` for display, invalid UTF-8 replaced
    fn read(&self, name: &str) -> Result<String> {
        let path = self.rule_path(name);
        RealSystem
            .read_text(&path)
            .map_err(|e| Error::file_system(name, path, e))
    }

    /// Exact source names for `requested`, or `RuleNotFound` listing every miss
    fn resolve_all(&self, requested: &[String]) -> Result<Vec<String>> {
        let available = self.available_rules()?;
        let names: Vec<&str> = available.iter().map(|r| r.name.as_str()).collect();
        let index = RuleIndex::new(names.iter().copied());
        let (found, missing) = index.partition(requested);
        if !missing.is_empty() {
            return Err(Error::RuleNotFound {
                names: missing.into_iter().map(str::to_string).collect(),
                scope: "source".to_string(),
            });
        }
        Ok(found.into_iter().map(str::to_string).collect())
    }
}

/// Source backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalSource<S: System = RealSystem> {
    root: PathBuf,
    system: S,
}

impl LocalSource<RealSystem> {
    /// Source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_system(root, RealSystem)
    }

    /// Source described by the global config
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.source.path.clone())
    }
}

impl<S: System> LocalSource<S> {
    /// Source rooted at `root` using a custom filesystem backend
    pub fn with_system(root: impl Into<PathBuf>, system: S) -> Self {
        Self {
            root: root.into(),
            system,
        }
    }
}

impl<S: System> SourceGateway for LocalSource<S> {
    fn root(&self) -> &Path {
        &self.root
    }

    fn available_rules(&self) -> Result<Vec<AvailableRule>> {
        if !self.system.exists(&self.root) {
            return Err(Error::Message(format!(
                "Source directory {} does not exist",
                self.root.display()
            )));
        }
        let files = self.system.list_files(&self.root, RULE_EXTENSION)?;
        let mut rules: Vec<AvailableRule> = files
            .into_iter()
            .filter(|file| !is_ignored_rule(file))
            .map(|file| AvailableRule {
                name: rule_name(&file).to_string(),
                path: self.root.join(&file),
                file,
            })
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rules)
    }

    fn exists(&self, name: &str) -> bool {
        self.system.exists(&self.rule_path(name))
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.rule_path(name);
        self.system
            .read_text(&path)
            .map_err(|e| Error::file_system(name, path, e))
    }
}

/// Result of an automatic refresh attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The source was fetched and fast-forwarded
    Pulled {
        /// Commits applied
        commits: usize,
    },
    /// The source is not a git repository
    NotGitRepo,
    /// The refresh interval has not elapsed (or refresh is disabled)
    NotDue,
    /// The repository has no remote to pull from
    NoRemote,
    /// The pull failed; commands continue with what is on disk
    Failed(String),
}

impl RefreshOutcome {
    /// Whether the caller should record a new `lastPull`
    pub fn pulled(&self) -> bool {
        matches!(self, Self::Pulled { .. })
    }

    /// Failure converted to the error taxonomy, if any
    pub fn error(&self) -> Option<Error> {
        match self {
            Self::Failed(reason) => Some(Error::SourceUnreachable(reason.clone())),
            _ => None,
        }
    }
}

/// Refresh the source if the config says it is due
///
/// Never fails: a pull error is returned as [`RefreshOutcome::Failed`].
pub fn refresh_if_due(
    config: &GlobalConfig,
    git: &dyn GitProvider,
    now: DateTime<Utc>,
) -> RefreshOutcome {
    let path = &config.source.path;
    if !is_git_repo(path) {
        return RefreshOutcome::NotGitRepo;
    }
    if !config.should_refresh_now(now) {
        return RefreshOutcome::NotDue;
    }
    if !git.has_remote(path) {
        return RefreshOutcome::NoRemote;
    }

    match git.pull(path) {
        Ok(commits) => {
            tracing::debug!(commits, "Source refreshed");
            RefreshOutcome::Pulled { commits }
        }
        Err(e) => {
            tracing::warn!("Source refresh failed: {e}");
            RefreshOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use rulekeeper_config::{PullFrequency, SourceConfig, SourceType};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    struct FakeGit {
        remote: bool,
        fail: bool,
        pulls: Cell<usize>,
    }

    impl GitProvider for FakeGit {
        fn clone(&self, _url: &str, _target: &Path) -> Result<()> {
            Ok(())
        }

        fn pull(&self, _repo_path: &Path) -> Result<usize> {
            self.pulls.set(self.pulls.get() + 1);
            if self.fail {
                Err(Error::Git("network unreachable".into()))
            } else {
                Ok(2)
            }
        }

        fn has_remote(&self, _repo_path: &Path) -> bool {
            self.remote
        }

        fn remote_url(&self, _repo_path: &Path) -> Option<String> {
            None
        }
    }

    fn fake(remote: bool, fail: bool) -> FakeGit {
        FakeGit {
            remote,
            fail,
            pulls: Cell::new(0),
        }
    }

    fn config(path: &Path, frequency: PullFrequency) -> GlobalConfig {
        GlobalConfig::new(
            SourceConfig {
                kind: SourceType::Git,
                path: path.to_path_buf(),
                remote: None,
            },
            frequency,
        )
    }

    fn source_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("laravel.md"), "# Laravel\n").unwrap();
        fs::write(temp.path().join("Vue.md"), "# Vue\n").unwrap();
        fs::write(temp.path().join("README.md"), "docs").unwrap();
        fs::write(temp.path().join("notes.txt"), "skip").unwrap();
        temp
    }

    #[test]
    fn test_available_rules_skip_readme_and_other_files() {
        let temp = source_dir();
        let source = LocalSource::new(temp.path());
        let names: Vec<String> = source
            .available_rules()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Vue", "laravel"]);
    }

    #[test]
    fn test_available_rules_missing_dir() {
        let temp = TempDir::new().unwrap();
        let source = LocalSource::new(temp.path().join("missing"));
        assert!(source.available_rules().is_err());
    }

    #[test]
    fn test_exists_hash_and_read() {
        let temp = source_dir();
        let source = LocalSource::new(temp.path());
        assert!(source.exists("laravel"));
        assert!(!source.exists("react"));
        assert!(source.hash("laravel").unwrap().is_some());
        assert_eq!(source.hash("react").unwrap(), None);
        assert_eq!(source.read("laravel.md").unwrap(), "# Laravel\n");
    }

    #[test]
    fn test_hash_failure_names_the_rule() {
        let temp = source_dir();
        std::fs::create_dir(temp.path().join("broken.md")).unwrap();
        let source = LocalSource::new(temp.path());

        let err = source.hash("broken").unwrap_err();
        assert!(
            matches!(&err, Error::FileSystem { rule, .. } if rule == "broken"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_resolve_all_reports_every_missing_name() {
        let temp = source_dir();
        let source = LocalSource::new(temp.path());

        let resolved = source
            .resolve_all(&["LARAVEL".to_string(), "vue".to_string()])
            .unwrap();
        assert_eq!(resolved, vec!["laravel", "Vue"]);

        let err = source
            .resolve_all(&["laravel".to_string(), "react".to_string(), "go".to_string()])
            .unwrap_err();
        match err {
            Error::RuleNotFound { names, .. } => assert_eq!(names, vec!["react", "go"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_refresh_skips_non_git_source() {
        let temp = TempDir::new().unwrap();
        let git = fake(true, false);
        let outcome = refresh_if_due(&config(temp.path(), PullFrequency::Always), &git, Utc::now());
        assert_eq!(outcome, RefreshOutcome::NotGitRepo);
        assert_eq!(git.pulls.get(), 0);
    }

    #[test]
    fn test_refresh_respects_gate_and_remote() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let git = fake(true, false);
        let never = config(temp.path(), PullFrequency::Never);
        assert_eq!(refresh_if_due(&never, &git, Utc::now()), RefreshOutcome::NotDue);

        let no_remote = fake(false, false);
        let always = config(temp.path(), PullFrequency::Always);
        assert_eq!(
            refresh_if_due(&always, &no_remote, Utc::now()),
            RefreshOutcome::NoRemote
        );
        assert_eq!(git.pulls.get() + no_remote.pulls.get(), 0);
    }

    #[test]
    fn test_refresh_pulls_and_reports_failure() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let always = config(temp.path(), PullFrequency::Always);

        let ok = refresh_if_due(&always, &fake(true, false), Utc::now());
        assert!(ok.pulled());
        assert!(ok.error().is_none());

        let failed = refresh_if_due(&always, &fake(true, true), Utc::now());
        assert!(!failed.pulled());
        assert!(matches!(failed.error(), Some(Error::SourceUnreachable(_))));
    }
}
