//! Source command implementation
//!
//! Show, replace or manually refresh the rule source.

use chrono::{Local, Utc};
use clap::Subcommand;
use owo_colors::OwoColorize;
use rulekeeper_config::dirs::{contract_tilde, default_clone_dir, expand_tilde};
use rulekeeper_config::git::{
    GitProvider, create_provider, is_git_repo, is_git_url, repo_name_from_url,
};
use rulekeeper_config::{SourceConfig, SourceType};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui;

/// Source subcommands
#[derive(Debug, Subcommand)]
pub enum SourceCommand {
    /// Show the configured source
    Show,

    /// Point rulekeeper at a different folder or git repository
    Set {
        /// Local folder or git URL
        #[arg(value_name = "PATH_OR_URL")]
        path_or_url: String,

        /// Where to clone a git source (default: ~/Documents/<repo>)
        #[arg(long, value_name = "DIR")]
        clone_path: Option<PathBuf>,
    },

    /// Pull the latest rules from the source remote now
    Pull,
}

impl Command for SourceCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        match self {
            SourceCommand::Show => {
                show(context);
                Ok(())
            }
            SourceCommand::Set {
                path_or_url,
                clone_path,
            } => set(context, path_or_url, clone_path.as_deref()),
            SourceCommand::Pull => pull(context),
        }
    }
}

/// Build a source config from a local path or a git URL
///
/// Git URLs are cloned to `clone_path` (or `~/Documents/<repo>`). Local
/// folders must exist; a local git checkout with an `origin` is recorded as a
/// git source with that remote.
pub fn configure_source(
    path_or_url: &str,
    clone_path: Option<&Path>,
    git: &dyn GitProvider,
) -> Result<SourceConfig> {
    if is_git_url(path_or_url) {
        let target = match clone_path {
            Some(path) => expand_tilde(path),
            None => default_clone_dir(&repo_name_from_url(path_or_url)).ok_or_else(|| {
                CommandError::usage("Could not determine a clone directory; pass --clone-path")
            })?,
        };
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let spinner = ui::create_spinner("Cloning repository...");
        let cloned = git.clone(path_or_url, &target);
        spinner.finish_and_clear();
        cloned?;
        ui::success("Repository cloned successfully.");

        return Ok(SourceConfig {
            kind: SourceType::Git,
            path: target,
            remote: Some(path_or_url.to_string()),
        });
    }

    let path = expand_tilde(Path::new(path_or_url));
    if !path.is_dir() {
        return Err(CommandError::usage(format!(
            "Source path does not exist: {}",
            path.display()
        )));
    }
    let path = std::fs::canonicalize(&path)?;

    let remote = if is_git_repo(&path) {
        git.remote_url(&path)
    } else {
        None
    };
    if let Some(url) = &remote {
        debug!(remote = %url, "Detected git remote");
        ui::info(&format!("Detected git repository with remote: {url}"));
    }

    Ok(SourceConfig {
        kind: if remote.is_some() {
            SourceType::Git
        } else {
            SourceType::Local
        },
        path,
        remote,
    })
}

fn show(context: &RuntimeContext) {
    let config = &context.config;
    let source = &config.source;

    ui::header("Source Configuration");
    println!("  Type:   {}", source.kind);
    println!("  Path:   {}", contract_tilde(&source.path).cyan());
    let remote = source
        .remote
        .clone()
        .or_else(|| create_provider().remote_url(&source.path));
    if let Some(remote) = remote {
        println!("  Remote: {remote}");
    }

    println!();
    let settings = &config.settings;
    println!(
        "  Auto-pull:  {}",
        if settings.auto_pull { "enabled" } else { "disabled" }
    );
    println!("  Frequency:  {}", settings.pull_frequency);
    if let Some(last) = settings.last_pull {
        println!(
            "  Last pull:  {}",
            last.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
}

fn set(context: &RuntimeContext, path_or_url: &str, clone_path: Option<&Path>) -> Result<()> {
    let git = create_provider();
    let source = configure_source(path_or_url, clone_path, git.as_ref())?;

    let mut config = context.config.clone();
    config.source = source;
    config.settings.last_pull = None;
    config.save(&context.config_path)?;

    ui::success(&format!(
        "Source updated to: {}",
        contract_tilde(&config.source.path)
    ));
    Ok(())
}

fn pull(context: &RuntimeContext) -> Result<()> {
    let path = &context.config.source.path;
    let git = create_provider();

    if !is_git_repo(path) {
        return Err(CommandError::usage("Source is not a git repository."));
    }
    if !git.has_remote(path) {
        return Err(CommandError::usage(
            "Source repository has no remote configured.",
        ));
    }

    let spinner = ui::create_spinner("Pulling from remote...");
    let pulled = git.pull(path);
    spinner.finish_and_clear();
    let commits = pulled?;

    let mut config = context.config.clone();
    config.record_pull(Utc::now());
    config.save(&context.config_path)?;

    if commits == 0 {
        ui::success("Source is already up to date.");
    } else {
        ui::success(&format!(
            "Source updated successfully ({}).",
            ui::plural(commits, "new commit")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingGit {
        cloned: RefCell<Vec<(String, PathBuf)>>,
        remote: Option<String>,
    }

    impl GitProvider for RecordingGit {
        fn clone(&self, url: &str, target: &Path) -> rulekeeper_core::Result<()> {
            std::fs::create_dir_all(target)?;
            self.cloned
                .borrow_mut()
                .push((url.to_string(), target.to_path_buf()));
            Ok(())
        }

        fn pull(&self, _repo_path: &Path) -> rulekeeper_core::Result<usize> {
            Ok(0)
        }

        fn has_remote(&self, _repo_path: &Path) -> bool {
            self.remote.is_some()
        }

        fn remote_url(&self, _repo_path: &Path) -> Option<String> {
            self.remote.clone()
        }
    }

    #[test]
    fn test_configure_local_source() {
        let temp = TempDir::new().unwrap();
        let git = RecordingGit::default();
        let source = configure_source(temp.path().to_str().unwrap(), None, &git).unwrap();

        assert_eq!(source.kind, SourceType::Local);
        assert_eq!(source.path, std::fs::canonicalize(temp.path()).unwrap());
        assert!(source.remote.is_none());
    }

    #[test]
    fn test_configure_local_git_checkout_becomes_git_source() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let git = RecordingGit {
            remote: Some("git@github.com:team/rules.git".to_string()),
            ..RecordingGit::default()
        };

        let source = configure_source(temp.path().to_str().unwrap(), None, &git).unwrap();
        assert_eq!(source.kind, SourceType::Git);
        assert_eq!(source.remote.as_deref(), Some("git@github.com:team/rules.git"));
    }

    #[test]
    fn test_configure_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = configure_source(missing.to_str().unwrap(), None, &RecordingGit::default())
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_configure_git_url_clones_to_clone_path() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("clones").join("rules");
        let git = RecordingGit::default();

        let source =
            configure_source("https://github.com/team/rules.git", Some(&target), &git).unwrap();

        assert_eq!(source.kind, SourceType::Git);
        assert_eq!(source.path, target);
        assert_eq!(source.remote.as_deref(), Some("https://github.com/team/rules.git"));
        assert_eq!(git.cloned.borrow().len(), 1);
    }
}
