//! Git operations abstraction layer
//!
//! Git sources are plain clones that rulekeeper keeps current by fetching
//! `origin` and fast-forwarding. Operations go through [`GitProvider`] so the
//! refresh logic can be exercised without a network.

use crate::Result;
use std::path::Path;

/// Name of the remote rulekeeper fetches from
pub const DEFAULT_REMOTE: &str = "origin";

/// Helper function to convert git2 errors to rulekeeper_core errors
#[inline]
fn git_err(e: git2::Error) -> rulekeeper_core::Error {
    rulekeeper_core::Error::Git(e.message().to_string())
}

/// Git provider trait defining all git operations needed by rulekeeper
pub trait GitProvider {
    /// Clone a repository from URL to target path
    fn clone(&self, url: &str, target: &Path) -> Result<()>;

    /// Fetch `origin` and fast-forward the checked out branch
    ///
    /// Returns the number of commits that were applied.
    fn pull(&self, repo_path: &Path) -> Result<usize>;

    /// Whether the repository has at least one remote configured
    fn has_remote(&self, repo_path: &Path) -> bool;

    /// Fetch URL of `origin`, if any
    fn remote_url(&self, repo_path: &Path) -> Option<String>;
}

/// Git provider implementation using git2 (libgit2)
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Provider;

impl Git2Provider {
    /// Provider backed by libgit2
    pub fn new() -> Self {
        Self
    }
}

impl GitProvider for Git2Provider {
    fn clone(&self, url: &str, target: &Path) -> Result<()> {
        use git2::build::RepoBuilder;

        RepoBuilder::new().clone(url, target).map_err(|e| {
            rulekeeper_core::Error::Git(format!(
                "Failed to clone repository from {url}. Check the URL and your network connection. Error: {}",
                e.message()
            ))
        })?;

        tracing::debug!(url, target = %target.display(), "Cloned source repository");
        Ok(())
    }

    fn pull(&self, repo_path: &Path) -> Result<usize> {
        use git2::{AutotagOption, FetchOptions, Repository, build::CheckoutBuilder};

        let repo = Repository::open(repo_path).map_err(git_err)?;
        let mut remote = repo.find_remote(DEFAULT_REMOTE).map_err(git_err)?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.download_tags(AutotagOption::Auto);
        remote
            .fetch(&["HEAD"], Some(&mut fetch_options), None)
            .map_err(git_err)?;

        let fetch_head = repo.find_reference("FETCH_HEAD").map_err(git_err)?;
        let fetch_commit = repo
            .reference_to_annotated_commit(&fetch_head)
            .map_err(git_err)?;

        let (analysis, _) = repo.merge_analysis(&[&fetch_commit]).map_err(git_err)?;
        if analysis.is_up_to_date() {
            return Ok(0);
        }
        if !analysis.is_fast_forward() {
            return Err(rulekeeper_core::Error::Git(format!(
                "{} has diverged from its remote; resolve it manually",
                repo_path.display()
            )));
        }

        let new_commits = count_new_commits(&repo, &fetch_commit)?;

        let head = repo.head().map_err(git_err)?;
        let ref_name = head
            .name()
            .ok_or_else(|| rulekeeper_core::Error::Git("Invalid reference name".to_string()))?
            .to_string();
        let mut reference = repo.find_reference(&ref_name).map_err(git_err)?;
        reference
            .set_target(
                fetch_commit.id(),
                &format!("rulekeeper: fast-forward to {}", fetch_commit.id()),
            )
            .map_err(git_err)?;
        repo.set_head(&ref_name).map_err(git_err)?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(git_err)?;

        tracing::debug!(commits = new_commits, "Fast-forwarded source repository");
        Ok(new_commits)
    }

    fn has_remote(&self, repo_path: &Path) -> bool {
        git2::Repository::open(repo_path)
            .and_then(|repo| repo.remotes())
            .is_ok_and(|remotes| !remotes.is_empty())
    }

    fn remote_url(&self, repo_path: &Path) -> Option<String> {
        let repo = git2::Repository::open(repo_path).ok()?;
        let remote = repo.find_remote(DEFAULT_REMOTE).ok()?;
        remote.url().map(str::to_string)
    }
}

/// Helper function to count commits reachable from `new_commit` but not HEAD
fn count_new_commits(repo: &git2::Repository, new_commit: &git2::AnnotatedCommit) -> Result<usize> {
    let head_commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .map_err(git_err)?;

    let mut revwalk = repo.revwalk().map_err(git_err)?;
    revwalk.push(new_commit.id()).map_err(git_err)?;
    revwalk.hide(head_commit.id()).map_err(git_err)?;

    Ok(revwalk.count())
}

/// Whether `path` is the root of a git working tree
pub fn is_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Whether `input` looks like a git remote URL rather than a local path
pub fn is_git_url(input: &str) -> bool {
    input.starts_with("git@")
        || input.starts_with("https://github.com")
        || input.starts_with("https://gitlab.com")
        || input.starts_with("https://bitbucket.org")
        || input.ends_with(".git")
}

/// Repository name derived from a remote URL (`git@host:team/rules.git` → `rules`)
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "rules".to_string()
    } else {
        name.to_string()
    }
}

/// Create the default git provider
pub fn create_provider() -> Box<dyn GitProvider> {
    Box::new(Git2Provider::new())
}
