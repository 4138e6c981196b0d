//! Reconciliation engine
//!
//! Decides what happens to each tracked rule when the operator adds, pulls,
//! attaches, detaches or removes it. The manifest is passed in and mutated in
//! place; the caller loads it before and saves it after, so a whole command
//! writes the manifest once.
//!
//! Failures on one rule (copy, delete, read) are recorded in the report and
//! the batch continues. Validation failures abort before anything is touched.

use crate::decision::{
    AddConflictAction, AddConflictContext, AttachAction, ConflictAction, ConflictContext,
    Decision, DecisionProvider, MissingLocalAction, MissingSourceAction,
};
use crate::diff::{DiffAlgorithm, DiffLine, diff};
use crate::hash::{ContentHash, hash_rule_file};
use crate::manifest::{ProjectManifest, RuleEntry, RuleStatus};
use crate::resolver::{is_ignored_rule, rule_filename};
use crate::source::SourceGateway;
use crate::status::{self, Observed, StatusCheck};
use crate::system::{RealSystem, System};
use chrono::Utc;
use rulekeeper_core::{Error, ProjectLayout, Result};
use std::path::{Path, PathBuf};

/// What happened to one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Newly copied from the source and tracked
    Added,
    /// Local copy replaced with the source
    Updated,
    /// Missing local copy restored from the source
    Restored,
    /// Nothing changed on either side
    UpToDate,
    /// Left as is
    Skipped,
    /// Now detached
    Detached,
    /// No longer tracked
    Removed,
    /// A file operation failed
    Failed(String),
}

/// Per-command result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Outcome of every processed rule, in processing order
    pub outcomes: Vec<(String, RuleOutcome)>,
    /// Requested names that did not resolve
    pub not_found: Vec<String>,
    /// Non-fatal problems worth showing
    pub warnings: Vec<String>,
    /// The operator cancelled a single-rule operation
    pub cancelled: bool,
}

impl SyncReport {
    fn push(&mut self, rule: &str, outcome: RuleOutcome) {
        self.outcomes.push((rule.to_string(), outcome));
    }

    /// Number of rules with the given outcome
    pub fn count(&self, outcome: &RuleOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| std::mem::discriminant(o) == std::mem::discriminant(outcome))
            .count()
    }

    /// Names of the rules with the given outcome
    pub fn names(&self, outcome: &RuleOutcome) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| std::mem::discriminant(o) == std::mem::discriminant(outcome))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Rules that failed with their error message
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(n, o)| match o {
                RuleOutcome::Failed(msg) => Some((n.as_str(), msg.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Rules whose local copy was written
    pub fn changed(&self) -> usize {
        self.count(&RuleOutcome::Added)
            + self.count(&RuleOutcome::Updated)
            + self.count(&RuleOutcome::Restored)
    }
}

/// Options for [`Reconciler::pull`]
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Rules to pull; empty means every tracked rule
    pub rules: Vec<String>,
    /// Discard local edits without asking
    pub force: bool,
    /// Also process detached rules
    pub include_detached: bool,
}

/// Options for [`Reconciler::add`]
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Rules to add
    pub rules: Vec<String>,
    /// Add every rule in the source
    pub all: bool,
}

/// Result of [`Reconciler::attach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Tracking resumed; local matches source
    Attached,
    /// Tracking resumed with local edits kept; the rule shows as diverged
    AttachedDiverged,
    /// The rule was not detached
    AlreadyAttached,
    /// The operator cancelled; the rule stays detached
    Cancelled,
}

/// Result of [`Reconciler::detach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The rule is now detached
    Detached,
    /// The rule was already detached
    AlreadyDetached,
}

/// Status line for one tracked rule
#[derive(Debug, Clone)]
pub struct RuleReport {
    /// Tracked name
    pub name: String,
    /// Manifest entry
    pub entry: RuleEntry,
    /// Classification against the disk
    pub check: StatusCheck,
}

/// Comparison of one rule's source and local copies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDiff {
    /// Neither copy exists
    BothMissing,
    /// Only the local copy exists
    SourceMissing,
    /// Only the source copy exists
    LocalMissing,
    /// Contents are byte-identical
    Identical,
    /// Contents differ
    Changes(Vec<DiffLine>),
}

enum Step {
    Done(RuleOutcome),
    Cancel,
}

/// Applies reconciliation decisions to one project
pub struct Reconciler<'a> {
    layout: &'a ProjectLayout,
    source: &'a dyn SourceGateway,
    system: &'a dyn System,
    diff_algorithm: DiffAlgorithm,
}

impl<'a> Reconciler<'a> {
    /// Reconciler for `layout` reading from `source`, using the real filesystem
    pub fn new(layout: &'a ProjectLayout, source: &'a dyn SourceGateway) -> Self {
        Self {
            layout,
            source,
            system: &RealSystem,
            diff_algorithm: DiffAlgorithm::default(),
        }
    }

    /// Use a different filesystem backend
    #[must_use]
    pub fn with_system(mut self, system: &'a dyn System) -> Self {
        self.system = system;
        self
    }

    /// Diff algorithm used when the operator asks to view a diff
    #[must_use]
    pub fn with_diff_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.diff_algorithm = algorithm;
        self
    }

    fn local_path(&self, entry: &RuleEntry) -> PathBuf {
        self.layout.rules_dir().join(&entry.file)
    }

    fn hash_local(&self, rule: &str, path: &Path) -> Result<Option<ContentHash>> {
        hash_rule_file(rule, path)
    }

    fn observe(&self, rule: &str, entry: &RuleEntry) -> Result<Observed> {
        Observed::from_disk(rule, &self.local_path(entry), &self.source.rule_path(rule))
    }

    /// Copy the source rule over `target` and hash the result
    fn install(&self, rule: &str, target: &Path) -> Result<ContentHash> {
        let from = self.source.rule_path(rule);
        self.system
            .copy_file(&from, target)
            .map_err(|e| Error::file_system(rule, target, e))?;
        self.hash_local(rule, target)?
            .ok_or_else(|| Error::FileNotFound {
                path: target.to_path_buf(),
            })
    }

    fn delete_local(&self, rule: &str, path: &Path) -> Result<()> {
        self.system
            .remove_file(path)
            .map_err(|e| Error::file_system(rule, path, e))
    }

    /// Line diff of the source copy against the local copy
    pub fn diff_contents(&self, rule: &str, local_path: &Path) -> Result<Vec<DiffLine>> {
        let source = self.source.read(rule)?;
        let local = self
            .system
            .read_text(local_path)
            .map_err(|e| Error::file_system(rule, local_path, e))?;
        Ok(diff(&source, &local, self.diff_algorithm))
    }

    /// Bring tracked rules up to date with the source
    pub fn pull(
        &self,
        manifest: &mut ProjectManifest,
        options: &PullOptions,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        let names: Vec<String> = if options.rules.is_empty() {
            manifest.rules.keys().cloned().collect()
        } else {
            let index = manifest.index();
            let (found, missing) = index.partition(&options.rules);
            for name in missing {
                tracing::warn!(rule = name, "Rule not found in manifest");
                report.not_found.push(name.to_string());
            }
            found.into_iter().map(str::to_string).collect()
        };

        let single_rule = names.len() == 1;
        for name in &names {
            match self.pull_rule(manifest, name, options, single_rule, decisions) {
                Ok(Step::Done(outcome)) => {
                    tracing::debug!(rule = %name, ?outcome, "Pulled rule");
                    report.push(name, outcome);
                }
                Ok(Step::Cancel) => {
                    tracing::info!(rule = %name, "Pull cancelled");
                    report.cancelled = true;
                    break;
                }
                Err(e @ (Error::FileSystem { .. } | Error::FileNotFound { .. })) => {
                    tracing::warn!(rule = %name, "Failed to pull rule: {e}");
                    report.push(name, RuleOutcome::Failed(e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn pull_rule(
        &self,
        manifest: &mut ProjectManifest,
        name: &str,
        options: &PullOptions,
        single_rule: bool,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<Step> {
        let Some(entry) = manifest.rules.get(name).cloned() else {
            return Ok(Step::Done(RuleOutcome::Skipped));
        };

        if entry.is_detached() && !options.include_detached {
            return Ok(Step::Done(RuleOutcome::Skipped));
        }

        let local_path = self.local_path(&entry);
        let observed = self.observe(name, &entry)?;
        let now = Utc::now();

        let Some(source_hash) = observed.source.clone() else {
            return match decisions.resolve_missing_source(name)? {
                Decision::Chosen(MissingSourceAction::Keep) => {
                    if let Some(e) = manifest.rules.get_mut(name) {
                        e.mark_detached(now);
                    }
                    Ok(Step::Done(RuleOutcome::Detached))
                }
                Decision::Chosen(MissingSourceAction::Remove) => {
                    self.delete_local(name, &local_path)?;
                    manifest.rules.shift_remove(name);
                    Ok(Step::Done(RuleOutcome::Removed))
                }
                Decision::Cancelled => Ok(Step::Done(RuleOutcome::Skipped)),
            };
        };

        let Some(local_hash) = observed.local.clone() else {
            return match decisions.resolve_missing_local(name)? {
                Decision::Chosen(MissingLocalAction::Restore) => {
                    let hash = self.install(name, &local_path)?;
                    if let Some(e) = manifest.rules.get_mut(name) {
                        e.mark_synced(hash, now);
                    }
                    Ok(Step::Done(RuleOutcome::Restored))
                }
                Decision::Chosen(MissingLocalAction::Remove) => {
                    manifest.rules.shift_remove(name);
                    Ok(Step::Done(RuleOutcome::Removed))
                }
                Decision::Cancelled => Ok(Step::Done(RuleOutcome::Skipped)),
            };
        };

        let check = status::check(&entry, &observed);

        if !check.local_changed && !check.source_changed {
            if let Some(e) = manifest.rules.get_mut(name)
                && !e.is_detached()
            {
                e.status = RuleStatus::Synced;
            }
            return Ok(Step::Done(RuleOutcome::UpToDate));
        }

        if !check.local_changed || options.force {
            let hash = self.install(name, &local_path)?;
            if let Some(e) = manifest.rules.get_mut(name) {
                e.mark_synced(hash, now);
            }
            return Ok(Step::Done(RuleOutcome::Updated));
        }

        let ctx = ConflictContext {
            rule: name,
            source_changed: check.source_changed,
            single_rule,
            source_hash: &source_hash,
            local_hash: &local_hash,
        };

        loop {
            match decisions.resolve_conflict(&ctx)? {
                Decision::Chosen(ConflictAction::ViewDiff) => {
                    let lines = self.diff_contents(name, &local_path)?;
                    decisions.show_diff(name, &lines)?;
                }
                Decision::Chosen(ConflictAction::Overwrite) => {
                    let hash = self.install(name, &local_path)?;
                    if let Some(e) = manifest.rules.get_mut(name) {
                        e.mark_synced(hash, now);
                    }
                    return Ok(Step::Done(RuleOutcome::Updated));
                }
                Decision::Chosen(ConflictAction::Detach) => {
                    if let Some(e) = manifest.rules.get_mut(name) {
                        e.mark_detached(now);
                    }
                    return Ok(Step::Done(RuleOutcome::Detached));
                }
                Decision::Chosen(ConflictAction::Cancel) | Decision::Cancelled if single_rule => {
                    return Ok(Step::Cancel);
                }
                Decision::Chosen(ConflictAction::Skip | ConflictAction::Cancel)
                | Decision::Cancelled => {
                    if let Some(e) = manifest.rules.get_mut(name)
                        && !e.is_detached()
                    {
                        e.status = RuleStatus::Diverged;
                    }
                    return Ok(Step::Done(RuleOutcome::Skipped));
                }
            }
        }
    }

    /// Install rules from the source and start tracking them
    ///
    /// Every requested name is validated first; if any is missing nothing is
    /// touched and `RuleNotFound` lists all of them.
    pub fn add(
        &self,
        manifest: &mut ProjectManifest,
        options: &AddOptions,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<SyncReport> {
        let available = self.source.available_rules()?;
        if available.is_empty() {
            return Err(Error::Message(format!(
                "No rules found in source {}",
                self.source.root().display()
            )));
        }

        let names: Vec<String> = if options.all {
            available.into_iter().map(|r| r.name).collect()
        } else {
            self.source.resolve_all(&options.rules)?
        };

        let mut report = SyncReport::default();
        for name in &names {
            match self.add_rule(manifest, name, decisions) {
                Ok(outcome) => {
                    tracing::debug!(rule = %name, ?outcome, "Added rule");
                    report.push(name, outcome);
                }
                Err(e @ (Error::FileSystem { .. } | Error::FileNotFound { .. })) => {
                    tracing::warn!(rule = %name, "Failed to add rule: {e}");
                    report.push(name, RuleOutcome::Failed(e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    fn add_rule(
        &self,
        manifest: &mut ProjectManifest,
        name: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<RuleOutcome> {
        let key = manifest.find(name).unwrap_or_else(|| name.to_string());
        let tracked = manifest.rules.get(&key).cloned();
        let local_path = tracked
            .as_ref()
            .map_or_else(|| self.layout.rule_path(name), |e| self.local_path(e));
        let local_hash = self.hash_local(name, &local_path)?;
        let now = Utc::now();

        // Local content the manifest does not account for
        let unrecorded = match (&tracked, local_hash) {
            (Some(entry), Some(hash)) if hash != entry.local_hash => Some(hash),
            (None, Some(hash)) => Some(hash),
            _ => None,
        };

        if let Some(current_local) = unrecorded {
            let ctx = AddConflictContext {
                rule: name,
                tracked: tracked.is_some(),
            };
            match decisions.resolve_add_conflict(&ctx)? {
                Decision::Chosen(AddConflictAction::Overwrite) => {}
                Decision::Chosen(AddConflictAction::Detach) => {
                    let entry = match tracked {
                        Some(mut entry) => {
                            entry.mark_detached(now);
                            entry
                        }
                        None => {
                            let source_hash = self.source.hash(name)?.ok_or_else(|| {
                                Error::SourceMissing {
                                    rule: name.to_string(),
                                }
                            })?;
                            RuleEntry {
                                file: rule_filename(name),
                                source_hash,
                                local_hash: current_local,
                                status: RuleStatus::Detached,
                                installed_at: now,
                                updated_at: now,
                                detached_at: Some(now),
                            }
                        }
                    };
                    manifest.insert(key, entry);
                    return Ok(RuleOutcome::Detached);
                }
                Decision::Chosen(AddConflictAction::Skip) | Decision::Cancelled => {
                    return Ok(RuleOutcome::Skipped);
                }
            }
        }

        let hash = self.install(name, &local_path)?;
        match tracked {
            Some(mut entry) => {
                entry.mark_synced(hash, now);
                manifest.insert(key, entry);
                Ok(RuleOutcome::Updated)
            }
            None => {
                manifest.insert(key, RuleEntry::synced(name, hash, now));
                Ok(RuleOutcome::Added)
            }
        }
    }

    /// Resume tracking a detached rule
    pub fn attach(
        &self,
        manifest: &mut ProjectManifest,
        name: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<AttachOutcome> {
        let key = tracked_key(manifest, name)?;
        let Some(entry) = manifest.rules.get(&key).cloned() else {
            return Err(not_in_manifest(name));
        };

        if !entry.is_detached() {
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let source_hash = self
            .source
            .hash(&key)?
            .ok_or_else(|| Error::SourceMissing { rule: key.clone() })?;
        let local_path = self.local_path(&entry);
        let local_hash = self
            .hash_local(&key, &local_path)?
            .ok_or_else(|| Error::LocalMissing { rule: key.clone() })?;
        let now = Utc::now();

        if local_hash == source_hash {
            if let Some(e) = manifest.rules.get_mut(&key) {
                e.mark_synced(source_hash, now);
            }
            return Ok(AttachOutcome::Attached);
        }

        match decisions.resolve_attach(&key)? {
            Decision::Chosen(AttachAction::Overwrite) => {
                let hash = self.install(&key, &local_path)?;
                if let Some(e) = manifest.rules.get_mut(&key) {
                    e.mark_synced(hash, now);
                }
                Ok(AttachOutcome::Attached)
            }
            Decision::Chosen(AttachAction::Keep) => {
                if let Some(e) = manifest.rules.get_mut(&key) {
                    // Record the source content as the synced baseline so the
                    // local edits keep classifying as diverged.
                    e.source_hash = source_hash.clone();
                    e.local_hash = source_hash;
                    e.status = RuleStatus::Diverged;
                    e.detached_at = None;
                    e.updated_at = now;
                }
                Ok(AttachOutcome::AttachedDiverged)
            }
            Decision::Cancelled => Ok(AttachOutcome::Cancelled),
        }
    }

    /// Exempt a rule from reconciliation
    pub fn detach(&self, manifest: &mut ProjectManifest, name: &str) -> Result<DetachOutcome> {
        let key = tracked_key(manifest, name)?;
        let Some(entry) = manifest.rules.get_mut(&key) else {
            return Err(not_in_manifest(name));
        };
        if entry.is_detached() {
            return Ok(DetachOutcome::AlreadyDetached);
        }
        entry.mark_detached(Utc::now());
        Ok(DetachOutcome::Detached)
    }

    /// Stop tracking rules, deleting their local copies unless `keep_file`
    pub fn remove(
        &self,
        manifest: &mut ProjectManifest,
        names: &[String],
        keep_file: bool,
    ) -> Result<SyncReport> {
        if names.is_empty() {
            return Err(Error::Message("No rules specified to remove".to_string()));
        }

        let mut report = SyncReport::default();
        for name in names {
            let Some(key) = manifest.find(name) else {
                tracing::warn!(rule = %name, "Rule is not installed");
                report.not_found.push(name.clone());
                continue;
            };
            let Some(entry) = manifest.remove(&key) else {
                continue;
            };
            if !keep_file
                && let Err(e) = self.delete_local(&key, &self.local_path(&entry))
            {
                tracing::warn!(rule = %key, "Failed to delete local file: {e}");
                report.warnings.push(e.to_string());
            }
            report.push(&key, RuleOutcome::Removed);
        }
        Ok(report)
    }

    /// Classify every tracked rule, sorted by name
    pub fn status(&self, manifest: &ProjectManifest) -> Result<Vec<RuleReport>> {
        let mut reports = Vec::new();
        for name in manifest.sorted_names() {
            let Some(entry) = manifest.rules.get(&name) else {
                continue;
            };
            if is_ignored_rule(&entry.file) {
                continue;
            }
            let observed = self.observe(&name, entry)?;
            reports.push(RuleReport {
                check: status::check(entry, &observed),
                entry: entry.clone(),
                name,
            });
        }
        Ok(reports)
    }

    /// Non-detached rules whose local copy differs from the recorded hash
    pub fn diverged_rules(&self, manifest: &ProjectManifest) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for (name, entry) in &manifest.rules {
            if entry.is_detached() {
                continue;
            }
            match self.hash_local(name, &self.local_path(entry))? {
                Some(hash) if hash != entry.local_hash => names.push(name.clone()),
                _ => {}
            }
        }
        Ok(names)
    }

    /// Compare the source and local copies of a tracked rule
    pub fn rule_diff(&self, manifest: &ProjectManifest, name: &str) -> Result<RuleDiff> {
        let key = tracked_key(manifest, name)?;
        let Some(entry) = manifest.rules.get(&key) else {
            return Err(not_in_manifest(name));
        };
        let local_path = self.local_path(entry);
        let source_exists = self.source.exists(&key);
        let local_exists = self.system.exists(&local_path);

        match (source_exists, local_exists) {
            (false, false) => Ok(RuleDiff::BothMissing),
            (false, true) => Ok(RuleDiff::SourceMissing),
            (true, false) => Ok(RuleDiff::LocalMissing),
            (true, true) => {
                let source = self.source.read(&key)?;
                let local = self
                    .system
                    .read_text(&local_path)
                    .map_err(|e| Error::file_system(&key, &local_path, e))?;
                if source == local {
                    Ok(RuleDiff::Identical)
                } else {
                    Ok(RuleDiff::Changes(diff(&source, &local, self.diff_algorithm)))
                }
            }
        }
    }

    /// Path of a tracked rule's local copy
    pub fn local_path_of(&self, manifest: &ProjectManifest, name: &str) -> Option<PathBuf> {
        manifest.get(name).map(|e| self.local_path(e))
    }
}

fn not_in_manifest(name: &str) -> Error {
    Error::RuleNotFound {
        names: vec![name.to_string()],
        scope: "manifest".to_string(),
    }
}

fn tracked_key(manifest: &ProjectManifest, name: &str) -> Result<String> {
    manifest.find(name).ok_or_else(|| not_in_manifest(name))
}
