//! Conflict decisions
//!
//! Whenever the reconciler cannot pick an action on its own it asks a
//! [`DecisionProvider`]. The CLI answers with terminal prompts; tests answer
//! from a script.

use crate::diff::DiffLine;
use crate::hash::ContentHash;
use rulekeeper_core::Result;

/// Answer to a decision point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<T> {
    /// The operator picked an option
    Chosen(T),
    /// The operator backed out
    Cancelled,
}

/// Local edits conflict with the source during `pull`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// Replace the local copy with the source
    Overwrite,
    /// Keep local edits and stop tracking the source
    Detach,
    /// Show the differences, then ask again
    ViewDiff,
    /// Leave this rule alone
    Skip,
    /// Stop processing
    Cancel,
}

/// The source copy of a tracked rule is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSourceAction {
    /// Keep the local copy as a detached rule
    Keep,
    /// Delete the local copy and forget the rule
    Remove,
}

/// The project copy of a tracked rule is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLocalAction {
    /// Copy it back from the source
    Restore,
    /// Forget the rule
    Remove,
}

/// Local file differs from the source when re-attaching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachAction {
    /// Replace the local copy with the source
    Overwrite,
    /// Keep local edits and attach as diverged
    Keep,
}

/// An untracked or modified local file is in the way during `add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddConflictAction {
    /// Replace the local copy with the source
    Overwrite,
    /// Keep the local content and track it as detached
    Detach,
    /// Leave this rule alone
    Skip,
}

/// What the provider knows about a pull conflict
#[derive(Debug, Clone)]
pub struct ConflictContext<'a> {
    /// Rule name as tracked
    pub rule: &'a str,
    /// Source changed since last sync too
    pub source_changed: bool,
    /// Exactly one rule was requested, so `Cancel` stops the command
    pub single_rule: bool,
    /// Current source hash
    pub source_hash: &'a ContentHash,
    /// Current local hash
    pub local_hash: &'a ContentHash,
}

/// Context for an `add` conflict
#[derive(Debug, Clone)]
pub struct AddConflictContext<'a> {
    /// Rule name
    pub rule: &'a str,
    /// The file is already tracked by the manifest
    pub tracked: bool,
}

/// Supplies answers at decision points
pub trait DecisionProvider {
    /// Local edits conflict with the source
    fn resolve_conflict(&mut self, ctx: &ConflictContext<'_>) -> Result<Decision<ConflictAction>>;

    /// Source copy is gone
    fn resolve_missing_source(&mut self, rule: &str) -> Result<Decision<MissingSourceAction>>;

    /// Project copy is gone
    fn resolve_missing_local(&mut self, rule: &str) -> Result<Decision<MissingLocalAction>>;

    /// Local differs from source on attach
    fn resolve_attach(&mut self, rule: &str) -> Result<Decision<AttachAction>>;

    /// A local file is in the way on add
    fn resolve_add_conflict(&mut self, ctx: &AddConflictContext<'_>) -> Result<Decision<AddConflictAction>>;

    /// Show a diff for a rule before asking again
    fn show_diff(&mut self, rule: &str, lines: &[DiffLine]) -> Result<()>;
}

/// Provider used when nobody can answer: every decision is cancelled
///
/// Cancellation degrades to skip in batches, so nothing destructive happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl DecisionProvider for Unattended {
    fn resolve_conflict(&mut self, ctx: &ConflictContext<'_>) -> Result<Decision<ConflictAction>> {
        tracing::warn!(rule = ctx.rule, "Conflict left unresolved (no terminal)");
        Ok(Decision::Cancelled)
    }

    fn resolve_missing_source(&mut self, rule: &str) -> Result<Decision<MissingSourceAction>> {
        tracing::warn!(rule, "Source file missing; left unchanged (no terminal)");
        Ok(Decision::Cancelled)
    }

    fn resolve_missing_local(&mut self, rule: &str) -> Result<Decision<MissingLocalAction>> {
        tracing::warn!(rule, "Local file missing; left unchanged (no terminal)");
        Ok(Decision::Cancelled)
    }

    fn resolve_attach(&mut self, rule: &str) -> Result<Decision<AttachAction>> {
        tracing::warn!(rule, "Attach needs a decision (no terminal)");
        Ok(Decision::Cancelled)
    }

    fn resolve_add_conflict(&mut self, ctx: &AddConflictContext<'_>) -> Result<Decision<AddConflictAction>> {
        tracing::warn!(rule = ctx.rule, "Existing local file kept (no terminal)");
        Ok(Decision::Cancelled)
    }

    fn show_diff(&mut self, _rule: &str, _lines: &[DiffLine]) -> Result<()> {
        Ok(())
    }
}

/// Provider that replays a fixed list of answers
///
/// Each decision point has its own queue; an exhausted queue answers
/// `Cancelled`. Useful for tests and for scripting.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDecisions {
    /// Answers for pull conflicts
    pub conflicts: Vec<Decision<ConflictAction>>,
    /// Answers for missing source files
    pub missing_source: Vec<Decision<MissingSourceAction>>,
    /// Answers for missing local files
    pub missing_local: Vec<Decision<MissingLocalAction>>,
    /// Answers for attach
    pub attach: Vec<Decision<AttachAction>>,
    /// Answers for add conflicts
    pub add_conflicts: Vec<Decision<AddConflictAction>>,
    /// Rules whose diff was shown
    pub diffs_shown: Vec<String>,
    /// Contexts the conflict prompt was asked with: (rule, source_changed, single_rule)
    pub conflicts_asked: Vec<(String, bool, bool)>,
}

fn next<T: Copy>(queue: &mut Vec<Decision<T>>) -> Decision<T> {
    if queue.is_empty() {
        Decision::Cancelled
    } else {
        queue.remove(0)
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn resolve_conflict(&mut self, ctx: &ConflictContext<'_>) -> Result<Decision<ConflictAction>> {
        self.conflicts_asked
            .push((ctx.rule.to_string(), ctx.source_changed, ctx.single_rule));
        Ok(next(&mut self.conflicts))
    }

    fn resolve_missing_source(&mut self, _rule: &str) -> Result<Decision<MissingSourceAction>> {
        Ok(next(&mut self.missing_source))
    }

    fn resolve_missing_local(&mut self, _rule: &str) -> Result<Decision<MissingLocalAction>> {
        Ok(next(&mut self.missing_local))
    }

    fn resolve_attach(&mut self, _rule: &str) -> Result<Decision<AttachAction>> {
        Ok(next(&mut self.attach))
    }

    fn resolve_add_conflict(&mut self, _ctx: &AddConflictContext<'_>) -> Result<Decision<AddConflictAction>> {
        Ok(next(&mut self.add_conflicts))
    }

    fn show_diff(&mut self, rule: &str, _lines: &[DiffLine]) -> Result<()> {
        self.diffs_shown.push(rule.to_string());
        Ok(())
    }
}
