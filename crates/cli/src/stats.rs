//! Per-rule result lines and summaries for sync reports

use owo_colors::OwoColorize;
use rulekeeper_engine::resolver::rule_filename;
use rulekeeper_engine::{RuleOutcome, SyncReport};

use crate::ui;

/// Counters derived from a [`SyncReport`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    /// Newly installed
    pub added: usize,
    /// Rewritten from a newer source
    pub updated: usize,
    /// Local copy was missing and got rewritten
    pub restored: usize,
    /// Nothing to do
    pub up_to_date: usize,
    /// Left alone after a prompt
    pub skipped: usize,
    /// Stopped tracking, local kept
    pub detached: usize,
    /// Dropped from the manifest
    pub removed: usize,
    /// Filesystem errors
    pub failed: usize,
}

impl SyncStats {
    /// Tally every outcome in `report`
    pub fn from_report(report: &SyncReport) -> Self {
        let mut stats = Self::default();
        for (_, outcome) in &report.outcomes {
            match outcome {
                RuleOutcome::Added => stats.added += 1,
                RuleOutcome::Updated => stats.updated += 1,
                RuleOutcome::Restored => stats.restored += 1,
                RuleOutcome::UpToDate => stats.up_to_date += 1,
                RuleOutcome::Skipped => stats.skipped += 1,
                RuleOutcome::Detached => stats.detached += 1,
                RuleOutcome::Removed => stats.removed += 1,
                RuleOutcome::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }

    /// Rules whose local copy was rewritten from the source
    pub fn refreshed(&self) -> usize {
        self.updated + self.restored
    }

    /// Summary lines for `pull`
    pub fn pull_summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.refreshed() > 0 {
            lines.push(format!("{} updated.", ui::plural(self.refreshed(), "rule")));
        }
        if self.detached > 0 {
            lines.push(format!("{} detached.", ui::plural(self.detached, "rule")));
        }
        if self.removed > 0 {
            lines.push(format!("{} removed.", ui::plural(self.removed, "rule")));
        }
        if self.skipped > 0 {
            lines.push(format!("{} skipped.", ui::plural(self.skipped, "rule")));
        }
        if self.failed > 0 {
            lines.push(format!("{} failed.", ui::plural(self.failed, "rule")));
        }
        if lines.is_empty() {
            lines.push("All rules are up to date.".to_string());
        }
        lines
    }
}

/// Print one line per rule that changed or needs a mention
pub fn print_outcomes(report: &SyncReport) {
    for (name, outcome) in &report.outcomes {
        let file = rule_filename(name);
        match outcome {
            RuleOutcome::Added => ui::success(&format!("Added {file}")),
            RuleOutcome::Updated => ui::success(&format!("Updated {file}")),
            RuleOutcome::Restored => ui::success(&format!("Restored {file}")),
            RuleOutcome::Detached => println!("  {} {file} detached", "○".dimmed()),
            RuleOutcome::Removed => ui::success(&format!("Removed {file}")),
            RuleOutcome::Skipped => println!("  {}", format!("Skipped {file}").dimmed()),
            RuleOutcome::Failed(reason) => ui::error(&format!("Failed {file}: {reason}")),
            RuleOutcome::UpToDate => {}
        }
    }
    for name in &report.not_found {
        ui::warn(&format!("Rule '{name}' is not installed."));
    }
    for warning in &report.warnings {
        ui::warn(warning);
    }
}
