//! Rule status classification
//!
//! Classification compares the hashes recorded at the last sync with what is
//! on disk now. It is pure: the same inputs always give the same status.
//! Precedence, first match wins:
//!
//! 1. recorded status `detached` → `detached`
//! 2. local or source file missing → `diverged`
//! 3. local changed → `diverged` (even when the source changed too)
//! 4. source changed → `outdated`
//! 5. otherwise → `synced`

use crate::hash::{ContentHash, hash_rule_file};
use crate::manifest::{RuleEntry, RuleStatus};
use rulekeeper_core::Result;
use std::path::Path;

/// Current on-disk state of one rule
///
/// `None` means the file does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observed {
    /// Hash of the project copy
    pub local: Option<ContentHash>,
    /// Hash of the source copy
    pub source: Option<ContentHash>,
}

impl Observed {
    /// Hash both copies of `rule`; read failures become `FileSystem` errors
    pub fn from_disk(rule: &str, local_path: &Path, source_path: &Path) -> Result<Self> {
        Ok(Self {
            local: hash_rule_file(rule, local_path)?,
            source: hash_rule_file(rule, source_path)?,
        })
    }

    /// Whether the project copy exists
    pub fn local_exists(&self) -> bool {
        self.local.is_some()
    }

    /// Whether the source copy exists
    pub fn source_exists(&self) -> bool {
        self.source.is_some()
    }
}

/// Detailed classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    /// Derived status
    pub status: RuleStatus,
    /// Local hash differs from the recorded one
    pub local_changed: bool,
    /// Source hash differs from the recorded one
    pub source_changed: bool,
    /// Project copy exists
    pub local_exists: bool,
    /// Source copy exists
    pub source_exists: bool,
}

impl StatusCheck {
    /// Short explanations for the operator, most specific first
    pub fn details(&self) -> Vec<&'static str> {
        let mut details = Vec::new();
        if self.status == RuleStatus::Detached {
            return details;
        }
        if !self.local_exists {
            details.push("local file missing");
        }
        if !self.source_exists {
            details.push("source file missing");
        }
        if self.local_exists && self.local_changed {
            details.push("local changes detected");
        }
        if self.source_exists && self.source_changed {
            details.push("source updated");
        }
        details
    }

    /// Whether the rule needs the operator's attention
    pub fn needs_attention(&self) -> bool {
        matches!(self.status, RuleStatus::Outdated | RuleStatus::Diverged)
    }
}

/// Classify a tracked rule against its observed state
pub fn classify(entry: &RuleEntry, observed: &Observed) -> RuleStatus {
    check(entry, observed).status
}

/// Classify and report which sides changed
pub fn check(entry: &RuleEntry, observed: &Observed) -> StatusCheck {
    let local_changed = observed.local.as_ref() != Some(&entry.local_hash);
    let source_changed = observed.source.as_ref() != Some(&entry.source_hash);
    let local_exists = observed.local_exists();
    let source_exists = observed.source_exists();

    let status = if entry.is_detached() {
        RuleStatus::Detached
    } else if !local_exists || !source_exists || local_changed {
        RuleStatus::Diverged
    } else if source_changed {
        RuleStatus::Outdated
    } else {
        RuleStatus::Synced
    };

    StatusCheck {
        status,
        local_changed,
        source_changed,
        local_exists,
        source_exists,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::hash::hash_content;
    use chrono::Utc;

    fn h(s: &str) -> ContentHash {
        hash_content(s.as_bytes())
    }

    fn entry_with(source: &str, local: &str) -> RuleEntry {
        let mut entry = RuleEntry::synced("laravel", h(source), Utc::now());
        entry.local_hash = h(local);
        entry
    }

    fn observed(local: Option<&str>, source: Option<&str>) -> Observed {
        Observed {
            local: local.map(h),
            source: source.map(h),
        }
    }

    #[test]
    fn test_synced() {
        let entry = entry_with("a", "a");
        assert_eq!(classify(&entry, &observed(Some("a"), Some("a"))), RuleStatus::Synced);
    }

    #[test]
    fn test_outdated_when_only_source_changed() {
        let entry = entry_with("a", "a");
        let result = check(&entry, &observed(Some("a"), Some("b")));
        assert_eq!(result.status, RuleStatus::Outdated);
        assert_eq!(result.details(), vec!["source updated"]);
    }

    #[test]
    fn test_local_change_wins_over_source_change() {
        let entry = entry_with("a", "a");
        let result = check(&entry, &observed(Some("c"), Some("b")));
        assert_eq!(result.status, RuleStatus::Diverged);
        assert!(result.local_changed && result.source_changed);
        assert_eq!(result.details(), vec!["local changes detected", "source updated"]);
    }

    #[test]
    fn test_missing_files_diverge() {
        let entry = entry_with("a", "a");
        let local_missing = check(&entry, &observed(None, Some("a")));
        assert_eq!(local_missing.status, RuleStatus::Diverged);
        assert_eq!(local_missing.details(), vec!["local file missing"]);

        let source_missing = check(&entry, &observed(Some("a"), None));
        assert_eq!(source_missing.status, RuleStatus::Diverged);
        assert_eq!(source_missing.details(), vec!["source file missing"]);
    }

    #[test]
    fn test_detached_is_frozen() {
        let mut entry = entry_with("a", "a");
        entry.mark_detached(Utc::now());
        for obs in [
            observed(Some("a"), Some("a")),
            observed(Some("a"), Some("changed upstream")),
            observed(None, None),
        ] {
            let result = check(&entry, &obs);
            assert_eq!(result.status, RuleStatus::Detached);
            assert!(result.details().is_empty());
            assert!(!result.needs_attention());
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let entry = entry_with("a", "b");
        let obs = observed(Some("b"), Some("c"));
        let first = classify(&entry, &obs);
        for _ in 0..5 {
            assert_eq!(classify(&entry, &obs), first);
        }
    }

    #[test]
    fn from_disk_reports_missing_files_as_none() {
        let temp = tempfile::TempDir::new().unwrap();
        let local = temp.path().join("laravel.md");
        let source = temp.path().join("source.md");
        std::fs::write(&source, "A").unwrap();

        let observed = Observed::from_disk("laravel", &local, &source).unwrap();
        assert!(!observed.local_exists());
        assert_eq!(observed.source, Some(h("A")));
    }
}
