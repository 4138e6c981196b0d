//! Project manifest
//!
//! The manifest records every rule a project tracks along with the hashes
//! observed at the last sync. It is stored at `.rulekeeper/manifest.toml`:
//!
//! ```toml
//! version = 1
//!
//! [rules.laravel]
//! file = "laravel.md"
//! sourceHash = "sha256:…"
//! localHash = "sha256:…"
//! status = "synced"
//! installedAt = "2026-01-10T08:00:00Z"
//! updatedAt = "2026-01-10T08:00:00Z"
//! ```
//!
//! Keys keep the spelling they were first tracked with; case-insensitive
//! lookup goes through [`crate::resolver::RuleIndex`].

use crate::hash::ContentHash;
use crate::resolver::{RuleIndex, rule_filename};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rulekeeper_core::{Error, ProjectLayout, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Current manifest schema version
pub const MANIFEST_VERSION: u32 = 1;

/// Synchronization state of a tracked rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// Local and source match what was recorded
    Synced,
    /// Source changed, local did not
    Outdated,
    /// Local changed, or a file is missing
    Diverged,
    /// Intentionally excluded from reconciliation
    Detached,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Synced => "synced",
            Self::Outdated => "outdated",
            Self::Diverged => "diverged",
            Self::Detached => "detached",
        })
    }
}

/// One tracked rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    /// File name inside `.claude/`
    pub file: String,
    /// Source hash at last sync
    pub source_hash: ContentHash,
    /// Local hash at last sync
    pub local_hash: ContentHash,
    /// Last classification
    pub status: RuleStatus,
    /// When the rule was first installed
    pub installed_at: DateTime<Utc>,
    /// When the entry last changed
    pub updated_at: DateTime<Utc>,
    /// When the rule was detached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detached_at: Option<DateTime<Utc>>,
}

impl RuleEntry {
    /// Entry for a freshly copied rule: both hashes equal, status synced
    pub fn synced(name: &str, hash: ContentHash, now: DateTime<Utc>) -> Self {
        Self {
            file: rule_filename(name),
            source_hash: hash.clone(),
            local_hash: hash,
            status: RuleStatus::Synced,
            installed_at: now,
            updated_at: now,
            detached_at: None,
        }
    }

    /// Whether the rule is detached
    pub fn is_detached(&self) -> bool {
        self.status == RuleStatus::Detached
    }

    /// Record a sync to `hash` on both sides
    pub fn mark_synced(&mut self, hash: ContentHash, now: DateTime<Utc>) {
        self.source_hash = hash.clone();
        self.local_hash = hash;
        self.status = RuleStatus::Synced;
        self.detached_at = None;
        self.updated_at = now;
    }

    /// Detach without touching recorded hashes
    pub fn mark_detached(&mut self, now: DateTime<Utc>) {
        self.status = RuleStatus::Detached;
        self.detached_at = Some(now);
        self.updated_at = now;
    }
}

/// Per-project rule tracking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Tracked rules keyed by name
    #[serde(default)]
    pub rules: IndexMap<String, RuleEntry>,
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

impl Default for ProjectManifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            rules: IndexMap::new(),
        }
    }
}

impl ProjectManifest {
    /// Case-insensitive index over the tracked names
    pub fn index(&self) -> RuleIndex<'_> {
        RuleIndex::new(self.rules.keys())
    }

    /// Exact key for `requested`, if tracked
    pub fn find(&self, requested: &str) -> Option<String> {
        self.index().get(requested).map(str::to_string)
    }

    /// Entry for `requested` (case-insensitive)
    pub fn get(&self, requested: &str) -> Option<&RuleEntry> {
        let key = self.find(requested)?;
        self.rules.get(&key)
    }

    /// Mutable entry for `requested` (case-insensitive)
    pub fn get_mut(&mut self, requested: &str) -> Option<&mut RuleEntry> {
        let key = self.find(requested)?;
        self.rules.get_mut(&key)
    }

    /// Insert or replace an entry under its exact key
    pub fn insert(&mut self, name: impl Into<String>, entry: RuleEntry) {
        self.rules.insert(name.into(), entry);
    }

    /// Remove `requested`, preserving the order of the remaining entries
    pub fn remove(&mut self, requested: &str) -> Option<RuleEntry> {
        let key = self.find(requested)?;
        self.rules.shift_remove(&key)
    }

    /// Tracked names in lexical order
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.keys().cloned().collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    /// Number of tracked rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are tracked
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Loads and persists a project's manifest
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Store for the project described by `layout`
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            path: layout.manifest_path(),
        }
    }

    /// Path of the manifest file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Whether the manifest file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the manifest, `None` if the project has none yet
    pub fn load(&self) -> Result<Option<ProjectManifest>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let manifest = toml::from_str(&content).map_err(|e| {
            Error::Serialization(format!(
                "Failed to parse manifest {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(manifest))
    }

    /// Load the manifest, failing with `ManifestMissing` if absent
    pub fn load_required(&self) -> Result<ProjectManifest> {
        self.load()?.ok_or_else(|| Error::ManifestMissing {
            path: self.path.clone(),
        })
    }

    /// Load the manifest or start an empty one
    pub fn load_or_default(&self) -> Result<ProjectManifest> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Persist the manifest, creating `.rulekeeper/` if needed
    pub fn save(&self, manifest: &ProjectManifest) -> Result<()> {
        let content = toml::to_string_pretty(manifest)
            .map_err(|e| Error::Serialization(format!("Failed to serialize manifest: {e}")))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), rules = manifest.len(), "Saved manifest");
        Ok(())
    }
}
