//! # RuleKeeper Engine
//!
//! Reconciliation engine for rulekeeper.
//!
//! This crate decides, for every tracked rule, whether the project copy is in
//! sync with the shared source and what to do when it is not:
//!
//! - **Hashing**: SHA-256 content hashes recorded in the manifest
//! - **Status**: Pure classification of a rule from recorded and current hashes
//! - **Resolver**: Case-insensitive rule name matching
//! - **Manifest**: Per-project tracking table and its persistence
//! - **Source**: Access to the rule source and the automatic refresh step
//! - **Decisions**: Injected conflict resolution
//! - **Reconcile**: add, pull, attach, detach and remove
//! - **Diff**: Line diffs for display
//! - **System Abstraction**: Filesystem operations abstracted for testing

pub mod decision;
pub mod diff;
pub mod hash;
pub mod manifest;
pub mod reconcile;
pub mod resolver;
pub mod source;
pub mod status;
pub mod system;

// Re-export error types from core
pub use rulekeeper_core::{Error, ProjectLayout, Result};

// Re-export commonly used types
pub use decision::{Decision, DecisionProvider, ScriptedDecisions, Unattended};
pub use hash::ContentHash;
pub use manifest::{ManifestStore, ProjectManifest, RuleEntry, RuleStatus};
pub use reconcile::{AddOptions, PullOptions, Reconciler, RuleOutcome, SyncReport};
pub use source::{LocalSource, RefreshOutcome, SourceGateway};
