//! Core types and utilities for rulekeeper
//!
//! This is the foundation crate (Layer 0) that all other rulekeeper crates depend on.
//! It provides:
//! - Base error types shared by the engine and the CLI
//! - Project layout paths (`.claude/` working copies, `.rulekeeper/` state)
//! - Platform and Windows shell detection
//!
//! This crate has no dependencies on other rulekeeper crates.

pub mod error;
pub mod path;
pub mod platform;

pub use error::{Error, Result};
pub use path::ProjectLayout;
