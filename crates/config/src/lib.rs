//! Configuration management for rulekeeper
//!
//! This crate handles:
//! - Global configuration loading and saving
//! - The automatic refresh gate
//! - XDG directory management
//! - Git integration
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod git;
pub mod logging;

// Re-export error types from core
pub use rulekeeper_core::{Error, Result};

// Re-export main types
pub use config::{GlobalConfig, PlatformConfig, PullFrequency, SettingsConfig, SourceConfig, SourceType};
pub use dirs::{config_dir, default_config_file};
pub use git::{Git2Provider, GitProvider};
