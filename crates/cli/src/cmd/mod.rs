//! CLI command implementations
//!
//! This module contains all command implementations for the rulekeeper CLI.

pub mod add;
pub mod attach;
pub mod detach;
pub mod diff;
pub mod doctor;
pub mod init;
pub mod list;
pub mod pull;
pub mod remove;
pub mod source;
pub mod status;
