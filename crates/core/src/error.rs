//! Base error types for rulekeeper
//!
//! Every layer reports failures through this enum so the CLI can decide which
//! ones abort a command and which ones only skip a single rule.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No global configuration has been written yet
    #[error("RuleKeeper is not configured: {} does not exist (run `rulekeeper init`)", path.display())]
    ConfigMissing { path: PathBuf },

    /// The configuration file exists but cannot be used
    #[error("Invalid configuration in {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// The project has no manifest yet
    #[error("No rules installed in this project: {} does not exist (run `rulekeeper add`)", path.display())]
    ManifestMissing { path: PathBuf },

    /// One or more requested rule names did not resolve
    #[error("Rule(s) not found in {scope}: {}", names.join(", "))]
    RuleNotFound { names: Vec<String>, scope: String },

    /// Refreshing the source failed
    #[error("Could not refresh source: {0}")]
    SourceUnreachable(String),

    /// A copy, delete or read failed for a specific rule
    #[error("File operation failed for rule '{rule}' at {}: {source}", path.display())]
    FileSystem {
        rule: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file that was expected to exist is absent
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The source copy of a rule is absent
    #[error("Source file for rule '{rule}' no longer exists")]
    SourceMissing { rule: String },

    /// The project copy of a rule is absent
    #[error("Local file for rule '{rule}' does not exist")]
    LocalMissing { rule: String },

    /// The operator cancelled at a prompt
    #[error("Operation cancelled")]
    UserCancelled,

    /// Git operation failure
    #[error("Git error: {0}")]
    Git(String),

    /// Config or manifest (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Wrap an I/O failure that happened while handling `rule`.
    pub fn file_system(rule: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            rule: rule.into(),
            path: path.into(),
            source,
        }
    }

    /// Whether this error should stop the whole command rather than one rule.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing { .. }
                | Self::InvalidConfig { .. }
                | Self::ManifestMissing { .. }
                | Self::RuleNotFound { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_not_found_lists_all_names() {
        let err = Error::RuleNotFound {
            names: vec!["laravel".into(), "vue".into()],
            scope: "source".into(),
        };
        assert_eq!(err.to_string(), "Rule(s) not found in source: laravel, vue");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_file_system_error_is_not_fatal() {
        let err = Error::file_system(
            "laravel",
            "/tmp/laravel.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("laravel"));
    }
}
