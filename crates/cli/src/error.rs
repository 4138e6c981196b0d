//! Error types for CLI commands
//!
//! Engine and config failures arrive as [`rulekeeper_core::Error`]; command
//! level problems (bad arguments, refused prompts) get their own variants.

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Failure reported by the engine or config layer
    #[error(transparent)]
    Core(#[from] rulekeeper_core::Error),

    /// Invalid combination of arguments
    #[error("{0}")]
    Usage(String),

    /// Reading an answer from the terminal failed
    #[error("Failed to read user input: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error with context
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Create a `Usage` error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

impl From<CommandError> for rulekeeper_core::Error {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => inner,
            CommandError::IoError(io) => Self::Io(io),
            other => Self::Message(other.to_string()),
        }
    }
}
