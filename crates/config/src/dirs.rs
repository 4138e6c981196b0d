//! XDG directory utilities
//!
//! This module provides XDG-compliant directory paths for rulekeeper.
//! It follows the XDG Base Directory layout using the `xdg` crate:
//! - `XDG_CONFIG_HOME` defaults to ~/.config

use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

/// Get the rulekeeper config directory
///
/// Returns `$XDG_CONFIG_HOME/rulekeeper` or `~/.config/rulekeeper`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    // xdg 3.0: with_prefix returns BaseDirectories, get_*_home returns Option<PathBuf>
    BaseDirectories::with_prefix("rulekeeper").get_config_home()
}

/// Get the default global config file path
///
/// Returns `$XDG_CONFIG_HOME/rulekeeper/config.toml`
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Default location for cloning a git source named `repo_name`
///
/// Returns `~/Documents/<repo_name>`, falling back to the home directory when
/// the platform has no documents folder.
#[must_use]
pub fn default_clone_dir(repo_name: &str) -> Option<PathBuf> {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        .map(|d| d.join(repo_name))
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Replace the home directory prefix with `~` for display
pub fn contract_tilde(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_default_config_file_ends_with_config_toml() {
        let Some(path) = default_config_file() else {
            return;
        };
        assert!(
            path.to_string_lossy().ends_with("config.toml"),
            "config file should end with 'config.toml': {path:?}"
        );
        assert!(path.to_string_lossy().contains("rulekeeper"));
    }

    #[test]
    fn test_default_config_file_is_child_of_config_dir() {
        if let (Some(dir), Some(file)) = (config_dir(), default_config_file()) {
            assert!(file.starts_with(&dir));
        }
    }

    #[test]
    fn test_default_clone_dir_uses_repo_name() {
        if let Some(path) = default_clone_dir("team-rules") {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("team-rules"));
        }
    }

    #[test]
    fn test_expand_tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde(Path::new("~/rules")), home.join("rules"));
        assert_eq!(expand_tilde(Path::new("/abs/rules")), PathBuf::from("/abs/rules"));
        assert_eq!(expand_tilde(Path::new("rel")), PathBuf::from("rel"));
    }

    #[test]
    fn test_contract_tilde_roundtrip() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(contract_tilde(&home.join("rules")), "~/rules");
        assert_eq!(contract_tilde(&home), "~");
        assert_eq!(contract_tilde(Path::new("/opt/rules")), "/opt/rules");
    }
}
