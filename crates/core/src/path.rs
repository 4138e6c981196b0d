//! Project layout
//!
//! A project keeps its rule working copies under `.claude/` and its tracking
//! state under `.rulekeeper/`:
//!
//! ```text
//! <project>/
//! ├── .claude/
//! │   └── laravel.md
//! └── .rulekeeper/
//!     └── manifest.toml
//! ```
//!
//! # Examples
//!
//! ```
//! use rulekeeper_core::path::ProjectLayout;
//! use std::path::Path;
//!
//! let layout = ProjectLayout::new("/work/app");
//! assert_eq!(layout.rule_path("laravel"), Path::new("/work/app/.claude/laravel.md"));
//! ```

use std::path::{Path, PathBuf};

/// Directory (relative to the project root) holding rule working copies
pub const RULES_DIR: &str = ".claude";

/// Directory (relative to the project root) holding rulekeeper state
pub const STATE_DIR: &str = ".rulekeeper";

/// Manifest file name inside [`STATE_DIR`]
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Extension every rule file carries
pub const RULE_EXTENSION: &str = "md";

/// Filesystem locations of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the rule working copies
    pub fn rules_dir(&self) -> PathBuf {
        self.root.join(RULES_DIR)
    }

    /// Directory holding the manifest
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Path of the project manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir().join(MANIFEST_FILE)
    }

    /// Path of the working copy for `name` (with or without `.md`)
    pub fn rule_path(&self, name: &str) -> PathBuf {
        self.rules_dir().join(rule_file_name(name))
    }
}

/// File name for a rule, appending `.md` unless already present
pub fn rule_file_name(name: &str) -> String {
    let suffix = format!(".{RULE_EXTENSION}");
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/p");
        assert_eq!(layout.rules_dir(), PathBuf::from("/p/.claude"));
        assert_eq!(layout.manifest_path(), PathBuf::from("/p/.rulekeeper/manifest.toml"));
        assert_eq!(layout.rule_path("vue.md"), PathBuf::from("/p/.claude/vue.md"));
    }

    #[test]
    fn test_rule_file_name() {
        assert_eq!(rule_file_name("laravel"), "laravel.md");
        assert_eq!(rule_file_name("laravel.md"), "laravel.md");
        assert_eq!(rule_file_name("Laravel.MD"), "Laravel.MD");
    }
}
