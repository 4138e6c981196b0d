//! System abstraction for filesystem operations
//!
//! The reconciler touches the disk only through [`System`], so a failure on a
//! single rule can be attributed to that rule and tests can observe what was
//! written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over filesystem operations
///
/// Implementations:
/// - `RealSystem`: Actual filesystem operations
/// - Test doubles that fail on purpose
pub trait System {
    /// Read a file as text for display; invalid UTF-8 is replaced, not rejected
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Copy `from` to `to`, creating parent directories of `to`
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file; a missing file is not an error
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// File names directly inside `dir` with the given extension, sorted
    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<String>>;
}

/// Real filesystem implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    fn ensure_parent(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl System for RealSystem {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        Self::ensure_parent(to)?;
        fs::copy(from, to)?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path: PathBuf = entry.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension));
            if matches && let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("src.md");
        let to = temp.path().join("a").join("b").join("dst.md");
        fs::write(&from, "rule").unwrap();

        RealSystem.copy_file(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "rule");
    }

    #[test]
    fn test_read_text_replaces_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latin1.md");
        fs::write(&path, b"caf\xe9\n").unwrap();

        assert_eq!(RealSystem.read_text(&path).unwrap(), "caf\u{fffd}\n");
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let temp = TempDir::new().unwrap();
        RealSystem.remove_file(&temp.path().join("gone.md")).unwrap();
    }

    #[test]
    fn test_list_files_filters_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.md"), "").unwrap();
        fs::write(temp.path().join("a.MD"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp.path().join("dir.md")).unwrap();

        let names = RealSystem.list_files(temp.path(), "md").unwrap();
        assert_eq!(names, vec!["a.MD".to_string(), "b.md".to_string()]);
    }

    #[test]
    fn test_list_files_missing_dir_errors() {
        let temp = TempDir::new().unwrap();
        assert!(RealSystem.list_files(&temp.path().join("nope"), "md").is_err());
    }
}
