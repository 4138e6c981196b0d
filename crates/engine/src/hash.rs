//! Content hashing using SHA-256
//!
//! Hashes are stored in manifests as `sha256:<hex>` so the algorithm can be
//! told apart if it ever changes.

use rulekeeper_core::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Algorithm tag prepended to every hash
pub const HASH_PREFIX: &str = "sha256:";

/// Tagged content hash
///
/// Equality is exact string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    fn from_digest(digest: &[u8]) -> Self {
        Self(format!("{HASH_PREFIX}{}", hex::encode(digest)))
    }

    /// The full tagged string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` hex digits, for display
    pub fn short(&self, len: usize) -> &str {
        let hex = self.0.strip_prefix(HASH_PREFIX).unwrap_or(&self.0);
        &hex[..len.min(hex.len())]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Hash in-memory content
///
/// # Examples
///
/// ```
/// use rulekeeper_engine::hash::hash_content;
///
/// let hash = hash_content(b"# Laravel\n");
/// assert!(hash.as_str().starts_with("sha256:"));
/// ```
#[must_use]
pub fn hash_content(content: &[u8]) -> ContentHash {
    ContentHash::from_digest(&Sha256::digest(content))
}

/// Hash a file with buffered reading
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, or an I/O error if it
/// cannot be read.
pub fn hash_file(path: &Path) -> Result<ContentHash> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(ContentHash::from_digest(&hasher.finalize()))
}

/// Hash a file if it exists
pub fn hash_file_if_exists(path: &Path) -> Result<Option<ContentHash>> {
    match hash_file(path) {
        Ok(hash) => Ok(Some(hash)),
        Err(Error::FileNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Like [`hash_file_if_exists`], with I/O failures reported against `rule`
pub fn hash_rule_file(rule: &str, path: &Path) -> Result<Option<ContentHash>> {
    hash_file_if_exists(path).map_err(|e| match e {
        Error::Io(io) => Error::file_system(rule, path, io),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_content_known_value() {
        assert_eq!(
            hash_content(b"").as_str(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_content_is_deterministic() {
        assert_eq!(hash_content(b"rules"), hash_content(b"rules"));
        assert_ne!(hash_content(b"rules"), hash_content(b"rules\n"));
    }

    #[test]
    fn test_hash_file_matches_content_hash() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vue.md");
        let content = "line\n".repeat(20_000);
        fs::write(&path, &content).unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_content(content.as_bytes()));
    }

    #[test]
    fn test_hash_file_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.md");
        assert!(matches!(
            hash_file(&path),
            Err(Error::FileNotFound { .. })
        ));
        assert_eq!(hash_file_if_exists(&path).unwrap(), None);
    }

    #[test]
    fn test_short_hash() {
        let hash = hash_content(b"");
        assert_eq!(hash.short(8), "e3b0c442");
    }
}
