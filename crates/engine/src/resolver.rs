//! Rule name resolution
//!
//! Operators type rule names loosely (`Laravel`, `laravel.md`); manifests and
//! sources keep the exact spelling they were created with. Matching is done on
//! a normalized form: trailing `.md` stripped, lowercased.

use std::collections::HashMap;

/// Files in a source directory that are never treated as rules
pub const IGNORED_FILES: &[&str] = &["readme.md"];

/// Normalize a rule name for comparison
///
/// # Examples
///
/// ```
/// use rulekeeper_engine::resolver::normalize_rule_name;
///
/// assert_eq!(normalize_rule_name("Laravel.MD"), "laravel");
/// ```
pub fn normalize_rule_name(name: &str) -> String {
    rule_name(name).to_lowercase()
}

/// Strip a trailing `.md` (any case) from a file name
pub fn rule_name(file_name: &str) -> &str {
    let len = file_name.len();
    if len >= 3 && file_name.is_char_boundary(len - 3) && file_name[len - 3..].eq_ignore_ascii_case(".md") {
        &file_name[..len - 3]
    } else {
        file_name
    }
}

/// File name for a rule
pub use rulekeeper_core::path::rule_file_name as rule_filename;

/// Whether a source file should be hidden from the available rule list
pub fn is_ignored_rule(file_name: &str) -> bool {
    IGNORED_FILES
        .iter()
        .any(|ignored| ignored.eq_ignore_ascii_case(file_name))
}

/// Resolve `requested` against `available`, returning the first match
pub fn resolve<'a, I, S>(requested: &str, available: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let wanted = normalize_rule_name(requested);
    available
        .into_iter()
        .map(AsRef::as_ref)
        .find(|name| normalize_rule_name(name) == wanted)
}

/// Case-insensitive index over a set of exact names
///
/// Built on demand; the first name for each normalized key wins.
#[derive(Debug, Default)]
pub struct RuleIndex<'a> {
    by_normalized: HashMap<String, &'a str>,
}

impl<'a> RuleIndex<'a> {
    /// Build an index over `names`
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        let mut by_normalized = HashMap::new();
        for name in names {
            let name = name.as_ref();
            by_normalized
                .entry(normalize_rule_name(name))
                .or_insert(name);
        }
        Self { by_normalized }
    }

    /// Exact stored name for `requested`
    pub fn get(&self, requested: &str) -> Option<&'a str> {
        self.by_normalized
            .get(&normalize_rule_name(requested))
            .copied()
    }

    /// Split `requested` into resolved exact names and unresolved inputs
    pub fn partition<'r>(&self, requested: &'r [String]) -> (Vec<&'a str>, Vec<&'r str>) {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in requested {
            match self.get(name) {
                Some(exact) if !found.contains(&exact) => found.push(exact),
                Some(_) => {}
                None => missing.push(name.as_str()),
            }
        }
        (found, missing)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_normalize_rule_name() {
        assert_eq!(normalize_rule_name("Laravel"), "laravel");
        assert_eq!(normalize_rule_name("laravel.md"), "laravel");
        assert_eq!(normalize_rule_name("VUE.Md"), "vue");
        assert_eq!(normalize_rule_name("md"), "md");
    }

    #[test]
    fn test_rule_name_and_filename() {
        assert_eq!(rule_name("laravel.md"), "laravel");
        assert_eq!(rule_name("laravel"), "laravel");
        assert_eq!(rule_filename("laravel"), "laravel.md");
    }

    #[test]
    fn test_is_ignored_rule() {
        assert!(is_ignored_rule("README.md"));
        assert!(is_ignored_rule("readme.md"));
        assert!(!is_ignored_rule("laravel.md"));
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let available = vec!["laravel".to_string(), "vue".to_string()];
        assert_eq!(resolve("Laravel", &available), Some("laravel"));
        assert_eq!(resolve("vue.md", &available), Some("vue"));
        assert_eq!(resolve("react", &available), None);
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let available = vec!["Go".to_string(), "go".to_string()];
        assert_eq!(resolve("GO", &available), Some("Go"));
    }

    #[test]
    fn test_index_partition() {
        let stored = vec!["Laravel".to_string(), "vue".to_string()];
        let index = RuleIndex::new(&stored);
        let requested = vec!["laravel".to_string(), "LARAVEL.md".to_string(), "react".to_string()];
        let (found, missing) = index.partition(&requested);
        assert_eq!(found, vec!["Laravel"]);
        assert_eq!(missing, vec!["react"]);
    }
}
