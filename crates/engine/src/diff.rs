//! Line diffs between the source and local copy of a rule
//!
//! Diffs are for display only; nothing is merged. Two algorithms are offered:
//! [`line_diff`], a fast two-pointer scan that reads well for small edits, and
//! [`minimal_diff`], a Myers diff from `similar` for heavily reordered files.

use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;

/// Kind of a diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// Present only locally
    Add,
    /// Present only in the source
    Remove,
    /// Present in both
    Context,
}

/// One line of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// What happened to the line
    pub kind: DiffKind,
    /// Line text without the trailing newline
    pub content: String,
}

impl DiffLine {
    fn new(kind: DiffKind, content: &str) -> Self {
        Self {
            kind,
            content: content.to_string(),
        }
    }
}

/// Diff algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffAlgorithm {
    /// Two-pointer scan
    #[default]
    Simple,
    /// Myers minimal diff
    Minimal,
}

/// Added/removed line counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Lines only in the local copy
    pub added: usize,
    /// Lines only in the source
    pub removed: usize,
}

impl DiffSummary {
    /// Count the changes in `lines`
    pub fn of(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut acc, line| {
            match line.kind {
                DiffKind::Add => acc.added += 1,
                DiffKind::Remove => acc.removed += 1,
                DiffKind::Context => {}
            }
            acc
        })
    }

    /// Whether there are no changes
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Diff `source` (old) against `local` (new) with the chosen algorithm
pub fn diff(source: &str, local: &str, algorithm: DiffAlgorithm) -> Vec<DiffLine> {
    match algorithm {
        DiffAlgorithm::Simple => line_diff(source, local),
        DiffAlgorithm::Minimal => minimal_diff(source, local),
    }
}

/// Two-pointer line diff
///
/// Equal lines are context. When they differ, a source line that never
/// appears locally is a removal, a local line that never appears in the
/// source is an addition, and otherwise both are emitted as remove + add.
pub fn line_diff(source: &str, local: &str) -> Vec<DiffLine> {
    let source: Vec<&str> = source.split('\n').collect();
    let local: Vec<&str> = local.split('\n').collect();
    let source_set: HashSet<&str> = source.iter().copied().collect();
    let local_set: HashSet<&str> = local.iter().copied().collect();

    let mut result = Vec::with_capacity(source.len().max(local.len()));
    let (mut si, mut li) = (0, 0);

    while si < source.len() || li < local.len() {
        if si >= source.len() {
            result.push(DiffLine::new(DiffKind::Add, local[li]));
            li += 1;
        } else if li >= local.len() {
            result.push(DiffLine::new(DiffKind::Remove, source[si]));
            si += 1;
        } else if source[si] == local[li] {
            result.push(DiffLine::new(DiffKind::Context, source[si]));
            si += 1;
            li += 1;
        } else if !local_set.contains(source[si]) {
            result.push(DiffLine::new(DiffKind::Remove, source[si]));
            si += 1;
        } else if !source_set.contains(local[li]) {
            result.push(DiffLine::new(DiffKind::Add, local[li]));
            li += 1;
        } else {
            result.push(DiffLine::new(DiffKind::Remove, source[si]));
            result.push(DiffLine::new(DiffKind::Add, local[li]));
            si += 1;
            li += 1;
        }
    }

    result
}

/// Myers line diff
pub fn minimal_diff(source: &str, local: &str) -> Vec<DiffLine> {
    TextDiff::from_lines(source, local)
        .iter_all_changes()
        .map(|change| {
            let kind = match change.tag() {
                ChangeTag::Delete => DiffKind::Remove,
                ChangeTag::Insert => DiffKind::Add,
                ChangeTag::Equal => DiffKind::Context,
            };
            let content = change.value().trim_end_matches(['\n', '\r']);
            DiffLine::new(kind, content)
        })
        .collect()
}
