//! Diff rendering for the terminal

use owo_colors::OwoColorize;
use rulekeeper_engine::diff::{DiffKind, DiffLine, DiffSummary};
use std::io::Write;

use super::Icons;

/// Renders engine diffs as colored unified-style lines
pub struct DiffViewer {
    color: bool,
}

impl DiffViewer {
    /// Viewer that colors lines when `color` is set
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Write the header for `rule`: source on the `---` side, local on `+++`
    pub fn header<W: Write>(&self, writer: &mut W, rule: &str) -> std::io::Result<()> {
        let file = rulekeeper_engine::resolver::rule_filename(rule);
        let lines = [format!("--- source/{file}"), format!("+++ local/{file}")];
        for line in lines {
            if self.color {
                writeln!(writer, "{}", line.cyan())?;
            } else {
                writeln!(writer, "{line}")?;
            }
        }
        Ok(())
    }

    /// Write every diff line followed by a change summary
    pub fn display<W: Write>(
        &self,
        writer: &mut W,
        rule: &str,
        lines: &[DiffLine],
    ) -> std::io::Result<()> {
        self.header(writer, rule)?;
        for line in lines {
            let (marker, text) = match line.kind {
                DiffKind::Add => (Icons::ACTION_ADD, &line.content),
                DiffKind::Remove => (Icons::ACTION_REMOVE, &line.content),
                DiffKind::Context => (" ", &line.content),
            };
            let rendered = format!("{marker} {text}");
            if !self.color {
                writeln!(writer, "{rendered}")?;
                continue;
            }
            match line.kind {
                DiffKind::Add => writeln!(writer, "{}", rendered.green())?,
                DiffKind::Remove => writeln!(writer, "{}", rendered.red())?,
                DiffKind::Context => writeln!(writer, "{}", rendered.dimmed())?,
            }
        }

        let summary = DiffSummary::of(lines);
        writeln!(writer)?;
        let text = format!("{} added, {} removed", summary.added, summary.removed);
        if self.color {
            writeln!(writer, "{}", text.dimmed())
        } else {
            writeln!(writer, "{text}")
        }
    }
}
