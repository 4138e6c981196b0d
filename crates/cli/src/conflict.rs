//! Interactive conflict resolution
//!
//! [`PromptDecisions`] answers the engine's decision points with `dialoguer`
//! menus. Pressing Esc or `q` counts as cancelling the prompt.

use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use owo_colors::OwoColorize;
use rulekeeper_core::Result;
use rulekeeper_engine::decision::{
    AddConflictAction, AddConflictContext, AttachAction, ConflictAction, ConflictContext,
    Decision, DecisionProvider, MissingLocalAction, MissingSourceAction,
};
use rulekeeper_engine::diff::DiffLine;
use rulekeeper_engine::resolver::rule_filename;

use crate::error::CommandError;
use crate::ui::{self, DiffViewer};

/// One menu entry: what it does and a short hint
struct Choice<T> {
    value: T,
    label: &'static str,
    hint: &'static str,
}

impl<T> Choice<T> {
    fn new(value: T, label: &'static str, hint: &'static str) -> Self {
        Self { value, label, hint }
    }

    fn render(&self) -> String {
        format!("{:<16} {}", self.label, self.hint.dimmed())
    }
}

/// Decision provider that asks the operator in the terminal
pub struct PromptDecisions {
    theme: ColorfulTheme,
    viewer: DiffViewer,
}

impl Default for PromptDecisions {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptDecisions {
    /// Prompts with the colorful theme and a colored diff viewer
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            viewer: DiffViewer::new(true),
        }
    }

    /// Show a menu and return the chosen value, `Cancelled` on Esc
    fn choose<T: Copy>(&self, choices: &[Choice<T>]) -> Result<Decision<T>> {
        let items: Vec<String> = choices.iter().map(Choice::render).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(CommandError::from)?;

        Ok(match selection.and_then(|i| choices.get(i)) {
            Some(choice) => Decision::Chosen(choice.value),
            None => Decision::Cancelled,
        })
    }
}

/// Menu for a pull conflict
///
/// View-diff is only useful when the source moved too; the last entry is
/// Cancel for a single rule and Skip in a batch.
fn conflict_choices(source_changed: bool, single_rule: bool) -> Vec<Choice<ConflictAction>> {
    let mut choices = vec![
        Choice::new(
            ConflictAction::Overwrite,
            "Overwrite",
            "Replace with source version (local changes will be lost)",
        ),
        Choice::new(
            ConflictAction::Detach,
            "Detach",
            "Keep local version, stop tracking this rule",
        ),
    ];
    if source_changed {
        choices.push(Choice::new(
            ConflictAction::ViewDiff,
            "View diff",
            "See differences before deciding",
        ));
    }
    choices.push(if single_rule {
        Choice::new(ConflictAction::Cancel, "Cancel", "Abort this operation")
    } else {
        Choice::new(ConflictAction::Skip, "Skip", "Do nothing for now")
    });
    choices
}

impl DecisionProvider for PromptDecisions {
    fn resolve_conflict(&mut self, ctx: &ConflictContext<'_>) -> Result<Decision<ConflictAction>> {
        let file = rule_filename(ctx.rule);
        if ctx.source_changed {
            ui::warn(&format!("{file} has local changes AND source has been updated"));
        } else {
            ui::warn(&format!("{file} has local changes"));
        }
        tracing::debug!(
            rule = ctx.rule,
            source = %ctx.source_hash.short(12),
            local = %ctx.local_hash.short(12),
            "Asking for conflict resolution"
        );
        self.choose(&conflict_choices(ctx.source_changed, ctx.single_rule))
    }

    fn resolve_missing_source(&mut self, rule: &str) -> Result<Decision<MissingSourceAction>> {
        ui::warn(&format!("{} - source file no longer exists", rule_filename(rule)));
        self.choose(&[
            Choice::new(
                MissingSourceAction::Keep,
                "Keep local",
                "Detach and keep the local file",
            ),
            Choice::new(
                MissingSourceAction::Remove,
                "Remove",
                "Delete from project and manifest",
            ),
        ])
    }

    fn resolve_missing_local(&mut self, rule: &str) -> Result<Decision<MissingLocalAction>> {
        ui::warn(&format!("{} - local file missing", rule_filename(rule)));
        self.choose(&[
            Choice::new(MissingLocalAction::Restore, "Restore", "Copy from source"),
            Choice::new(MissingLocalAction::Remove, "Remove", "Remove from manifest"),
        ])
    }

    fn resolve_attach(&mut self, rule: &str) -> Result<Decision<AttachAction>> {
        ui::warn(&format!("{} differs from source version", rule_filename(rule)));
        let menu = [
            Choice::new(
                Some(AttachAction::Overwrite),
                "Overwrite local",
                "Replace with source version",
            ),
            Choice::new(
                Some(AttachAction::Keep),
                "Keep local",
                "Attach but keep local version (will show as diverged)",
            ),
            Choice::new(None, "Cancel", "Keep detached"),
        ];
        Ok(match self.choose(&menu)? {
            Decision::Chosen(Some(action)) => Decision::Chosen(action),
            Decision::Chosen(None) | Decision::Cancelled => Decision::Cancelled,
        })
    }

    fn resolve_add_conflict(
        &mut self,
        ctx: &AddConflictContext<'_>,
    ) -> Result<Decision<AddConflictAction>> {
        let file = rule_filename(ctx.rule);
        if ctx.tracked {
            ui::warn(&format!("{file} has local changes"));
        } else {
            ui::warn(&format!("{file} already exists in .claude/ and is not tracked"));
        }
        self.choose(&[
            Choice::new(
                AddConflictAction::Overwrite,
                "Overwrite",
                "Replace with source version",
            ),
            Choice::new(
                AddConflictAction::Detach,
                "Detach",
                "Keep the existing file and track it as detached",
            ),
            Choice::new(AddConflictAction::Skip, "Skip", "Leave this rule alone"),
        ])
    }

    fn show_diff(&mut self, rule: &str, lines: &[DiffLine]) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        println!();
        self.viewer.display(&mut stdout, rule, lines)?;
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn values(choices: &[Choice<ConflictAction>]) -> Vec<ConflictAction> {
        choices.iter().map(|c| c.value).collect()
    }

    #[test]
    fn test_conflict_menu_for_single_rule() {
        assert_eq!(
            values(&conflict_choices(true, true)),
            vec![
                ConflictAction::Overwrite,
                ConflictAction::Detach,
                ConflictAction::ViewDiff,
                ConflictAction::Cancel,
            ]
        );
    }

    #[test]
    fn test_conflict_menu_for_batch_without_source_change() {
        assert_eq!(
            values(&conflict_choices(false, false)),
            vec![
                ConflictAction::Overwrite,
                ConflictAction::Detach,
                ConflictAction::Skip,
            ]
        );
    }

    #[test]
    fn test_choice_render_includes_hint() {
        let choice = Choice::new(ConflictAction::Skip, "Skip", "Do nothing for now");
        let rendered = choice.render();
        assert!(rendered.starts_with("Skip"));
        assert!(rendered.contains("Do nothing for now"));
    }
}
