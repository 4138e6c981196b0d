//! Add command implementation
//!
//! Install rules from the source into the project's `.claude/` directory and
//! start tracking them.

use clap::Args;
use dialoguer::MultiSelect;
use dialoguer::theme::ColorfulTheme;
use rulekeeper_engine::manifest::ProjectManifest;
use rulekeeper_engine::source::AvailableRule;
use rulekeeper_engine::{AddOptions, Reconciler, SourceGateway};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::stats::{SyncStats, print_outcomes};
use crate::ui;

/// Add command
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Rules to add (case-insensitive, `.md` optional)
    #[arg(value_name = "RULE")]
    pub rules: Vec<String>,

    /// Add every rule in the source
    #[arg(short, long, conflicts_with = "rules")]
    pub all: bool,
}

impl Command for AddCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        context.refresh_source("Checking for updates...");

        let source = context.source();
        let store = context.manifest_store();
        let mut manifest = store.load_or_default()?;

        let rules = if self.all || !self.rules.is_empty() {
            self.rules.clone()
        } else if context.interactive {
            let available = source.available_rules()?;
            match select_rules(&available, &manifest)? {
                Some(selected) if !selected.is_empty() => selected,
                _ => {
                    ui::info("Cancelled.");
                    return Ok(());
                }
            }
        } else {
            return Err(CommandError::usage(
                "No rules specified. Use --all to add all available rules.",
            ));
        };

        let options = AddOptions {
            rules,
            all: self.all,
        };
        let reconciler = Reconciler::new(&context.layout, &source);
        let mut decisions = context.decisions();
        let report = reconciler.add(&mut manifest, &options, decisions.as_mut())?;

        store.save(&manifest)?;

        print_outcomes(&report);
        let stats = SyncStats::from_report(&report);
        let installed = stats.added + stats.updated;
        if installed > 0 {
            println!();
            ui::info(&format!("Added {}.", ui::plural(installed, "rule")));
        }
        Ok(())
    }
}

/// Multi-select over every source rule; installed ones are marked
fn select_rules(
    available: &[AvailableRule],
    manifest: &ProjectManifest,
) -> Result<Option<Vec<String>>> {
    if available.is_empty() {
        return Err(CommandError::usage("No rules found in source."));
    }

    let items: Vec<String> = available
        .iter()
        .map(|rule| {
            if manifest.find(&rule.name).is_some() {
                format!("{} (already installed)", rule.name)
            } else {
                rule.name.clone()
            }
        })
        .collect();

    let selection = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select rules to add (space to toggle, enter to confirm)")
        .items(&items)
        .interact_opt()?;

    Ok(selection.map(|indices| {
        indices
            .into_iter()
            .filter_map(|i| available.get(i).map(|r| r.name.clone()))
            .collect()
    }))
}
