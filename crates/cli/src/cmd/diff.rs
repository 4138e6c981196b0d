//! Diff command implementation
//!
//! Compare the source copy of a rule (`---`) with the local copy (`+++`).

use clap::Args;
use owo_colors::OwoColorize;
use rulekeeper_config::dirs::contract_tilde;
use rulekeeper_engine::diff::DiffAlgorithm;
use rulekeeper_engine::reconcile::RuleDiff;
use rulekeeper_engine::resolver::rule_filename;
use rulekeeper_engine::{Reconciler, SourceGateway};
use std::io::{IsTerminal, Write};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui::{self, DiffViewer};

/// Diff command
#[derive(Debug, Args)]
pub struct DiffCommand {
    /// Rules to compare
    #[arg(value_name = "RULE")]
    pub rules: Vec<String>,

    /// Compare every rule whose local copy was edited
    #[arg(short, long, conflicts_with = "rules")]
    pub all: bool,

    /// Use a minimal (Myers) diff instead of the line scan
    #[arg(long)]
    pub minimal: bool,
}

impl Command for DiffCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let manifest = context.require_manifest()?;
        let source = context.source();
        let algorithm = if self.minimal {
            DiffAlgorithm::Minimal
        } else {
            DiffAlgorithm::Simple
        };
        let reconciler = Reconciler::new(&context.layout, &source).with_diff_algorithm(algorithm);

        let targets = if self.all {
            let diverged = reconciler.diverged_rules(&manifest)?;
            if diverged.is_empty() {
                ui::info("No diverged rules to show.");
                return Ok(());
            }
            diverged
        } else if !self.rules.is_empty() {
            self.rules.clone()
        } else {
            return Err(CommandError::usage(
                "Specify a rule name or use --all to see all diverged rules.",
            ));
        };

        let viewer = DiffViewer::new(std::io::stdout().is_terminal());
        for requested in &targets {
            let Some(name) = manifest.find(requested) else {
                ui::warn(&format!("Rule '{requested}' not found in manifest."));
                continue;
            };

            ui::header(&format!("Comparing {}", rule_filename(&name)));
            let source_path = contract_tilde(&source.rule_path(&name));
            let local_path = reconciler
                .local_path_of(&manifest, &name)
                .map(|p| contract_tilde(&p))
                .unwrap_or_default();

            match reconciler.rule_diff(&manifest, &name)? {
                RuleDiff::BothMissing => ui::warn("Both source and local files are missing."),
                RuleDiff::SourceMissing => {
                    ui::warn("Source file no longer exists.");
                    println!("{}", "--- source (missing)".cyan());
                    println!("{}", format!("+++ local ({local_path})").cyan());
                }
                RuleDiff::LocalMissing => {
                    ui::warn("Local file is missing.");
                    println!("{}", format!("--- source ({source_path})").cyan());
                    println!("{}", "+++ local (missing)".cyan());
                }
                RuleDiff::Identical => {
                    ui::info(&format!("No difference found for '{name}'."));
                }
                RuleDiff::Changes(lines) => {
                    let mut stdout = std::io::stdout().lock();
                    viewer.display(&mut stdout, &name, &lines)?;
                    stdout.flush()?;
                }
            }
        }
        Ok(())
    }
}
