//! Remove command implementation

use clap::Args;
use rulekeeper_engine::{Reconciler, RuleOutcome};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::stats::print_outcomes;
use crate::ui;

/// Remove command
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Rules to stop tracking
    #[arg(value_name = "RULE", required = true)]
    pub rules: Vec<String>,

    /// Keep the file in `.claude/`, only forget it in the manifest
    #[arg(long)]
    pub keep_file: bool,
}

impl Command for RemoveCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let store = context.manifest_store();
        let mut manifest = context.require_manifest()?;
        let source = context.source();

        let report = Reconciler::new(&context.layout, &source).remove(
            &mut manifest,
            &self.rules,
            self.keep_file,
        )?;

        let removed = report.count(&RuleOutcome::Removed);
        if removed > 0 {
            store.save(&manifest)?;
        }

        print_outcomes(&report);
        if removed > 0 {
            println!();
            ui::info(&format!("Removed {}.", ui::plural(removed, "rule")));
        }
        Ok(())
    }
}
