//! Status command implementation
//!
//! Show the sync status of every tracked rule.

use clap::Args;
use rulekeeper_engine::Reconciler;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::{self, rule_line};

/// Status command
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl Command for StatusCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let manifest = context.require_manifest()?;
        context.refresh_source("Checking for updates...");

        let source = context.source();
        let reports = Reconciler::new(&context.layout, &source).status(&manifest)?;
        if reports.is_empty() {
            ui::info("No rules installed.");
            return Ok(());
        }

        ui::header("RuleKeeper Status");
        let mut needs_attention = 0;
        for report in &reports {
            if report.check.needs_attention() {
                needs_attention += 1;
            }
            println!(
                "{}",
                rule_line(&report.entry.file, report.check.status, &report.check.details())
            );
        }
        println!();

        if needs_attention > 0 {
            let verb = if needs_attention == 1 { "needs" } else { "need" };
            ui::info(&format!(
                "{} {verb} attention. Run {} to update.",
                ui::plural(needs_attention, "rule"),
                ui::command("rulekeeper pull")
            ));
        } else {
            ui::success("All rules are synced.");
        }
        Ok(())
    }
}
