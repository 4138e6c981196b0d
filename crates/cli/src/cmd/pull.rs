//! Pull command implementation
//!
//! Bring tracked rules up to date with the source, asking about local edits.

use clap::Args;
use rulekeeper_engine::{PullOptions, Reconciler};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::stats::{SyncStats, print_outcomes};
use crate::ui;

/// Pull command
#[derive(Debug, Args)]
pub struct PullCommand {
    /// Rules to update (default: every tracked rule)
    #[arg(value_name = "RULE")]
    pub rules: Vec<String>,

    /// Overwrite local changes without asking
    #[arg(short, long)]
    pub force: bool,

    /// Also update detached rules
    #[arg(long)]
    pub include_detached: bool,
}

impl Command for PullCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let store = context.manifest_store();
        let mut manifest = context.require_manifest()?;
        context.refresh_source("Checking for updates...");

        let source = context.source();
        let options = PullOptions {
            rules: self.rules.clone(),
            force: self.force,
            include_detached: self.include_detached,
        };
        let mut decisions = context.decisions();
        let report = Reconciler::new(&context.layout, &source).pull(
            &mut manifest,
            &options,
            decisions.as_mut(),
        )?;

        // Decisions made before a cancel are kept
        store.save(&manifest)?;

        print_outcomes(&report);

        if report.cancelled {
            ui::info("Cancelled.");
        }
        println!();
        let stats = SyncStats::from_report(&report);
        for line in stats.pull_summary() {
            if stats.failed > 0 && line.ends_with("failed.") {
                ui::error(&line);
            } else {
                ui::info(&line);
            }
        }
        Ok(())
    }
}
