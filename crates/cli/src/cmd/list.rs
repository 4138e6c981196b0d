//! List command implementation

use clap::Args;
use owo_colors::OwoColorize;
use rulekeeper_config::dirs::contract_tilde;
use rulekeeper_engine::{RuleStatus, SourceGateway};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::{self, Icons};

/// List command
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show rules installed in this project
    #[arg(short, long)]
    pub installed: bool,
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        context.refresh_source("Checking source...");
        let manifest = context.manifest_store().load()?.unwrap_or_default();

        if self.installed {
            if manifest.is_empty() {
                ui::info("No rules installed.");
                return Ok(());
            }
            ui::header("Installed Rules");
            for name in manifest.sorted_names() {
                let Some(entry) = manifest.rules.get(&name) else {
                    continue;
                };
                let hint = if entry.status == RuleStatus::Synced {
                    String::new()
                } else {
                    format!(" ({})", entry.status).dimmed().to_string()
                };
                println!("  {}{hint}", entry.file);
            }
            println!();
            return Ok(());
        }

        let source = context.source();
        let available = source.available_rules()?;
        if available.is_empty() {
            ui::info("No rules found in source.");
            return Ok(());
        }

        ui::header("Available Rules");
        for rule in &available {
            if manifest.find(&rule.name).is_some() {
                println!(
                    "  {} {}{}",
                    Icons::SUCCESS.green(),
                    rule.file,
                    " (installed)".dimmed()
                );
            } else {
                println!("  {} {}", Icons::DETACHED.dimmed(), rule.file);
            }
        }
        println!();
        println!(
            "{}",
            format!("Source: {}", contract_tilde(source.root())).dimmed()
        );
        println!();
        Ok(())
    }
}
