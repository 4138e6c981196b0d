//! Detach command implementation

use clap::Args;
use rulekeeper_engine::Reconciler;
use rulekeeper_engine::reconcile::DetachOutcome;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui;

/// Detach command
#[derive(Debug, Args)]
pub struct DetachCommand {
    /// Rule to detach
    #[arg(value_name = "RULE")]
    pub rule: String,
}

impl Command for DetachCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let store = context.manifest_store();
        let mut manifest = context.require_manifest()?;
        let source = context.source();

        match Reconciler::new(&context.layout, &source).detach(&mut manifest, &self.rule)? {
            DetachOutcome::Detached => {
                store.save(&manifest)?;
                ui::success(&format!("Rule '{}' is now detached.", self.rule));
                println!(
                    "  Local edits are kept; run {} to resume syncing.",
                    ui::command(&format!("rulekeeper attach {}", self.rule))
                );
            }
            DetachOutcome::AlreadyDetached => {
                ui::warn(&format!("Rule '{}' is already detached.", self.rule));
            }
        }
        Ok(())
    }
}
