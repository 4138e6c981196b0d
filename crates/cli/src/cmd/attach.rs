//! Attach command implementation

use clap::Args;
use rulekeeper_engine::Reconciler;
use rulekeeper_engine::reconcile::AttachOutcome;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui;

/// Attach command
#[derive(Debug, Args)]
pub struct AttachCommand {
    /// Rule to attach
    #[arg(value_name = "RULE")]
    pub rule: String,
}

impl Command for AttachCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let store = context.manifest_store();
        let mut manifest = context.require_manifest()?;
        let source = context.source();
        let mut decisions = context.decisions();

        let outcome = Reconciler::new(&context.layout, &source).attach(
            &mut manifest,
            &self.rule,
            decisions.as_mut(),
        )?;

        match outcome {
            AttachOutcome::Attached => {
                store.save(&manifest)?;
                ui::success(&format!("Rule '{}' is now attached.", self.rule));
            }
            AttachOutcome::AttachedDiverged => {
                store.save(&manifest)?;
                ui::success(&format!("Rule '{}' is now attached.", self.rule));
                println!("  Local changes were kept; the rule will show as diverged.");
            }
            AttachOutcome::AlreadyAttached => {
                ui::warn(&format!("Rule '{}' is already attached.", self.rule));
            }
            AttachOutcome::Cancelled => {
                ui::info(&format!("Rule '{}' remains detached.", self.rule));
            }
        }
        Ok(())
    }
}
