//! RuleKeeper CLI library
//!
//! This library contains all the CLI logic for rulekeeper, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod conflict;
pub mod error;
pub mod stats;
pub mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// RuleKeeper - keep shared Claude rules in sync across projects
#[derive(Parser)]
#[command(name = "rulekeeper")]
#[command(about = "Keep shared Claude rules in sync across projects")]
#[command(version)]
#[command(long_about = "Keep shared Claude rules in sync across projects

RuleKeeper copies rule files from one shared source (a local folder or a git
clone) into each project's .claude/ directory and tracks them by content hash,
so it can tell which copies are up to date, which ones the source has moved
past, and which ones were edited locally.

Typical workflow:
  • rulekeeper init          Configure the rule source once
  • rulekeeper add --all     Install rules into the current project
  • rulekeeper status        See what changed
  • rulekeeper pull          Bring rules up to date")]
pub struct Cli {
    /// Path to the config file
    #[arg(long, env = "RULEKEEPER_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Project directory (defaults to the current directory)
    #[arg(long, env = "RULEKEEPER_PROJECT", value_name = "DIR", global = true)]
    pub project: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "RULEKEEPER_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the rulekeeper CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Configure the rule source
    Init(cmd::init::InitCommand),

    /// Install rules from the source into this project
    Add(cmd::add::AddCommand),

    /// Stop tracking rules and delete their local copies
    Remove(cmd::remove::RemoveCommand),

    /// Show the sync status of installed rules
    Status(cmd::status::StatusCommand),

    /// Update installed rules from the source
    Pull(cmd::pull::PullCommand),

    /// Show differences between source and local rules
    Diff(cmd::diff::DiffCommand),

    /// List available or installed rules
    List(cmd::list::ListCommand),

    /// Keep local edits to a rule and stop syncing it
    Detach(cmd::detach::DetachCommand),

    /// Resume syncing a detached rule
    Attach(cmd::attach::AttachCommand),

    /// Show or change the rule source
    #[command(subcommand)]
    Source(cmd::source::SourceCommand),

    /// Diagnose configuration and project setup
    Doctor(cmd::doctor::DoctorCommand),
}

/// Execute a command that needs a loaded configuration
fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Init(_) | Commands::Doctor(_) => {
            unreachable!("init and doctor run without a loaded config")
        }
        Commands::Add(add_cmd) => add_cmd.execute(context)?,
        Commands::Remove(remove_cmd) => remove_cmd.execute(context)?,
        Commands::Status(status_cmd) => status_cmd.execute(context)?,
        Commands::Pull(pull_cmd) => pull_cmd.execute(context)?,
        Commands::Diff(diff_cmd) => diff_cmd.execute(context)?,
        Commands::List(list_cmd) => list_cmd.execute(context)?,
        Commands::Detach(detach_cmd) => detach_cmd.execute(context)?,
        Commands::Attach(attach_cmd) => attach_cmd.execute(context)?,
        Commands::Source(source_cmd) => source_cmd.execute(context)?,
    }

    Ok(())
}

/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - The configuration is missing or invalid
/// - Command execution fails
pub fn run(cli: Cli) -> Result<()> {
    rulekeeper_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config_path = common::resolve_config_path(cli.config.as_deref())?;
    let project_root = common::resolve_project_root(cli.project.as_deref())?;
    tracing::debug!(
        config = %config_path.display(),
        project = %project_root.display(),
        "Resolved paths"
    );

    match cli.command {
        // Init writes the config; doctor reports on a missing one
        Commands::Init(init_cmd) => Ok(init_cmd.run(&config_path)?),
        Commands::Doctor(doctor_cmd) => {
            doctor_cmd.run(&config_path, &project_root);
            Ok(())
        }
        command => {
            let context = RuntimeContext::load(&config_path, &project_root)?;
            execute_command(command, &context)
        }
    }
}
