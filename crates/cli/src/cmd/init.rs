//! Init command implementation
//!
//! Configure the rule source. With `--source` the command runs without
//! prompts; otherwise it asks for the source type, its location and the
//! refresh frequency.

use clap::Args;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;
use rulekeeper_config::dirs::contract_tilde;
use rulekeeper_config::git::{GitProvider, create_provider, repo_name_from_url};
use rulekeeper_config::{GlobalConfig, PlatformConfig, PullFrequency, SourceConfig};
use rulekeeper_core::platform::{CURRENT_PLATFORM, WindowsShell};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::source::configure_source;
use crate::error::{CommandError, Result};
use crate::ui;

/// Frequencies in the order they are offered, recommended first
const FREQUENCY_CHOICES: [PullFrequency; 4] = [
    PullFrequency::Daily,
    PullFrequency::Always,
    PullFrequency::Weekly,
    PullFrequency::Never,
];

/// Init command
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Local folder or git URL holding the rules (skips the prompts)
    #[arg(long, value_name = "PATH_OR_URL")]
    pub source: Option<String>,

    /// Where to clone a git source (default: ~/Documents/<repo>)
    #[arg(long, value_name = "DIR")]
    pub clone_path: Option<PathBuf>,

    /// How often to refresh a git source: always, daily, weekly or never
    #[arg(long, value_name = "FREQUENCY")]
    pub frequency: Option<PullFrequency>,
}

impl InitCommand {
    /// Run the init command, writing the config to `config_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be set up or the config cannot
    /// be written
    pub fn run(&self, config_path: &Path) -> Result<()> {
        println!("{}", " Welcome to RuleKeeper! ".black().on_cyan());
        println!();

        if config_path.exists() && !self.force {
            ui::warn("RuleKeeper is already configured. Use --force to reconfigure.");
            return Ok(());
        }

        let interactive = std::io::stdin().is_terminal();
        let git = create_provider();
        let theme = ColorfulTheme::default();

        let source = match &self.source {
            Some(input) => configure_source(input, self.clone_path.as_deref(), git.as_ref())?,
            None if interactive => match unless_cancelled(prompt_source(&theme, git.as_ref()))? {
                Some(source) => source,
                None => return Ok(()),
            },
            None => {
                return Err(CommandError::usage(
                    "No terminal available; pass --source <PATH_OR_URL>",
                ));
            }
        };

        let frequency = match self.frequency {
            Some(frequency) => frequency,
            None if interactive && self.source.is_none() => {
                match unless_cancelled(prompt_frequency(&theme))? {
                    Some(frequency) => frequency,
                    None => return Ok(()),
                }
            }
            None => PullFrequency::default(),
        };

        let mut config = GlobalConfig::new(source, frequency);
        if CURRENT_PLATFORM.is_windows() {
            let shell = WindowsShell::detect();
            ui::info(&format!("Detected shell: {}", shell.label()));
            config.platform = Some(PlatformConfig { shell: Some(shell) });
        }

        config.save(config_path)?;
        info!(path = %config_path.display(), "Wrote configuration");

        ui::success("RuleKeeper is now configured.");
        println!("  Source: {}", contract_tilde(&config.source.path).cyan());
        println!("  Config: {}", contract_tilde(config_path).dimmed());
        println!();
        println!("Next steps:");
        println!("  • Navigate to a project: {}", "cd my-project".dimmed());
        println!("  • Add all rules:         {}", ui::command("rulekeeper add --all"));
        println!("  • Or add specific rule:  {}", ui::command("rulekeeper add <rule-name>"));
        println!("  • List available rules:  {}", ui::command("rulekeeper list"));
        Ok(())
    }
}

/// `None` when the operator backed out of a prompt
fn unless_cancelled<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CommandError::Core(rulekeeper_core::Error::UserCancelled)) => {
            ui::info("Setup cancelled.");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Ask for the source until it can be set up, or the operator backs out
fn prompt_source(theme: &ColorfulTheme, git: &dyn GitProvider) -> Result<SourceConfig> {
    let kinds = [
        format!("Local folder    {}", "e.g., ~/Documents/claude-rules".dimmed()),
        format!("Git repository  {}", "Will be cloned locally".dimmed()),
    ];
    let kind = Select::with_theme(theme)
        .with_prompt("Where are your Claude rules stored?")
        .items(&kinds)
        .default(0)
        .interact_opt()?
        .ok_or(rulekeeper_core::Error::UserCancelled)?;

    loop {
        let attempt = if kind == 0 {
            let path: String = Input::with_theme(theme)
                .with_prompt("Enter the path to your rules folder")
                .with_initial_text("~/Documents/claude-rules")
                .interact_text()?;
            configure_source(path.trim(), None, git)
        } else {
            let url: String = Input::with_theme(theme)
                .with_prompt("Enter the Git repository URL")
                .interact_text()?;
            let url = url.trim().to_string();
            let default_target = format!("~/Documents/{}", repo_name_from_url(&url));
            let target: String = Input::with_theme(theme)
                .with_prompt("Where should the repository be cloned?")
                .with_initial_text(default_target)
                .interact_text()?;
            configure_source(&url, Some(Path::new(target.trim())), git)
        };

        match attempt {
            Ok(source) => return Ok(source),
            Err(e) => {
                debug!("Source setup failed: {e}");
                ui::error(&e.to_string());
                ui::info("Please try again.");
            }
        }
    }
}

fn prompt_frequency(theme: &ColorfulTheme) -> Result<PullFrequency> {
    let items: Vec<&str> = FREQUENCY_CHOICES.iter().map(|f| f.description()).collect();
    let selection = Select::with_theme(theme)
        .with_prompt("How often should RuleKeeper check for updates?")
        .items(&items)
        .default(0)
        .interact_opt()?
        .ok_or(rulekeeper_core::Error::UserCancelled)?;
    Ok(FREQUENCY_CHOICES
        .get(selection)
        .copied()
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use rulekeeper_config::SourceType;
    use tempfile::TempDir;

    fn command(source: &Path, force: bool) -> InitCommand {
        InitCommand {
            force,
            source: Some(source.to_string_lossy().into_owned()),
            clone_path: None,
            frequency: Some(PullFrequency::Weekly),
        }
    }

    #[test]
    fn test_init_writes_config() {
        let temp = TempDir::new().unwrap();
        let rules = temp.path().join("rules");
        std::fs::create_dir(&rules).unwrap();
        let config_path = temp.path().join("config").join("config.toml");

        command(&rules, false).run(&config_path).unwrap();

        let config = GlobalConfig::load(&config_path).unwrap();
        assert_eq!(config.source.kind, SourceType::Local);
        assert_eq!(config.settings.pull_frequency, PullFrequency::Weekly);
        assert!(config.settings.auto_pull);
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        std::fs::create_dir(&first).unwrap();
        std::fs::create_dir(&second).unwrap();
        let config_path = temp.path().join("config.toml");

        command(&first, false).run(&config_path).unwrap();
        command(&second, false).run(&config_path).unwrap();
        let kept = GlobalConfig::load(&config_path).unwrap();
        assert!(kept.source.path.ends_with("first"));

        command(&second, true).run(&config_path).unwrap();
        let replaced = GlobalConfig::load(&config_path).unwrap();
        assert!(replaced.source.path.ends_with("second"));
    }

    #[test]
    fn test_frequency_choices_cover_all_variants() {
        for frequency in PullFrequency::ALL {
            assert!(FREQUENCY_CHOICES.contains(&frequency));
        }
    }
}
