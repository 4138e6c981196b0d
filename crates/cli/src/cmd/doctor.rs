//! Doctor command implementation
//!
//! Runs a fixed list of checks against the global config, the rule source
//! and the current project, and prints one line per check.

use clap::Args;
use owo_colors::OwoColorize;
use rulekeeper_config::dirs::contract_tilde;
use rulekeeper_config::git::{GitProvider, create_provider, is_git_repo};
use rulekeeper_config::{GlobalConfig, SourceType};
use rulekeeper_core::ProjectLayout;
use rulekeeper_engine::{LocalSource, ManifestStore, SourceGateway};
use std::path::Path;

use crate::ui::{self, StatusIcon};

/// Doctor command
#[derive(Debug, Args)]
pub struct DoctorCommand {}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Check passed
    Pass,
    /// Works, but something is off
    Warn,
    /// Broken
    Fail,
}

impl Health {
    fn icon(self) -> StatusIcon {
        match self {
            Health::Pass => StatusIcon::Success,
            Health::Warn => StatusIcon::Warning,
            Health::Fail => StatusIcon::Error,
        }
    }
}

/// One diagnostic line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Check name
    pub name: &'static str,
    /// Result of the check
    pub health: Health,
    /// Detail shown after the name
    pub message: String,
}

impl Diagnostic {
    fn new(name: &'static str, health: Health, message: impl Into<String>) -> Self {
        Self {
            name,
            health,
            message: message.into(),
        }
    }
}

impl DoctorCommand {
    /// Print diagnostics for `config_path` and the project at `project_root`
    ///
    /// Failed checks are reported, not returned as errors.
    pub fn run(&self, config_path: &Path, project_root: &Path) {
        ui::header("RuleKeeper Diagnostics");

        let layout = ProjectLayout::new(project_root);
        let git = create_provider();
        let diagnostics = diagnose(config_path, &layout, git.as_ref());

        for diagnostic in &diagnostics {
            println!(
                "  {} {}: {}",
                diagnostic.health.icon().colored(),
                diagnostic.name,
                diagnostic.message
            );
        }
        println!();

        let count = |health: Health| diagnostics.iter().filter(|d| d.health == health).count();
        let (failed, warned) = (count(Health::Fail), count(Health::Warn));
        if failed > 0 {
            ui::error(&format!("{} found.", ui::plural(failed, "issue")));
        } else if warned > 0 {
            ui::warn(&format!("{} found.", ui::plural(warned, "warning")));
        } else {
            ui::success("All checks passed.");
        }
    }
}

/// Run every check in display order
pub fn diagnose(
    config_path: &Path,
    layout: &ProjectLayout,
    git: &dyn GitProvider,
) -> Vec<Diagnostic> {
    let mut results = Vec::new();

    let config = match GlobalConfig::load(config_path) {
        Ok(config) => {
            results.push(Diagnostic::new(
                "Global config",
                Health::Pass,
                format!("Found at {}", contract_tilde(config_path)),
            ));
            Some(config)
        }
        Err(rulekeeper_core::Error::ConfigMissing { .. }) => {
            results.push(Diagnostic::new(
                "Global config",
                Health::Fail,
                format!("Not found. Run {} to configure.", "rulekeeper init".cyan()),
            ));
            None
        }
        Err(e) => {
            results.push(Diagnostic::new("Global config", Health::Fail, e.to_string()));
            None
        }
    };

    if let Some(config) = &config {
        check_source(config, git, &mut results);
    }

    let rules_dir = layout.rules_dir();
    let has_rules_dir = rules_dir.is_dir();
    results.push(if has_rules_dir {
        Diagnostic::new(".claude directory", Health::Pass, "Found in current project")
    } else {
        Diagnostic::new(
            ".claude directory",
            Health::Warn,
            "Not found - not in a Claude project?",
        )
    });

    match ManifestStore::new(layout).load() {
        Ok(Some(manifest)) => {
            results.push(Diagnostic::new(
                "RuleKeeper manifest",
                Health::Pass,
                format!("{} tracked", ui::plural(manifest.len(), "rule")),
            ));
            if config.is_some() && !manifest.is_empty() {
                let missing = manifest
                    .rules
                    .values()
                    .filter(|entry| !rules_dir.join(&entry.file).exists())
                    .count();
                results.push(if missing > 0 {
                    Diagnostic::new(
                        "Rule files",
                        Health::Warn,
                        format!(
                            "{} missing local files",
                            ui::plural(missing, "tracked rule")
                        ),
                    )
                } else {
                    Diagnostic::new(
                        "Rule files",
                        Health::Pass,
                        "All tracked rules have local files",
                    )
                });
            }
        }
        Ok(None) if has_rules_dir => results.push(Diagnostic::new(
            "RuleKeeper manifest",
            Health::Warn,
            format!(
                "No manifest. Run {} to start tracking rules.",
                "rulekeeper add".cyan()
            ),
        )),
        Ok(None) => {}
        Err(e) => results.push(Diagnostic::new(
            "RuleKeeper manifest",
            Health::Fail,
            e.to_string(),
        )),
    }

    results
}

fn check_source(config: &GlobalConfig, git: &dyn GitProvider, results: &mut Vec<Diagnostic>) {
    let path = &config.source.path;
    if !path.exists() {
        results.push(Diagnostic::new(
            "Source path",
            Health::Fail,
            format!("Path does not exist: {}", contract_tilde(path)),
        ));
        return;
    }
    results.push(Diagnostic::new("Source path", Health::Pass, contract_tilde(path)));

    match LocalSource::from_config(config).available_rules() {
        Ok(rules) if !rules.is_empty() => results.push(Diagnostic::new(
            "Source rules",
            Health::Pass,
            format!("{} available", ui::plural(rules.len(), "rule")),
        )),
        Ok(_) => results.push(Diagnostic::new(
            "Source rules",
            Health::Warn,
            "No .md files found in source",
        )),
        Err(e) => results.push(Diagnostic::new("Source rules", Health::Fail, e.to_string())),
    }

    if config.source.kind != SourceType::Git {
        return;
    }
    results.push(if !is_git_repo(path) {
        Diagnostic::new(
            "Git repository",
            Health::Fail,
            "Source is configured as git but is not a git repository",
        )
    } else if git.has_remote(path) {
        Diagnostic::new("Git remote", Health::Pass, "Remote configured")
    } else {
        Diagnostic::new(
            "Git remote",
            Health::Warn,
            "No remote configured - cannot auto-pull",
        )
    });
}
