//! Common utilities and types shared across CLI commands

use chrono::Utc;
use rulekeeper_config::git::Git2Provider;
use rulekeeper_config::GlobalConfig;
use rulekeeper_core::ProjectLayout;
use rulekeeper_engine::decision::DecisionProvider;
use rulekeeper_engine::manifest::{ManifestStore, ProjectManifest};
use rulekeeper_engine::source::refresh_if_due;
use rulekeeper_engine::{LocalSource, RefreshOutcome, Unattended};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::conflict::PromptDecisions;
use crate::error::Result;
use crate::ui;

/// Runtime context for CLI commands
///
/// Holds the loaded global configuration, where it lives on disk, and the
/// project the command operates on. Built once in [`crate::run`].
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Loaded global configuration
    pub config: GlobalConfig,
    /// File the configuration was loaded from
    pub config_path: PathBuf,
    /// Project paths (`.claude/` and `.rulekeeper/`)
    pub layout: ProjectLayout,
    /// Whether prompts can be shown
    pub interactive: bool,
}

impl RuntimeContext {
    /// Load the configuration at `config_path` for the project at `project_root`
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` or `InvalidConfig` from the config layer
    pub fn load(config_path: &Path, project_root: &Path) -> Result<Self> {
        let config = GlobalConfig::load(config_path)?;
        Ok(Self {
            config,
            config_path: config_path.to_path_buf(),
            layout: ProjectLayout::new(project_root),
            interactive: std::io::stdin().is_terminal(),
        })
    }

    /// Rule source described by the configuration
    pub fn source(&self) -> LocalSource {
        LocalSource::from_config(&self.config)
    }

    /// Manifest store for the current project
    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(&self.layout)
    }

    /// Load the project manifest, failing when there is none
    pub fn require_manifest(&self) -> Result<ProjectManifest> {
        Ok(self.manifest_store().load_required()?)
    }

    /// Decision provider matching the terminal: prompts when interactive
    pub fn decisions(&self) -> Box<dyn DecisionProvider> {
        if self.interactive {
            Box::new(PromptDecisions::new())
        } else {
            Box::new(Unattended)
        }
    }

    /// Refresh a git source if the configured interval has elapsed
    ///
    /// A successful pull stamps `lastPull` in the config file. Failures are
    /// reported as a warning; the command continues with what is on disk.
    pub fn refresh_source(&self, message: &str) -> RefreshOutcome {
        let spinner = ui::create_spinner(message);
        let outcome = refresh_if_due(&self.config, &Git2Provider, Utc::now());
        spinner.finish_and_clear();

        match &outcome {
            RefreshOutcome::Pulled { commits } => {
                let mut config = self.config.clone();
                config.record_pull(Utc::now());
                if let Err(e) = config.save(&self.config_path) {
                    tracing::warn!("Failed to record pull time: {e}");
                }
                if *commits > 0 {
                    ui::info(&format!(
                        "Source updated ({})",
                        ui::plural(*commits, "new commit")
                    ));
                }
            }
            RefreshOutcome::Failed(_) => {
                if let Some(e) = outcome.error() {
                    tracing::debug!("{e}");
                }
                ui::warn("Could not check for updates (offline?)");
            }
            RefreshOutcome::NotGitRepo | RefreshOutcome::NotDue | RefreshOutcome::NoRemote => {}
        }
        outcome
    }
}

/// Resolve the config file from the flag/env override or the XDG default
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(rulekeeper_config::dirs::expand_tilde(path));
    }
    rulekeeper_config::default_config_file().ok_or_else(|| {
        rulekeeper_core::Error::Message("Could not determine config directory".to_string()).into()
    })
}

/// Resolve the project root from the flag/env override or the working directory
pub fn resolve_project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(rulekeeper_config::dirs::expand_tilde(path)),
        None => Ok(std::env::current_dir()?),
    }
}
