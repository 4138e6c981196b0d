//! Global configuration
//!
//! The global config records where rules come from and how often the source
//! is refreshed. It lives at `$XDG_CONFIG_HOME/rulekeeper/config.toml`:
//!
//! ```toml
//! version = 1
//!
//! [source]
//! type = "git"
//! path = "/home/me/Documents/team-rules"
//! remote = "git@github.com:team/rules.git"
//!
//! [settings]
//! autoPull = true
//! pullFrequency = "daily"
//! lastPull = "2026-01-10T08:00:00Z"
//! ```

use crate::Result;
use chrono::{DateTime, Utc};
use rulekeeper_core::platform::WindowsShell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Current config schema version
pub const CONFIG_VERSION: u32 = 1;

/// Kind of rule source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Plain directory
    Local,
    /// Directory that is a git clone
    Git,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Git => "git",
        })
    }
}

/// How often the source is refreshed automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullFrequency {
    /// Before every command
    Always,
    /// Once every 24 hours
    #[default]
    Daily,
    /// Once every 168 hours
    Weekly,
    /// Only on explicit `source pull`
    Never,
}

impl PullFrequency {
    /// All variants, in the order shown to the operator
    pub const ALL: [Self; 4] = [Self::Always, Self::Daily, Self::Weekly, Self::Never];

    /// Minimum hours between two automatic refreshes
    pub fn interval_hours(self) -> Option<i64> {
        match self {
            Self::Always => Some(0),
            Self::Daily => Some(24),
            Self::Weekly => Some(24 * 7),
            Self::Never => None,
        }
    }

    /// Description used in prompts
    pub fn description(self) -> &'static str {
        match self {
            Self::Always => "Always (every command)",
            Self::Daily => "Daily (recommended)",
            Self::Weekly => "Weekly",
            Self::Never => "Never (manual only)",
        }
    }
}

impl fmt::Display for PullFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Always => "always",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Never => "never",
        })
    }
}

impl FromStr for PullFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "never" => Ok(Self::Never),
            other => Err(format!(
                "invalid pull frequency '{other}' (expected always, daily, weekly or never)"
            )),
        }
    }
}

/// Where rules come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind
    #[serde(rename = "type")]
    pub kind: SourceType,

    /// Directory containing the rule files
    pub path: PathBuf,

    /// Remote URL for git sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

/// Refresh settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Refresh git sources automatically before commands
    #[serde(default = "default_auto_pull", rename = "autoPull")]
    pub auto_pull: bool,

    /// Minimum interval between automatic refreshes
    #[serde(default, rename = "pullFrequency")]
    pub pull_frequency: PullFrequency,

    /// When the source was last refreshed
    #[serde(default, rename = "lastPull", skip_serializing_if = "Option::is_none")]
    pub last_pull: Option<DateTime<Utc>>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            auto_pull: default_auto_pull(),
            pull_frequency: PullFrequency::default(),
            last_pull: None,
        }
    }
}

impl SettingsConfig {
    /// Whether an automatic refresh is due at `now`
    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        if !self.auto_pull {
            return false;
        }
        let Some(interval) = self.pull_frequency.interval_hours() else {
            return false;
        };
        let Some(last) = self.last_pull else {
            return true;
        };
        interval == 0 || (now - last).num_hours() >= interval
    }
}

/// Platform specific settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Shell detected on Windows during `init`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<WindowsShell>,
}

/// Global rulekeeper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Rule source
    pub source: SourceConfig,

    /// Refresh settings
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Platform settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformConfig>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_auto_pull() -> bool {
    true
}

impl GlobalConfig {
    /// Create a config for a freshly chosen source
    pub fn new(source: SourceConfig, pull_frequency: PullFrequency) -> Self {
        Self {
            version: CONFIG_VERSION,
            source,
            settings: SettingsConfig {
                pull_frequency,
                ..SettingsConfig::default()
            },
            platform: None,
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` if the file does not exist and `InvalidConfig`
    /// if it cannot be parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(rulekeeper_core::Error::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| rulekeeper_core::Error::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.source.path = crate::dirs::expand_tilde(&config.source.path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            rulekeeper_core::Error::Serialization(format!("Failed to serialize config: {e}"))
        })?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Whether an automatic refresh is due at `now`
    pub fn should_refresh_now(&self, now: DateTime<Utc>) -> bool {
        self.settings.should_refresh(now)
    }

    /// Record a successful refresh
    pub fn record_pull(&mut self, at: DateTime<Utc>) {
        self.settings.last_pull = Some(at);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn settings(frequency: PullFrequency, last: Option<DateTime<Utc>>) -> SettingsConfig {
        SettingsConfig {
            auto_pull: true,
            pull_frequency: frequency,
            last_pull: last,
        }
    }

    fn local_config(path: &Path) -> GlobalConfig {
        GlobalConfig::new(
            SourceConfig {
                kind: SourceType::Local,
                path: path.to_path_buf(),
                remote: None,
            },
            PullFrequency::Daily,
        )
    }

    #[test]
    fn test_refresh_disabled_by_auto_pull() {
        let mut s = settings(PullFrequency::Always, None);
        s.auto_pull = false;
        assert!(!s.should_refresh(now()));
    }

    #[test]
    fn test_refresh_never() {
        assert!(!settings(PullFrequency::Never, None).should_refresh(now()));
    }

    #[test]
    fn test_refresh_without_last_pull() {
        assert!(settings(PullFrequency::Weekly, None).should_refresh(now()));
    }

    #[test]
    fn test_refresh_always() {
        assert!(settings(PullFrequency::Always, Some(now())).should_refresh(now()));
    }

    #[test]
    fn test_refresh_daily_threshold() {
        let recent = settings(PullFrequency::Daily, Some(now() - Duration::hours(23)));
        assert!(!recent.should_refresh(now()));
        let stale = settings(PullFrequency::Daily, Some(now() - Duration::hours(24)));
        assert!(stale.should_refresh(now()));
    }

    #[test]
    fn test_refresh_weekly_threshold() {
        let recent = settings(PullFrequency::Weekly, Some(now() - Duration::hours(167)));
        assert!(!recent.should_refresh(now()));
        let stale = settings(PullFrequency::Weekly, Some(now() - Duration::hours(168)));
        assert!(stale.should_refresh(now()));
    }

    #[test]
    fn test_pull_frequency_from_str() {
        assert_eq!("Weekly".parse::<PullFrequency>().unwrap(), PullFrequency::Weekly);
        assert!("hourly".parse::<PullFrequency>().is_err());
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let err = GlobalConfig::load(temp.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, rulekeeper_core::Error::ConfigMissing { .. }));
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "source = 3").unwrap();
        let err = GlobalConfig::load(&path).unwrap_err();
        assert!(matches!(err, rulekeeper_core::Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = local_config(temp.path());
        config.source.kind = SourceType::Git;
        config.source.remote = Some("git@github.com:team/rules.git".into());
        config.record_pull(now());
        config.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("pullFrequency = \"daily\""));
        assert!(content.contains("type = \"git\""));

        let loaded = GlobalConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[source]\ntype = \"local\"\npath = \"/rules\"\n").unwrap();

        let config = GlobalConfig::load(&path).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.settings.auto_pull);
        assert_eq!(config.settings.pull_frequency, PullFrequency::Daily);
        assert!(config.settings.last_pull.is_none());
        assert!(config.platform.is_none());
    }
}
