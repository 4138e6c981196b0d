//! Icons for rule status and diagnostic lines

use owo_colors::OwoColorize;
use rulekeeper_engine::RuleStatus;

/// Icon constants
pub struct Icons;

impl Icons {
    // Rule status
    pub const SYNCED: &'static str = "✓";
    pub const OUTDATED: &'static str = "↓";
    pub const DIVERGED: &'static str = "⚠";
    pub const DETACHED: &'static str = "○";

    // Message prefixes
    pub const SUCCESS: &'static str = "✓";
    pub const WARNING: &'static str = "⚠";
    pub const ERROR: &'static str = "✗";
    pub const INFO: &'static str = "ℹ";

    // Diff markers
    pub const ACTION_ADD: &'static str = "+";
    pub const ACTION_REMOVE: &'static str = "-";
}

/// Status icon type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    /// Green check
    Success,
    /// Yellow warning sign
    Warning,
    /// Red cross
    Error,
    /// Blue info mark
    Info,
}

impl StatusIcon {
    /// Plain glyph
    pub fn glyph(self) -> &'static str {
        match self {
            StatusIcon::Success => Icons::SUCCESS,
            StatusIcon::Warning => Icons::WARNING,
            StatusIcon::Error => Icons::ERROR,
            StatusIcon::Info => Icons::INFO,
        }
    }

    /// Glyph with its color applied
    pub fn colored(self) -> String {
        match self {
            StatusIcon::Success => self.glyph().green().to_string(),
            StatusIcon::Warning => self.glyph().yellow().to_string(),
            StatusIcon::Error => self.glyph().red().to_string(),
            StatusIcon::Info => self.glyph().blue().to_string(),
        }
    }
}

/// Colored icon for a rule status
pub fn status_icon(status: RuleStatus) -> String {
    match status {
        RuleStatus::Synced => Icons::SYNCED.green().to_string(),
        RuleStatus::Outdated => Icons::OUTDATED.yellow().to_string(),
        RuleStatus::Diverged => Icons::DIVERGED.red().to_string(),
        RuleStatus::Detached => Icons::DETACHED.dimmed().to_string(),
    }
}

/// Colored label for a rule status
pub fn status_label(status: RuleStatus) -> String {
    let label = status.to_string();
    match status {
        RuleStatus::Synced => label.green().to_string(),
        RuleStatus::Outdated => label.yellow().to_string(),
        RuleStatus::Diverged => label.red().to_string(),
        RuleStatus::Detached => label.dimmed().to_string(),
    }
}

/// One line of `status` output: icon, padded name, status and details
pub fn rule_line(file: &str, status: RuleStatus, details: &[&str]) -> String {
    let details = if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join(", ")).dimmed().to_string()
    };
    format!(
        "  {} {:<20} {}{}",
        status_icon(status),
        file,
        status_label(status),
        details
    )
}
